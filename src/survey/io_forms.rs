// Reader for the spreadsheet exports of survey tools (Google Forms,
// Microsoft Forms): one row per respondent, one column per question.

use std::collections::HashMap;

use calamine::DataType;
use log::debug;
use snafu::prelude::*;

use culture_index::*;

use crate::survey::io_common::{get_range, make_default_id, parse_answer};
use crate::survey::*;

pub fn read_forms_responses(
    path: String,
    source: &ResponseSource,
    questions: &[Question],
) -> BSurveyResult<Vec<ParsedSubmission>> {
    let default_id = make_default_id(&path);
    let wrange = get_range(&path, &source.excel_worksheet_name)?;

    let first_row = source.first_response_row_index()?;
    let header_row = match first_row.checked_sub(1) {
        Some(x) => x,
        None => return Err(Box::new(SurveyError::MissingHeaderRow {})),
    };
    let mut rows = wrange.rows();
    let header = rows.nth(header_row).context(EmptyExcelSnafu {})?;
    debug!("read_forms_responses: header: {:?}", header);

    let col_indexes = get_question_columns(questions, header)?;
    debug!("read_forms_responses: col_indexes: {:?}", col_indexes);

    let respondent_idx_o = source.respondent_column_index_opt()?;

    let mut res: Vec<ParsedSubmission> = Vec::new();
    for (idx, row) in rows.enumerate() {
        let lineno = idx + first_row + 1;
        if row.iter().all(|c| matches!(c, DataType::Empty)) {
            continue;
        }
        debug!("read_forms_responses: lineno: {:?} row: {:?}", lineno, &row);

        let respondent = match respondent_idx_o.and_then(|col| row.get(col)) {
            Some(DataType::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
            Some(DataType::Int(i)) => i.to_string(),
            Some(DataType::Float(f)) => format!("{}", f),
            _ => default_id(lineno),
        };

        let answers = row_answers(row, &col_indexes, lineno)?;
        res.push(ParsedSubmission {
            respondent,
            answers,
        });
    }
    Ok(res)
}

/// Maps every catalog question to a column of the export, matching the
/// header cells by question code first and then by statement text. Columns
/// matching neither (timestamps, email, free comments) are not read.
pub fn get_question_columns(
    questions: &[Question],
    header: &[DataType],
) -> BSurveyResult<Vec<(usize, String)>> {
    let col_names: HashMap<String, usize> = header
        .iter()
        .enumerate()
        .filter_map(|(idx, x)| match x {
            DataType::String(s) => Some((s.trim().to_string(), idx)),
            _ => None,
        })
        .collect();
    debug!("get_question_columns: col_names: {:?}", col_names);

    let mut col_indexes: Vec<(usize, String)> = Vec::new();
    for q in questions.iter() {
        let idx = col_names
            .get(q.code.as_str())
            .or_else(|| col_names.get(q.text.as_str()))
            .context(QuestionNotInHeaderSnafu {
                code: q.code.as_str(),
            })?;
        col_indexes.push((*idx, q.code.clone()));
    }
    Ok(col_indexes)
}

fn row_answers(
    row: &[DataType],
    col_indexes: &[(usize, String)],
    lineno: usize,
) -> BSurveyResult<Vec<(String, AnswerValue)>> {
    let mut answers: Vec<(String, AnswerValue)> = Vec::new();
    for (col_idx, code) in col_indexes.iter() {
        let v: DataType = row.get(*col_idx).cloned().unwrap_or(DataType::Empty);
        match v {
            DataType::String(s) => {
                if let Some(value) = parse_answer(s.as_str()) {
                    answers.push((code.clone(), value));
                }
            }
            DataType::Int(i) => answers.push((code.clone(), AnswerValue::Selected(i))),
            DataType::Float(f) if f.fract() == 0.0 => {
                answers.push((code.clone(), AnswerValue::Selected(f as i64)))
            }
            DataType::Empty => {
                // The question was left open.
            }
            _ => {
                return Err(Box::new(SurveyError::ExcelWrongCellType {
                    lineno: lineno as u64,
                    content: format!("{:?} IN {:?}", v, row),
                }));
            }
        };
    }
    Ok(answers)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(code: &str, text: &str) -> Question {
        Question {
            code: code.to_string(),
            axis: "Trust".to_string(),
            text: text.to_string(),
        }
    }

    fn s(x: &str) -> DataType {
        DataType::String(x.to_string())
    }

    #[test]
    fn questions_match_header_cells_by_code_then_text() {
        let header = vec![
            s("Timestamp"),
            s("Email address"),
            s("New ideas are welcome here"),
            s("q2"),
        ];
        let questions = vec![
            question("q1", "New ideas are welcome here"),
            question("q2", "Mistakes are discussed openly"),
        ];
        let cols = get_question_columns(&questions, &header).unwrap();
        assert_eq!(cols, vec![(2, "q1".to_string()), (3, "q2".to_string())]);
    }

    #[test]
    fn unmatched_questions_are_named() {
        let header = vec![s("Timestamp")];
        let questions = vec![question("q1", "New ideas are welcome here")];
        let got = get_question_columns(&questions, &header);
        match got {
            Err(e) => match *e {
                SurveyError::QuestionNotInHeader { code } => assert_eq!(code, "q1"),
                other => panic!("unexpected error: {:?}", other),
            },
            Ok(_) => panic!("expected an error"),
        }
    }

    #[test]
    fn cells_parse_to_answers() {
        let cols = vec![
            (0, "q1".to_string()),
            (1, "q2".to_string()),
            (2, "q3".to_string()),
        ];
        let row = vec![s("Agree"), DataType::Float(4.0), DataType::Empty];
        let answers = row_answers(&row, &cols, 2).unwrap();
        assert_eq!(
            answers,
            vec![
                ("q1".to_string(), AnswerValue::Label("Agree".to_string())),
                ("q2".to_string(), AnswerValue::Selected(4)),
            ]
        );
    }

    #[test]
    fn non_likert_cells_are_rejected() {
        let cols = vec![(0, "q1".to_string())];
        let row = vec![DataType::Bool(true)];
        assert!(row_answers(&row, &cols, 2).is_err());
        let row = vec![DataType::Float(3.5)];
        assert!(row_answers(&row, &cols, 2).is_err());
    }
}
