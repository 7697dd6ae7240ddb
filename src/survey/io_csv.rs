// Primitives for reading CSV files.

use std::collections::{HashMap, HashSet};
use std::fs::File;

use log::debug;
use snafu::prelude::*;

use culture_index::*;

use crate::survey::io_common::{make_default_id, parse_answer};
use crate::survey::*;

/// Reads the long format: one line per answer, with respondent, question
/// code and answer columns.
pub fn read_long_csv(
    path: String,
    source: &ResponseSource,
) -> BSurveyResult<Vec<ParsedSubmission>> {
    let respondent_idx = source.respondent_column_index()?;
    let question_idx = source.question_column_index()?;
    let answer_idx = source.answer_column_index()?;

    let (records, row_offset) = get_records(&path, source.first_response_row_index()?)?;

    // Groups the lines by respondent, in the order they first appear.
    let mut order: Vec<String> = Vec::new();
    let mut by_respondent: HashMap<String, Vec<(String, AnswerValue)>> = HashMap::new();
    for (idx, line_r) in records.enumerate() {
        let lineno = idx + row_offset + 1;
        let line = line_r.context(CsvLineParseSnafu {})?;
        debug!("read_long_csv: lineno: {:?} line: {:?}", lineno, line);
        let respondent = line
            .get(respondent_idx)
            .context(CsvLineTooShortSnafu { lineno })?
            .trim()
            .to_string();
        let code = line
            .get(question_idx)
            .context(CsvLineTooShortSnafu { lineno })?
            .trim()
            .to_string();
        let answer = line
            .get(answer_idx)
            .context(CsvLineTooShortSnafu { lineno })?;
        if code.is_empty() {
            debug!("read_long_csv: lineno: {:?} has no question code, skipping", lineno);
            continue;
        }
        let value = match parse_answer(answer) {
            Some(v) => v,
            None => {
                // The question was shown but left open.
                debug!("read_long_csv: lineno: {:?} has a blank answer", lineno);
                continue;
            }
        };
        if !by_respondent.contains_key(&respondent) {
            order.push(respondent.clone());
            by_respondent.insert(respondent.clone(), Vec::new());
        }
        if let Some(answers) = by_respondent.get_mut(&respondent) {
            answers.push((code, value));
        }
    }

    let mut res: Vec<ParsedSubmission> = Vec::new();
    for respondent in order {
        if let Some(answers) = by_respondent.remove(&respondent) {
            res.push(ParsedSubmission {
                respondent,
                answers,
            });
        }
    }
    Ok(res)
}

/// Reads the wide format: one line per respondent, one column per
/// question. Header cells may carry question codes or the full statements
/// from the catalog.
pub fn read_wide_csv(
    path: String,
    source: &ResponseSource,
    questions: &[Question],
) -> BSurveyResult<Vec<ParsedSubmission>> {
    let default_id = make_default_id(&path);
    let respondent_idx = source.respondent_column_index()?;
    let first_answer_col = source.first_answer_column_index()?;
    let first_row = source.first_response_row_index()?;
    let header_row = match first_row.checked_sub(1) {
        Some(x) => x,
        None => return Err(Box::new(SurveyError::MissingHeaderRow {})),
    };

    let (records, _) = get_records(&path, 0)?;
    let all: Vec<csv::StringRecord> = records
        .collect::<Result<_, _>>()
        .context(CsvLineParseSnafu {})?;
    let header = all.get(header_row).context(MissingHeaderRowSnafu {})?;
    debug!("read_wide_csv: header: {:?}", header);

    let codes: HashSet<&str> = questions.iter().map(|q| q.code.as_str()).collect();
    let texts: HashMap<&str, &str> = questions
        .iter()
        .map(|q| (q.text.as_str(), q.code.as_str()))
        .collect();
    let columns: Vec<(usize, String)> = header
        .iter()
        .enumerate()
        .skip(first_answer_col)
        .filter(|(_, cell)| !cell.trim().is_empty())
        .map(|(col, cell)| {
            let cell = cell.trim();
            let code = if codes.contains(cell) {
                cell
            } else {
                texts.get(cell).copied().unwrap_or(cell)
            };
            (col, code.to_string())
        })
        .collect();
    debug!("read_wide_csv: columns: {:?}", columns);

    let mut res: Vec<ParsedSubmission> = Vec::new();
    for (idx, line) in all.iter().enumerate().skip(first_row) {
        let lineno = idx + 1;
        let respondent = match line.get(respondent_idx) {
            Some(s) if !s.trim().is_empty() => s.trim().to_string(),
            _ => default_id(lineno),
        };
        let mut answers: Vec<(String, AnswerValue)> = Vec::new();
        for (col, code) in columns.iter() {
            let cell = line.get(*col).context(CsvLineTooShortSnafu { lineno })?;
            if let Some(value) = parse_answer(cell) {
                answers.push((code.clone(), value));
            }
        }
        res.push(ParsedSubmission {
            respondent,
            answers,
        });
    }
    Ok(res)
}

/// Reads the roster file: one respondent per line.
pub fn read_roster(path: String, roster: &RosterConfig) -> BSurveyResult<HashSet<String>> {
    let col = roster.respondent_column_index()?;
    let (records, row_offset) = get_records(&path, roster.first_row_index()?)?;
    let mut res: HashSet<String> = HashSet::new();
    for (idx, line_r) in records.enumerate() {
        let lineno = idx + row_offset + 1;
        let line = line_r.context(CsvLineParseSnafu {})?;
        let name = line
            .get(col)
            .context(CsvLineTooShortSnafu { lineno })?
            .trim();
        if name.is_empty() {
            continue;
        }
        res.insert(name.to_string());
    }
    Ok(res)
}

/// Opens a CSV file and skips the leading rows.
// The row indexes are 0-based here, the translation from the 1-based
// convention of the configuration happens in the accessors.
pub fn get_records(
    path: &str,
    first_row: usize,
) -> SurveyResult<(csv::StringRecordsIntoIter<File>, usize)> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .context(CsvOpenSnafu {})?;
    let mut records = rdr.into_records();
    for _ in 0..first_row {
        _ = records.next();
    }
    Ok((records, first_row))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    fn write_fixture(dir: &Path, name: &str, content: &str) -> String {
        let p = dir.join(name);
        fs::write(&p, content).unwrap();
        p.display().to_string()
    }

    fn plain_source() -> ResponseSource {
        serde_json::from_str(r#"{ "provider": "csv", "filePath": "responses.csv" }"#).unwrap()
    }

    fn question(code: &str, text: &str) -> Question {
        Question {
            code: code.to_string(),
            axis: "Trust".to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn long_format_groups_lines_by_respondent() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(
            dir.path(),
            "responses.csv",
            "\
email,question,answer
anna@acme.org,q1,Agree
bob@acme.org,q1,4
anna@acme.org,q2,2
",
        );
        let parsed = read_long_csv(path, &plain_source()).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].respondent, "anna@acme.org");
        assert_eq!(
            parsed[0].answers,
            vec![
                ("q1".to_string(), AnswerValue::Label("Agree".to_string())),
                ("q2".to_string(), AnswerValue::Selected(2)),
            ]
        );
        assert_eq!(parsed[1].respondent, "bob@acme.org");
        assert_eq!(
            parsed[1].answers,
            vec![("q1".to_string(), AnswerValue::Selected(4))]
        );
    }

    #[test]
    fn long_format_skips_blank_answers() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(
            dir.path(),
            "responses.csv",
            "\
email,question,answer
anna@acme.org,q1,
anna@acme.org,q2,Neutral
",
        );
        let parsed = read_long_csv(path, &plain_source()).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(
            parsed[0].answers,
            vec![("q2".to_string(), AnswerValue::Label("Neutral".to_string()))]
        );
    }

    #[test]
    fn long_format_honors_column_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(
            dir.path(),
            "responses.csv",
            "\
question,answer,email
q1,Agree,anna@acme.org
",
        );
        let source: ResponseSource = serde_json::from_str(
            r#"{ "provider": "csv", "filePath": "responses.csv",
                 "respondentColumnIndex": "C",
                 "questionColumnIndex": 1,
                 "answerColumnIndex": 2 }"#,
        )
        .unwrap();
        let parsed = read_long_csv(path, &source).unwrap();
        assert_eq!(parsed[0].respondent, "anna@acme.org");
        assert_eq!(
            parsed[0].answers,
            vec![("q1".to_string(), AnswerValue::Label("Agree".to_string()))]
        );
    }

    #[test]
    fn wide_headers_match_codes_or_statements() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(
            dir.path(),
            "responses.csv",
            "\
email,New ideas are welcome here,q2
anna@acme.org,Agree,5
",
        );
        let questions = vec![
            question("q1", "New ideas are welcome here"),
            question("q2", "Mistakes are discussed openly"),
        ];
        let parsed = read_wide_csv(path, &plain_source(), &questions).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(
            parsed[0].answers,
            vec![
                ("q1".to_string(), AnswerValue::Label("Agree".to_string())),
                ("q2".to_string(), AnswerValue::Selected(5)),
            ]
        );
    }

    #[test]
    fn wide_rows_without_a_respondent_get_a_generated_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(dir.path(), "responses.csv", "email,q1\n,Agree\n");
        let questions = vec![question("q1", "New ideas are welcome here")];
        let parsed = read_wide_csv(path, &plain_source(), &questions).unwrap();
        assert_eq!(parsed[0].respondent, "responses.csv-00000002");
    }

    #[test]
    fn roster_reading_skips_the_header_and_trims() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(dir.path(), "roster.csv", "email\n anna@acme.org \nbob@acme.org\n");
        let roster_config: RosterConfig =
            serde_json::from_str(r#"{ "filePath": "roster.csv" }"#).unwrap();
        let names = read_roster(path, &roster_config).unwrap();
        assert_eq!(names.len(), 2);
        assert!(names.contains("anna@acme.org"));
        assert!(names.contains("bob@acme.org"));
    }
}
