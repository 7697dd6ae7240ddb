// Helpers shared by the file readers.

use std::path::Path;

use calamine::{open_workbook, DataType, Reader, Xlsx};
use log::debug;
use snafu::prelude::*;

use culture_index::AnswerValue;

use crate::survey::*;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string())
}

/// Identifiers for rows that do not carry a respondent of their own.
pub fn make_default_id(path: &str) -> impl Fn(usize) -> String {
    let simplified_file_name = simplify_file_name(path);
    move |lineno| format!("{}-{:08}", simplified_file_name, lineno)
}

/// Reads one answer cell. Digits are picks, anything else is a label and
/// a blank cell means the question was left open.
pub fn parse_answer(text: &str) -> Option<AnswerValue> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.parse::<i64>() {
        Ok(n) => Some(AnswerValue::Selected(n)),
        Err(_) => Some(AnswerValue::Label(trimmed.to_string())),
    }
}

/// Opens a workbook and picks a worksheet: the named one when configured,
/// otherwise the only one present.
pub fn get_range(
    path: &str,
    worksheet_name_o: &Option<String>,
) -> BSurveyResult<calamine::Range<DataType>> {
    debug!(
        "get_range: path: {:?} worksheet: {:?}",
        &path, &worksheet_name_o
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(worksheet_name) = worksheet_name_o {
        let wrange = workbook
            .worksheet_range(worksheet_name)
            .context(EmptyExcelSnafu {})?
            .context(OpeningExcelSnafu { path })?;
        Ok(wrange)
    } else {
        let all_worksheets = workbook.worksheets();
        match all_worksheets.as_slice() {
            [] => Err(Box::new(SurveyError::EmptyExcel {})),
            [(worksheet_name, wrange)] => {
                debug!(
                    "get_range: path: {:?} worksheet: {:?}",
                    &path, &worksheet_name
                );
                Ok(wrange.clone())
            }
            _ => Err(Box::new(SurveyError::AmbiguousWorksheet {})),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answers_parse_to_picks_or_labels() {
        assert_eq!(parse_answer("4"), Some(AnswerValue::Selected(4)));
        assert_eq!(parse_answer(" 4 "), Some(AnswerValue::Selected(4)));
        assert_eq!(parse_answer("-3"), Some(AnswerValue::Selected(-3)));
        assert_eq!(
            parse_answer("Agree"),
            Some(AnswerValue::Label("Agree".to_string()))
        );
        assert_eq!(
            parse_answer("  Strongly agree "),
            Some(AnswerValue::Label("Strongly agree".to_string()))
        );
        assert_eq!(parse_answer(""), None);
        assert_eq!(parse_answer("   "), None);
    }

    #[test]
    fn generated_ids_carry_the_file_name_and_the_line() {
        let default_id = make_default_id("data/responses.csv");
        assert_eq!(default_id(2), "responses.csv-00000002");
        assert_eq!(default_id(12345678), "responses.csv-12345678");
    }

    #[test]
    fn file_names_lose_their_directories() {
        assert_eq!(simplify_file_name("a/b/responses.csv"), "responses.csv");
        assert_eq!(simplify_file_name("responses.csv"), "responses.csv");
    }
}
