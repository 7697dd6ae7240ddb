use crate::survey::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;
use std::fs;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "surveyName")]
    pub survey_name: String,
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
    #[serde(rename = "surveyDate")]
    pub survey_date: Option<String>,
    #[serde(rename = "organization")]
    pub organization: Option<String>,
}

/// The configuration block echoed at the top of the summary.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub survey: String,
    pub date: Option<String>,
    pub organization: Option<String>,
    pub scale: Vec<String>,
}

/// Where and how to read the question catalog.
///
/// Column and row indexes follow the spreadsheet convention: 1-based, with
/// Excel-style letters ("C") accepted alongside integers.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
    #[serde(rename = "codeColumnIndex")]
    _code_column_index: Option<JSValue>,
    #[serde(rename = "axisColumnIndex")]
    _axis_column_index: Option<JSValue>,
    #[serde(rename = "textColumnIndex")]
    _text_column_index: Option<JSValue>,
    #[serde(rename = "firstQuestionRowIndex")]
    _first_question_row_index: Option<JSValue>,
}

impl CatalogSource {
    pub fn code_column_index(&self) -> SurveyResult<usize> {
        let x = read_js_int_or(&self._code_column_index, 1)?;
        Ok(x - 1)
    }

    pub fn axis_column_index(&self) -> SurveyResult<usize> {
        let x = read_js_int_or(&self._axis_column_index, 2)?;
        Ok(x - 1)
    }

    pub fn text_column_index(&self) -> SurveyResult<usize> {
        let x = read_js_int_or(&self._text_column_index, 3)?;
        Ok(x - 1)
    }

    pub fn first_question_row_index(&self) -> SurveyResult<usize> {
        let x = read_js_int_or(&self._first_question_row_index, 2)?;
        Ok(x - 1)
    }
}

/// Where and how to read one batch of responses.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ResponseSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
    #[serde(rename = "respondentColumnIndex")]
    _respondent_column_index: Option<JSValue>,
    #[serde(rename = "questionColumnIndex")]
    _question_column_index: Option<JSValue>,
    #[serde(rename = "answerColumnIndex")]
    _answer_column_index: Option<JSValue>,
    #[serde(rename = "firstResponseRowIndex")]
    _first_response_row_index: Option<JSValue>,
    #[serde(rename = "firstAnswerColumnIndex")]
    _first_answer_column_index: Option<JSValue>,
}

impl ResponseSource {
    pub fn respondent_column_index(&self) -> SurveyResult<usize> {
        let x = read_js_int_or(&self._respondent_column_index, 1)?;
        Ok(x - 1)
    }

    /// The respondent column when one is configured. Tabular exports
    /// without one fall back to generated identifiers.
    pub fn respondent_column_index_opt(&self) -> SurveyResult<Option<usize>> {
        match &self._respondent_column_index {
            Some(v) => Ok(Some(read_js_int(v)? - 1)),
            None => Ok(None),
        }
    }

    pub fn question_column_index(&self) -> SurveyResult<usize> {
        let x = read_js_int_or(&self._question_column_index, 2)?;
        Ok(x - 1)
    }

    pub fn answer_column_index(&self) -> SurveyResult<usize> {
        let x = read_js_int_or(&self._answer_column_index, 3)?;
        Ok(x - 1)
    }

    pub fn first_response_row_index(&self) -> SurveyResult<usize> {
        let x = read_js_int_or(&self._first_response_row_index, 2)?;
        Ok(x - 1)
    }

    pub fn first_answer_column_index(&self) -> SurveyResult<usize> {
        let x = read_js_int_or(&self._first_answer_column_index, 2)?;
        Ok(x - 1)
    }
}

/// One row of the maturity interpretation table.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct TierRow {
    pub label: String,
    pub min: f64,
    pub max: f64,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum UnknownRespondentPolicy {
    Skip,
    Reject,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RosterConfig {
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "unknownRespondentPolicy")]
    _unknown_respondent_policy: Option<String>,
    #[serde(rename = "respondentColumnIndex")]
    _respondent_column_index: Option<JSValue>,
    #[serde(rename = "firstRowIndex")]
    _first_row_index: Option<JSValue>,
}

impl RosterConfig {
    pub fn policy(&self) -> SurveyResult<UnknownRespondentPolicy> {
        match self._unknown_respondent_policy.as_deref() {
            None | Some("skip") => Ok(UnknownRespondentPolicy::Skip),
            Some("reject") => Ok(UnknownRespondentPolicy::Reject),
            Some(x) => whatever!("unknown respondent policy: {}", x),
        }
    }

    pub fn respondent_column_index(&self) -> SurveyResult<usize> {
        let x = read_js_int_or(&self._respondent_column_index, 1)?;
        Ok(x - 1)
    }

    pub fn first_row_index(&self) -> SurveyResult<usize> {
        let x = read_js_int_or(&self._first_row_index, 2)?;
        Ok(x - 1)
    }
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SurveyConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    #[serde(rename = "questionCatalog")]
    pub question_catalog: CatalogSource,
    #[serde(rename = "responseSources")]
    pub response_sources: Vec<ResponseSource>,
    #[serde(rename = "maturityTiers")]
    pub maturity_tiers: Option<Vec<TierRow>>,
    #[serde(rename = "answerLabels")]
    pub answer_labels: Option<Vec<String>>,
    pub roster: Option<RosterConfig>,
    #[serde(rename = "resultsFile")]
    pub results_file: Option<String>,
}

pub fn read_config(path: &str) -> SurveyResult<SurveyConfig> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    let config: SurveyConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(config)
}

/// Reads a summary written by a previous run, without its timestamps.
pub fn read_summary(path: String) -> SurveyResult<JSValue> {
    let contents = fs::read_to_string(path.clone()).context(OpeningFileSnafu { path })?;
    let mut js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    strip_timestamps(&mut js);
    Ok(js)
}

/// Timestamps change from run to run, drop them before any comparison.
pub fn strip_timestamps(js: &mut JSValue) {
    if let Some(results) = js.get_mut("results").and_then(|r| r.as_array_mut()) {
        for record in results.iter_mut() {
            if let Some(obj) = record.as_object_mut() {
                obj.remove("timestamp");
            }
        }
    }
}

/// A catalog source for a bare file path, as passed on the command line.
pub fn catalog_source_from_path(path: &str) -> CatalogSource {
    let provider = if path.ends_with(".xlsx") { "excel" } else { "csv" };
    CatalogSource {
        provider: provider.to_string(),
        file_path: path.to_string(),
        excel_worksheet_name: None,
        _code_column_index: None,
        _axis_column_index: None,
        _text_column_index: None,
        _first_question_row_index: None,
    }
}

/// A response source for a bare file path. The provider is taken from
/// --input-type when given, otherwise inferred from the file extension.
pub fn response_source_from_parts(
    path: &str,
    input_type: &Option<String>,
    excel_worksheet_name: &Option<String>,
) -> ResponseSource {
    let provider = match input_type {
        Some(t) => t.clone(),
        None if path.ends_with(".xlsx") => "forms".to_string(),
        None if path.ends_with(".json") => "json".to_string(),
        None => "csv".to_string(),
    };
    ResponseSource {
        provider,
        file_path: path.to_string(),
        excel_worksheet_name: excel_worksheet_name.clone(),
        _respondent_column_index: None,
        _question_column_index: None,
        _answer_column_index: None,
        _first_response_row_index: None,
        _first_answer_column_index: None,
    }
}

fn read_js_int(x: &JSValue) -> SurveyResult<usize> {
    let parsed = match x {
        JSValue::Number(n) => n
            .as_u64()
            .map(|n| n as usize)
            .context(ParsingJsonNumberSnafu {})?,
        // Excel-style column letters. One letter covers the first 26
        // columns, which is plenty for survey exports.
        JSValue::String(s) if !s.is_empty() && s.chars().all(|c| c.is_ascii_alphabetic()) => {
            if s.chars().count() > 1 {
                whatever!("column references beyond Z are not supported: {:?}", s);
            }
            let c1 = s
                .to_lowercase()
                .chars()
                .next()
                .context(ParsingJsonNumberSnafu {})?;
            (c1 as usize) - ('a' as usize) + 1
        }
        JSValue::String(s) => s.parse::<usize>().ok().context(ParsingJsonNumberSnafu {})?,
        _ => return None.context(ParsingJsonNumberSnafu {}),
    };
    if parsed == 0 {
        whatever!("column and row indexes are 1-based: {:?}", x);
    }
    Ok(parsed)
}

fn read_js_int_or(x: &Option<JSValue>, default: usize) -> SurveyResult<usize> {
    match x {
        Some(v) => read_js_int(v),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn column_references_accept_integers_and_letters() {
        assert_eq!(read_js_int(&json!(3)).unwrap(), 3);
        assert_eq!(read_js_int(&json!("3")).unwrap(), 3);
        assert_eq!(read_js_int(&json!("C")).unwrap(), 3);
        assert_eq!(read_js_int(&json!("a")).unwrap(), 1);
        assert!(read_js_int(&json!(0)).is_err());
        assert!(read_js_int(&json!("")).is_err());
        assert!(read_js_int(&json!("AA")).is_err());
        assert!(read_js_int(&json!(true)).is_err());
    }

    #[test]
    fn sources_fall_back_to_the_documented_columns() {
        let source: ResponseSource = serde_json::from_str(
            r#"{ "provider": "csv", "filePath": "responses.csv" }"#,
        )
        .unwrap();
        assert_eq!(source.respondent_column_index().unwrap(), 0);
        assert_eq!(source.question_column_index().unwrap(), 1);
        assert_eq!(source.answer_column_index().unwrap(), 2);
        assert_eq!(source.first_response_row_index().unwrap(), 1);
        assert_eq!(source.first_answer_column_index().unwrap(), 1);
        assert_eq!(source.respondent_column_index_opt().unwrap(), None);
    }

    #[test]
    fn sources_honor_letter_overrides() {
        let source: ResponseSource = serde_json::from_str(
            r#"{ "provider": "csv", "filePath": "r.csv",
                 "respondentColumnIndex": "B", "answerColumnIndex": 5 }"#,
        )
        .unwrap();
        assert_eq!(source.respondent_column_index().unwrap(), 1);
        assert_eq!(source.respondent_column_index_opt().unwrap(), Some(1));
        assert_eq!(source.answer_column_index().unwrap(), 4);
    }

    #[test]
    fn a_full_configuration_file_parses() {
        let config: SurveyConfig = serde_json::from_str(
            r#"{
  "outputSettings": {
    "surveyName": "Culture check 2024",
    "outputDirectory": "out",
    "surveyDate": "2024-06-01",
    "organization": "Acme"
  },
  "questionCatalog": { "provider": "csv", "filePath": "catalog.csv" },
  "responseSources": [
    { "provider": "forms", "filePath": "responses.xlsx", "excelWorksheetName": "Form responses 1" },
    { "provider": "csv", "filePath": "extra.csv" }
  ],
  "maturityTiers": [
    { "label": "Emerging", "min": 0, "max": 49.9, "description": "Starting out" }
  ],
  "answerLabels": ["Never", "Rarely", "Sometimes", "Often", "Always"],
  "roster": { "filePath": "roster.csv", "unknownRespondentPolicy": "skip" },
  "resultsFile": "results.jsonl"
}"#,
        )
        .unwrap();
        assert_eq!(config.output_settings.survey_name, "Culture check 2024");
        assert_eq!(config.response_sources.len(), 2);
        assert_eq!(config.response_sources[0].provider, "forms");
        assert_eq!(
            config.maturity_tiers.as_ref().unwrap()[0].label,
            "Emerging"
        );
        assert_eq!(
            config.roster.as_ref().unwrap().policy().unwrap(),
            UnknownRespondentPolicy::Skip
        );
        assert_eq!(config.results_file.as_deref(), Some("results.jsonl"));
    }

    #[test]
    fn unknown_roster_policies_are_rejected() {
        let roster: RosterConfig = serde_json::from_str(
            r#"{ "filePath": "roster.csv", "unknownRespondentPolicy": "wave-through" }"#,
        )
        .unwrap();
        assert!(roster.policy().is_err());
    }

    #[test]
    fn providers_are_inferred_from_the_extension() {
        assert_eq!(catalog_source_from_path("catalog.xlsx").provider, "excel");
        assert_eq!(catalog_source_from_path("catalog.csv").provider, "csv");
        let s = response_source_from_parts("responses.xlsx", &None, &None);
        assert_eq!(s.provider, "forms");
        let s = response_source_from_parts("responses.json", &None, &None);
        assert_eq!(s.provider, "json");
        let s = response_source_from_parts(
            "responses.csv",
            &Some("csv_wide".to_string()),
            &None,
        );
        assert_eq!(s.provider, "csv_wide");
    }

    #[test]
    fn stripping_timestamps_ignores_non_object_records() {
        let mut js = json!({
            "results": [
                { "respondent": "a", "timestamp": "2024-06-01T00:00:00Z" },
                { "respondent": "b", "incomplete": ["q2"] }
            ]
        });
        strip_timestamps(&mut js);
        assert!(js["results"][0].get("timestamp").is_none());
        assert_eq!(js["results"][1]["incomplete"], json!(["q2"]));
    }
}
