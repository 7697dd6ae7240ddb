// Reader for submissions exported as JSON, one object per respondent.

use std::fs;

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;
use snafu::prelude::*;

use culture_index::*;

use crate::survey::io_common::parse_answer;
use crate::survey::*;

pub fn read_json_responses(path: String) -> BSurveyResult<Vec<ParsedSubmission>> {
    let contents = fs::read_to_string(path.clone()).context(OpeningFileSnafu { path })?;
    let subs: Vec<JsonSubmission> =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;

    let mut res: Vec<ParsedSubmission> = Vec::new();
    for sub in subs.into_iter() {
        let mut answers: Vec<(String, AnswerValue)> = Vec::new();
        for (code, js) in sub.answers.iter() {
            match js {
                JSValue::Null => {
                    // The question was left open.
                }
                JSValue::Number(n) => match n.as_i64() {
                    Some(x) => answers.push((code.clone(), AnswerValue::Selected(x))),
                    None => {
                        return Err(Box::new(SurveyError::JsonWrongValueType {
                            content: format!("{} for question {:?}", n, code),
                        }))
                    }
                },
                JSValue::String(s) => {
                    if let Some(value) = parse_answer(s.as_str()) {
                        answers.push((code.clone(), value));
                    }
                }
                other => {
                    return Err(Box::new(SurveyError::JsonWrongValueType {
                        content: format!("{} for question {:?}", other, code),
                    }))
                }
            }
        }
        res.push(ParsedSubmission {
            respondent: sub.respondent,
            answers,
        });
    }
    debug!("read_json_responses: {:?} submissions", res.len());
    Ok(res)
}

// ********* Input data structures ***********

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
struct JsonSubmission {
    respondent: String,
    answers: serde_json::Map<String, JSValue>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_fixture(content: &str) -> Vec<ParsedSubmission> {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("responses.json");
        fs::write(&p, content).unwrap();
        read_json_responses(p.display().to_string()).unwrap()
    }

    #[test]
    fn values_map_to_picks_and_labels() {
        let parsed = read_fixture(
            r#"[
  { "respondent": "anna@acme.org",
    "answers": { "q1": "Agree", "q2": 2, "q3": "5", "q4": null } }
]"#,
        );
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].respondent, "anna@acme.org");
        assert_eq!(
            parsed[0].answers,
            vec![
                ("q1".to_string(), AnswerValue::Label("Agree".to_string())),
                ("q2".to_string(), AnswerValue::Selected(2)),
                ("q3".to_string(), AnswerValue::Selected(5)),
            ]
        );
    }

    #[test]
    fn non_scalar_values_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("responses.json");
        fs::write(
            &p,
            r#"[ { "respondent": "anna@acme.org", "answers": { "q1": [4] } } ]"#,
        )
        .unwrap();
        let got = read_json_responses(p.display().to_string());
        match got {
            Err(e) => match *e {
                SurveyError::JsonWrongValueType { content } => {
                    assert!(content.contains("q1"), "content: {}", content)
                }
                other => panic!("unexpected error: {:?}", other),
            },
            Ok(_) => panic!("expected an error"),
        }
    }

    #[test]
    fn fractional_numbers_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("responses.json");
        fs::write(
            &p,
            r#"[ { "respondent": "anna@acme.org", "answers": { "q1": 3.5 } } ]"#,
        )
        .unwrap();
        assert!(read_json_responses(p.display().to_string()).is_err());
    }
}
