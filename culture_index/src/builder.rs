pub use crate::config::*;

use crate::{normalize_answer, run_scoring, validate_catalog};

/// A builder that collects one respondent's answers step by step.
///
/// Survey front-ends usually walk respondents through the questionnaire one
/// screen at a time. The builder is the session object carried between
/// steps: every answer is checked against the active scale the moment it is
/// recorded, so a wizard can re-prompt on the spot, and the scoring itself
/// remains a single pure call at the end.
///
/// ```
/// pub use culture_index::builder::SubmissionBuilder;
/// pub use culture_index::{LikertScale, Question};
/// # use culture_index::ScoringError;
///
/// let questions = vec![
///     Question {
///         code: "q1".to_string(),
///         axis: "Audacity".to_string(),
///         text: "New ideas are welcome here".to_string(),
///     },
///     Question {
///         code: "q2".to_string(),
///         axis: "Curiosity".to_string(),
///         text: "We take time to explore".to_string(),
///     },
/// ];
///
/// let mut builder = SubmissionBuilder::new(&questions, &LikertScale::default())?;
/// builder.add_label("q1", "Agree")?;
/// builder.add_pick("q2", 5)?;
/// assert!(builder.remaining().is_empty());
///
/// let report = builder.score(&[])?;
/// assert_eq!(report.card.global_index, 90.0);
///
/// # Ok::<(), ScoringError>(())
/// ```
pub struct SubmissionBuilder {
    pub(crate) _questions: Vec<Question>,
    pub(crate) _scale: LikertScale,
    pub(crate) _responses: Vec<RawResponse>,
}

impl SubmissionBuilder {
    /// Starts a new submission against the given catalog and scale.
    ///
    /// The catalog is validated here, once, so that every later step can
    /// assume a well-formed questionnaire.
    pub fn new(questions: &[Question], scale: &LikertScale) -> Result<SubmissionBuilder, ScoringError> {
        validate_catalog(questions)?;
        Ok(SubmissionBuilder {
            _questions: questions.to_vec(),
            _scale: scale.clone(),
            _responses: Vec::new(),
        })
    }

    /// Records a label answer for a question.
    pub fn add_label(&mut self, code: &str, label: &str) -> Result<(), ScoringError> {
        self.add_response(&RawResponse {
            question_code: code.to_string(),
            value: AnswerValue::Label(label.to_string()),
        })
    }

    /// Records a direct pick on the 1-5 scale for a question.
    pub fn add_pick(&mut self, code: &str, value: i64) -> Result<(), ScoringError> {
        self.add_response(&RawResponse {
            question_code: code.to_string(),
            value: AnswerValue::Selected(value),
        })
    }

    /// Records an answer in any supported representation.
    ///
    /// The question must exist in the catalog and the value must normalize
    /// under the active scale, otherwise nothing is recorded and the error
    /// names the offending value. Answering a question a second time
    /// replaces the previous answer, so a respondent can navigate back.
    pub fn add_response(&mut self, response: &RawResponse) -> Result<(), ScoringError> {
        if !self
            ._questions
            .iter()
            .any(|q| q.code == response.question_code)
        {
            return Err(ScoringError::UnknownQuestion {
                codes: vec![response.question_code.clone()],
            });
        }
        normalize_answer(&response.value, &self._scale)?;
        self._responses
            .retain(|r| r.question_code != response.question_code);
        self._responses.push(response.clone());
        Ok(())
    }

    /// The answers recorded so far, in recording order.
    pub fn responses(&self) -> &[RawResponse] {
        &self._responses
    }

    /// The codes of the questions that are still unanswered, in catalog order.
    pub fn remaining(&self) -> Vec<String> {
        self._questions
            .iter()
            .filter(|q| {
                !self
                    ._responses
                    .iter()
                    .any(|r| r.question_code == q.code)
            })
            .map(|q| q.code.clone())
            .collect()
    }

    /// Scores the collected answers against the questionnaire.
    ///
    /// An empty tier table is valid: the report then carries no maturity
    /// tier. Unanswered questions fail with
    /// [ScoringError::IncompleteSubmission], naming all of them.
    pub fn score(&self, tiers: &[MaturityTier]) -> Result<ScoreReport, ScoringError> {
        run_scoring(&self._questions, &self._responses, &self._scale, tiers)
    }
}
