use std::collections::HashSet;
use std::error::Error;
use std::fmt::Display;

// ********* Input data structures ***********

/// A raw answer value, exactly as collected from a respondent.
///
/// The two representations are equivalent once normalized: a label is
/// looked up in the active answer scale and an integer is taken as a
/// direct pick on that scale.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum AnswerValue {
    /// One of the five ordinal labels of the active scale.
    ///
    /// Matching is exact (no trimming, no case folding). Front-ends that
    /// collect free text are expected to constrain the input to the scale
    /// labels before submitting.
    Label(String),
    /// A direct pick on the 1-5 scale, as found in exports that store
    /// numbers instead of wordings.
    Selected(i64),
}

/// A respondent's answer to a single question.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RawResponse {
    /// The code of the question being answered, e.g. "q07".
    pub question_code: String,
    pub value: AnswerValue,
}

/// One statement of the questionnaire, as loaded from the question catalog.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Question {
    /// Identifier of the question, unique within the catalog.
    pub code: String,
    /// The thematic axis this question contributes to, e.g. "Curiosity".
    pub axis: String,
    /// The statement presented to respondents.
    pub text: String,
}

// ******** Output data structures *********

/// The mean of the normalized scores of one axis, in the range [1.0, 5.0].
#[derive(PartialEq, Debug, Clone)]
pub struct AxisScore {
    pub axis: String,
    /// Rounded to 2 decimal places.
    pub mean: f64,
}

/// The per-axis means and the global index of one scored submission,
/// or of a whole cohort.
#[derive(PartialEq, Debug, Clone)]
pub struct ScoreCard {
    /// One entry per axis, in catalog order (order of first appearance).
    pub axis_scores: Vec<AxisScore>,
    /// The 0-100 index: mean of the axis means, rescaled from [1, 5].
    /// Rounded to 1 decimal place.
    pub global_index: f64,
}

impl ScoreCard {
    /// The mean for the given axis, if this card has it.
    pub fn axis_mean(&self, axis: &str) -> Option<f64> {
        self.axis_scores
            .iter()
            .find(|asc| asc.axis == axis)
            .map(|asc| asc.mean)
    }
}

/// Everything computed for one submission.
#[derive(PartialEq, Debug, Clone)]
pub struct ScoreReport {
    /// The normalized score of every question, in catalog order.
    pub scores: Vec<(String, u8)>,
    pub card: ScoreCard,
    /// The maturity tier covering the global index. `None` when the tier
    /// table has no row for this value (rendered as "not evaluated"
    /// downstream, never an error).
    pub maturity: Option<MaturityTier>,
}

/// Errors that prevent a submission from being scored.
///
/// These are all data errors: nothing is retried and there is no state to
/// roll back. The offending values are carried in the variants so that
/// callers can show them to respondents or administrators verbatim.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ScoringError {
    /// Answer labels that are not part of the active scale.
    UnrecognizedAnswer { values: Vec<String> },
    /// Integer picks outside the 1-5 scale.
    OutOfRangeAnswer { values: Vec<i64> },
    /// Catalog questions with no answer in the submission.
    IncompleteSubmission { missing: Vec<String> },
    /// The question catalog is empty.
    EmptySurvey,
    /// Answers were supplied for codes absent from the catalog.
    UnknownQuestion { codes: Vec<String> },
    /// Two catalog entries share the same code.
    DuplicateQuestion { code: String },
    /// A catalog entry (1-based position) has a blank code or axis.
    BlankQuestionField { position: usize },
    /// An answer scale could not be built from the supplied labels.
    InvalidScale { reason: String },
}

impl Error for ScoringError {}

impl Display for ScoringError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoringError::UnrecognizedAnswer { values } => {
                write!(f, "unrecognized answer label(s): {}", values.join(", "))
            }
            ScoringError::OutOfRangeAnswer { values } => {
                let vs: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "answer value(s) outside the 1-5 scale: {}", vs.join(", "))
            }
            ScoringError::IncompleteSubmission { missing } => {
                write!(f, "no answer for question(s): {}", missing.join(", "))
            }
            ScoringError::EmptySurvey => {
                write!(f, "the question catalog is empty")
            }
            ScoringError::UnknownQuestion { codes } => {
                write!(f, "answer(s) for unknown question code(s): {}", codes.join(", "))
            }
            ScoringError::DuplicateQuestion { code } => {
                write!(f, "duplicate question code in catalog: {}", code)
            }
            ScoringError::BlankQuestionField { position } => {
                write!(f, "catalog entry #{} has a blank code or axis", position)
            }
            ScoringError::InvalidScale { reason } => {
                write!(f, "invalid answer scale: {}", reason)
            }
        }
    }
}

// ********* Configuration **********

/// The five ordinal labels of a Likert agreement scale, in ascending order
/// of agreement. The label at position `i` normalizes to the score `i + 1`.
///
/// The default scale carries the canonical English wording. Deployments
/// with a different wording (translations, house style) supply their own
/// labels with [LikertScale::from_labels]. Matching is always exact.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct LikertScale {
    labels: [String; 5],
}

impl Default for LikertScale {
    fn default() -> Self {
        LikertScale::canonical()
    }
}

impl LikertScale {
    /// The canonical English agreement scale, from "Strongly disagree" (1)
    /// to "Strongly agree" (5).
    pub fn canonical() -> LikertScale {
        LikertScale {
            labels: [
                "Strongly disagree".to_string(),
                "Disagree".to_string(),
                "Neutral".to_string(),
                "Agree".to_string(),
                "Strongly agree".to_string(),
            ],
        }
    }

    /// Builds a scale from five custom labels, given in ascending order of
    /// agreement. The labels must be distinct and non-empty.
    pub fn from_labels(labels: &[String]) -> Result<LikertScale, ScoringError> {
        let arr: [String; 5] = match <[String; 5]>::try_from(labels.to_vec()) {
            Ok(arr) => arr,
            Err(rejected) => {
                return Err(ScoringError::InvalidScale {
                    reason: format!("expected 5 labels, got {}", rejected.len()),
                });
            }
        };
        for (idx, label) in arr.iter().enumerate() {
            if label.is_empty() {
                return Err(ScoringError::InvalidScale {
                    reason: format!("label #{} is empty", idx + 1),
                });
            }
        }
        let distinct: HashSet<&String> = arr.iter().collect();
        if distinct.len() != arr.len() {
            return Err(ScoringError::InvalidScale {
                reason: "the labels are not distinct".to_string(),
            });
        }
        Ok(LikertScale { labels: arr })
    }

    /// The score of an exact label match, in [1, 5].
    pub fn score_of(&self, label: &str) -> Option<u8> {
        self.labels
            .iter()
            .position(|l| l == label)
            .map(|idx| (idx + 1) as u8)
    }

    /// The label of a score in [1, 5].
    pub fn label_of(&self, score: u8) -> Option<&str> {
        if (1..=5).contains(&score) {
            Some(self.labels[(score - 1) as usize].as_str())
        } else {
            None
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

/// One row of the maturity interpretation table.
///
/// The table is configuration, not a property of the engine: deployments
/// have used different cut points and different wordings, some on the
/// 0-100 index and some on a 0-5 scale. Bounds are inclusive on both ends.
#[derive(PartialEq, Debug, Clone)]
pub struct MaturityTier {
    /// Short name of the tier, e.g. "Advanced".
    pub label: String,
    /// Inclusive lower bound on the global index.
    pub min: f64,
    /// Inclusive upper bound on the global index.
    pub max: f64,
    /// A sentence of guidance shown along with the tier.
    pub description: String,
}
