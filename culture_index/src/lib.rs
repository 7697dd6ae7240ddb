pub mod builder;
mod config;
pub mod manual;
pub mod quick_start;

use log::{debug, info};

use std::collections::{HashMap, HashSet};

pub use crate::config::*;

// **** Private structures ****

// Axes are referred to by their position of first appearance in the
// catalog, so that every output is in a stable, catalog-defined order.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
struct AxisId(u32);

// Invariant: count is never zero when a mean is taken.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
struct AxisTally {
    sum: u32,
    count: u32,
}

impl AxisTally {
    const EMPTY: AxisTally = AxisTally { sum: 0, count: 0 };

    fn add(&mut self, score: u8) {
        self.sum += score as u32;
        self.count += 1;
    }

    fn mean(&self) -> f64 {
        (self.sum as f64) / (self.count as f64)
    }
}

// Accumulates floating-point means (cohort aggregation).
#[derive(PartialEq, Debug, Clone, Copy)]
struct MeanTally {
    sum: f64,
    count: u32,
}

impl MeanTally {
    const EMPTY: MeanTally = MeanTally { sum: 0.0, count: 0 };

    fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn mean(&self) -> f64 {
        self.sum / (self.count as f64)
    }
}

// The only two rounding points of the whole pipeline. Axis means are
// published with 2 decimals, the global index with 1 decimal. Everything
// upstream of these calls is kept at full precision.
fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

// **** Public API ****

/// Normalizes a single raw answer to its score on the 1-5 scale.
///
/// Labels must match one of the scale labels exactly and integers must
/// already be within [1, 5]. Anything else is an error naming the offending
/// value. There is no coercion and no default: a value that cannot be
/// normalized never reaches the aggregation step.
pub fn normalize_answer(value: &AnswerValue, scale: &LikertScale) -> Result<u8, ScoringError> {
    match value {
        AnswerValue::Label(s) => match scale.score_of(s) {
            Some(score) => Ok(score),
            None => Err(ScoringError::UnrecognizedAnswer {
                values: vec![s.clone()],
            }),
        },
        AnswerValue::Selected(n) if (1..=5).contains(n) => Ok(*n as u8),
        AnswerValue::Selected(n) => Err(ScoringError::OutOfRangeAnswer { values: vec![*n] }),
    }
}

/// Normalizes a batch of responses in one pass.
///
/// The batch succeeds or fails as a whole: when some values cannot be
/// normalized, the error carries every one of them, so that a bad import
/// surfaces all of its problems at once instead of one per run. When both
/// bad labels and bad integers are present, the labels are reported first.
///
/// The result preserves the input order, duplicates included.
pub fn normalize_all(
    responses: &[RawResponse],
    scale: &LikertScale,
) -> Result<Vec<(String, u8)>, ScoringError> {
    let mut scored: Vec<(String, u8)> = Vec::with_capacity(responses.len());
    let mut bad_labels: Vec<String> = Vec::new();
    let mut bad_picks: Vec<i64> = Vec::new();

    for r in responses.iter() {
        match &r.value {
            AnswerValue::Label(s) => match scale.score_of(s) {
                Some(score) => scored.push((r.question_code.clone(), score)),
                None => bad_labels.push(s.clone()),
            },
            AnswerValue::Selected(n) if (1..=5).contains(n) => {
                scored.push((r.question_code.clone(), *n as u8))
            }
            AnswerValue::Selected(n) => bad_picks.push(*n),
        }
    }

    if !bad_labels.is_empty() {
        debug!(
            "normalize_all: {:?} unrecognized labels: {:?}",
            bad_labels.len(),
            bad_labels
        );
        return Err(ScoringError::UnrecognizedAnswer { values: bad_labels });
    }
    if !bad_picks.is_empty() {
        debug!(
            "normalize_all: {:?} out-of-range picks: {:?}",
            bad_picks.len(),
            bad_picks
        );
        return Err(ScoringError::OutOfRangeAnswer { values: bad_picks });
    }
    Ok(scored)
}

/// Aggregates normalized scores into per-axis means and the global index.
///
/// The index is axis-first: each axis contributes its mean exactly once,
/// so an axis backed by two questions weighs as much as an axis backed by
/// ten. Axis means are rounded to 2 decimals, the index to 1 decimal, and
/// no other rounding happens anywhere.
///
/// Every question of the catalog must have a score in `normalized`. Missing
/// codes fail with [ScoringError::IncompleteSubmission] naming all of them.
/// Scores for codes outside the catalog are ignored here: callers that care
/// reject them at their own boundary (see [run_scoring]).
pub fn aggregate(
    questions: &[Question],
    normalized: &HashMap<String, u8>,
) -> Result<ScoreCard, ScoringError> {
    if questions.is_empty() {
        return Err(ScoringError::EmptySurvey);
    }

    let mut axis_names: Vec<String> = Vec::new();
    let mut axis_ids: HashMap<String, AxisId> = HashMap::new();
    let mut tallies: Vec<AxisTally> = Vec::new();
    let mut missing: Vec<String> = Vec::new();

    for q in questions.iter() {
        let aid = match axis_ids.get(&q.axis) {
            Some(aid) => *aid,
            None => {
                let aid = AxisId(axis_names.len() as u32);
                axis_ids.insert(q.axis.clone(), aid);
                axis_names.push(q.axis.clone());
                tallies.push(AxisTally::EMPTY);
                aid
            }
        };
        match normalized.get(&q.code) {
            Some(score) => tallies[aid.0 as usize].add(*score),
            None => missing.push(q.code.clone()),
        }
    }

    if !missing.is_empty() {
        debug!("aggregate: missing answers for {:?}", missing);
        return Err(ScoringError::IncompleteSubmission { missing });
    }

    let axis_scores: Vec<AxisScore> = axis_names
        .iter()
        .enumerate()
        .map(|(idx, name)| AxisScore {
            axis: name.clone(),
            mean: round2(tallies[idx].mean()),
        })
        .collect();

    let axis_sum: f64 = axis_scores.iter().map(|asc| asc.mean).sum();
    let global_index = round1(axis_sum / (axis_scores.len() as f64) / 5.0 * 100.0);

    Ok(ScoreCard {
        axis_scores,
        global_index,
    })
}

/// Looks a global index up in the maturity tier table.
///
/// The first row with `min <= index <= max` wins, in table order. `None`
/// means the table does not cover this value. A hole in the table is a
/// configuration gap, not a data error, so classification never fails: the
/// caller renders `None` as "not evaluated" and moves on.
pub fn classify(global_index: f64, tiers: &[MaturityTier]) -> Option<MaturityTier> {
    let found = tiers
        .iter()
        .find(|t| t.min <= global_index && global_index <= t.max);
    if found.is_none() {
        debug!(
            "classify: no tier covers index {:?} (table has {:?} rows)",
            global_index,
            tiers.len()
        );
    }
    found.cloned()
}

/// Scores one complete submission end to end.
///
/// Arguments:
/// * `questions` the question catalog, one entry per statement of the survey
/// * `responses` the respondent's answers. Every catalog question must be
///   answered, every answer must belong to a catalog question, and a
///   question answered several times keeps the last answer.
/// * `scale` the active answer scale
/// * `tiers` the maturity interpretation table. An empty table is valid and
///   simply leaves the report without a tier.
pub fn run_scoring(
    questions: &[Question],
    responses: &[RawResponse],
    scale: &LikertScale,
    tiers: &[MaturityTier],
) -> Result<ScoreReport, ScoringError> {
    info!(
        "run_scoring: processing {:?} responses against {:?} questions",
        responses.len(),
        questions.len()
    );

    let scored = normalize_all(responses, scale)?;

    let known: HashSet<&str> = questions.iter().map(|q| q.code.as_str()).collect();
    let unknown: Vec<String> = scored
        .iter()
        .map(|(code, _)| code)
        .filter(|code| !known.contains(code.as_str()))
        .cloned()
        .collect();
    if !unknown.is_empty() {
        debug!("run_scoring: unknown question codes {:?}", unknown);
        return Err(ScoringError::UnknownQuestion { codes: unknown });
    }

    // Later answers for the same code overwrite earlier ones.
    let by_code: HashMap<String, u8> = scored.iter().cloned().collect();
    let card = aggregate(questions, &by_code)?;
    let maturity = classify(card.global_index, tiers);

    info!(
        "run_scoring: global index {:?}, maturity {:?}",
        card.global_index,
        maturity.as_ref().map(|t| t.label.as_str())
    );

    // Per-question scores are reported in catalog order.
    let mut scores: Vec<(String, u8)> = Vec::with_capacity(questions.len());
    for q in questions.iter() {
        if let Some(score) = by_code.get(&q.code) {
            scores.push((q.code.clone(), *score));
        }
    }

    Ok(ScoreReport {
        scores,
        card,
        maturity,
    })
}

/// Averages several score cards into a single cohort card.
///
/// This is the collective view of a survey campaign: each axis mean is the
/// mean of the respondents' means for that axis, and the global index is
/// recomputed from the cohort axis means. A card that does not carry an
/// axis simply does not contribute to that axis.
///
/// Axes are reported in order of first appearance across the cards.
pub fn aggregate_cohort(cards: &[ScoreCard]) -> Result<ScoreCard, ScoringError> {
    info!("aggregate_cohort: merging {:?} score cards", cards.len());

    let mut axis_names: Vec<String> = Vec::new();
    let mut axis_ids: HashMap<String, usize> = HashMap::new();
    let mut tallies: Vec<MeanTally> = Vec::new();

    for card in cards.iter() {
        for asc in card.axis_scores.iter() {
            let idx = match axis_ids.get(&asc.axis) {
                Some(idx) => *idx,
                None => {
                    let idx = axis_names.len();
                    axis_ids.insert(asc.axis.clone(), idx);
                    axis_names.push(asc.axis.clone());
                    tallies.push(MeanTally::EMPTY);
                    idx
                }
            };
            tallies[idx].add(asc.mean);
        }
    }

    if axis_names.is_empty() {
        return Err(ScoringError::EmptySurvey);
    }

    let axis_scores: Vec<AxisScore> = axis_names
        .iter()
        .enumerate()
        .map(|(idx, name)| AxisScore {
            axis: name.clone(),
            mean: round2(tallies[idx].mean()),
        })
        .collect();

    let axis_sum: f64 = axis_scores.iter().map(|asc| asc.mean).sum();
    let global_index = round1(axis_sum / (axis_scores.len() as f64) / 5.0 * 100.0);

    Ok(ScoreCard {
        axis_scores,
        global_index,
    })
}

/// Checks a question catalog before it is used for scoring.
///
/// The catalog must be non-empty, every entry must have a non-blank code
/// and axis, and codes must be unique. Loaders are expected to call this
/// once at load time so that a malformed catalog never reaches the engine.
pub fn validate_catalog(questions: &[Question]) -> Result<(), ScoringError> {
    if questions.is_empty() {
        return Err(ScoringError::EmptySurvey);
    }
    let mut seen: HashSet<&str> = HashSet::new();
    for (idx, q) in questions.iter().enumerate() {
        if q.code.trim().is_empty() || q.axis.trim().is_empty() {
            return Err(ScoringError::BlankQuestionField { position: idx + 1 });
        }
        if !seen.insert(q.code.as_str()) {
            return Err(ScoringError::DuplicateQuestion {
                code: q.code.clone(),
            });
        }
    }
    Ok(())
}
