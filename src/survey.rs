use log::{debug, info, warn};

use culture_index::*;
use snafu::{prelude::*, Snafu};

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use std::collections::HashSet;
use text_diff::print_diff;

use crate::args::Args;

pub mod catalog;
pub mod config_reader;
pub mod io_common;
pub mod io_csv;
pub mod io_forms;
pub mod io_json;
pub mod results_store;

pub use crate::survey::config_reader::*;

#[derive(Debug, Snafu)]
pub enum SurveyError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The Excel input has no usable worksheet or no header row"))]
    EmptyExcel {},
    #[snafu(display("The workbook has several worksheets, set excelWorksheetName to pick one"))]
    AmbiguousWorksheet {},
    #[snafu(display("The tabular formats need a header row before the first response row"))]
    MissingHeaderRow {},
    #[snafu(display("Could not understand the cell content at line {lineno}: {content}"))]
    ExcelWrongCellType { lineno: u64, content: String },
    #[snafu(display("Question {code} has no matching column in the input header"))]
    QuestionNotInHeader { code: String },
    #[snafu(display("Error opening file {path}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON content"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Expected a positive integer or an Excel-style column letter"))]
    ParsingJsonNumber {},
    #[snafu(display("Could not understand the answer value: {content}"))]
    JsonWrongValueType { content: String },
    #[snafu(display("The configuration path has no parent directory"))]
    MissingParentDir {},
    #[snafu(display("Error opening CSV file"))]
    CsvOpen { source: csv::Error },
    #[snafu(display("Error parsing a CSV line"))]
    CsvLineParse { source: csv::Error },
    #[snafu(display("CSV line {lineno} has too few columns"))]
    CsvLineTooShort { lineno: usize },
    #[snafu(display("Invalid question catalog: {source}"))]
    InvalidCatalog { source: ScoringError },
    #[snafu(display("Invalid answer labels: {source}"))]
    InvalidScale { source: ScoringError },
    #[snafu(display("Invalid answer values: {details}"))]
    InvalidAnswers { details: String },
    #[snafu(display("Submission from {respondent} answers unknown question(s): {codes}"))]
    UnknownQuestions { respondent: String, codes: String },
    #[snafu(display("Submission from {respondent} has several answers for question {code}"))]
    DuplicateAnswer { respondent: String, code: String },
    #[snafu(display("Respondent {respondent} is not on the roster"))]
    UnknownRespondent { respondent: String },
    #[snafu(display("Responses provider not supported: {provider}"))]
    UnknownProvider { provider: String },
    #[snafu(display("Error writing file {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type SurveyResult<T> = Result<T, SurveyError>;
pub type BSurveyResult<T> = Result<T, Box<SurveyError>>;

/// A respondent's answers, as parsed by the readers.
/// This is before validation against the catalog and the roster.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ParsedSubmission {
    pub respondent: String,
    pub answers: Vec<(String, AnswerValue)>,
}

/// A validated submission, ready for scoring.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Submission {
    pub respondent: String,
    pub responses: Vec<RawResponse>,
}

fn read_response_data(
    root_path: &str,
    source: &ResponseSource,
    questions: &[Question],
) -> SurveyResult<Vec<ParsedSubmission>> {
    let p: PathBuf = [root_path, source.file_path.as_str()].iter().collect();
    let p2 = p.as_path().display().to_string();
    info!("read_response_data: attempting to read responses from {:?}", p2);
    let parsed = match source.provider.as_str() {
        "csv" => io_csv::read_long_csv(p2, source),
        "csv_wide" => io_csv::read_wide_csv(p2, source, questions),
        "forms" => io_forms::read_forms_responses(p2, source, questions),
        "json" => io_json::read_json_responses(p2),
        x => {
            return Err(SurveyError::UnknownProvider {
                provider: x.to_string(),
            })
        }
    }
    .map_err(|e| *e)?;
    debug!(
        "read_response_data: {:?} submissions from {:?}",
        parsed.len(),
        source.file_path
    );
    Ok(parsed)
}

/// Checks the parsed submissions against the catalog and the roster.
///
/// Structural defects (answers to unknown questions, several answers for
/// the same question) fail the whole run: they mean the input file does not
/// match the catalog. Respondents missing from the roster are skipped or
/// rejected according to the configured policy.
fn validate_submissions(
    parsed: &[ParsedSubmission],
    questions: &[Question],
    roster: &Option<HashSet<String>>,
    policy: UnknownRespondentPolicy,
) -> SurveyResult<Vec<Submission>> {
    let known: HashSet<&str> = questions.iter().map(|q| q.code.as_str()).collect();
    let mut res: Vec<Submission> = Vec::new();

    for pb in parsed.iter() {
        if let Some(roster) = roster {
            if !roster.contains(&pb.respondent) {
                match policy {
                    UnknownRespondentPolicy::Skip => {
                        warn!(
                            "validate_submissions: {:?} is not on the roster, skipping",
                            pb.respondent
                        );
                        continue;
                    }
                    UnknownRespondentPolicy::Reject => {
                        return Err(SurveyError::UnknownRespondent {
                            respondent: pb.respondent.clone(),
                        });
                    }
                }
            }
        }

        let mut seen: HashSet<&str> = HashSet::new();
        let mut unknown: Vec<String> = Vec::new();
        let mut responses: Vec<RawResponse> = Vec::new();
        for (code, value) in pb.answers.iter() {
            if !known.contains(code.as_str()) {
                unknown.push(code.clone());
                continue;
            }
            if !seen.insert(code.as_str()) {
                return Err(SurveyError::DuplicateAnswer {
                    respondent: pb.respondent.clone(),
                    code: code.clone(),
                });
            }
            responses.push(RawResponse {
                question_code: code.clone(),
                value: value.clone(),
            });
        }
        if !unknown.is_empty() {
            return Err(SurveyError::UnknownQuestions {
                respondent: pb.respondent.clone(),
                codes: unknown.join(", "),
            });
        }

        res.push(Submission {
            respondent: pb.respondent.clone(),
            responses,
        });
    }
    Ok(res)
}

fn build_scale(labels: &Option<Vec<String>>) -> SurveyResult<LikertScale> {
    match labels {
        Some(labels) => LikertScale::from_labels(labels).context(InvalidScaleSnafu {}),
        None => Ok(LikertScale::default()),
    }
}

/// The built-in interpretation table, used when the configuration does not
/// carry its own tiers.
pub fn default_tiers() -> Vec<MaturityTier> {
    vec![
        MaturityTier {
            label: "Emerging".to_string(),
            min: 0.0,
            max: 49.9,
            description: "Culture work is just starting; wins are individual, not systemic"
                .to_string(),
        },
        MaturityTier {
            label: "Developing".to_string(),
            min: 50.0,
            max: 74.9,
            description: "Practices are taking hold but depend on a few champions".to_string(),
        },
        MaturityTier {
            label: "Advanced".to_string(),
            min: 75.0,
            max: 100.0,
            description: "The culture sustains itself across teams".to_string(),
        },
    ]
}

fn build_tier_table(rows: &Option<Vec<TierRow>>) -> SurveyResult<Vec<MaturityTier>> {
    let tiers: Vec<MaturityTier> = match rows {
        Some(rows) => rows
            .iter()
            .map(|r| MaturityTier {
                label: r.label.clone(),
                min: r.min,
                max: r.max,
                description: r.description.clone().unwrap_or_default(),
            })
            .collect(),
        None => default_tiers(),
    };
    validate_tier_table(&tiers)?;
    Ok(tiers)
}

/// Overlapping tiers refuse to load: two rows claiming the same index would
/// make the classification depend on the row order of the configuration
/// file. Holes are tolerated with a warning, an index falling in a hole is
/// reported as not evaluated.
fn validate_tier_table(tiers: &[MaturityTier]) -> SurveyResult<()> {
    for t in tiers.iter() {
        if t.max < t.min {
            whatever!(
                "maturity tier {:?} has its bounds reversed: [{}, {}]",
                t.label,
                t.min,
                t.max
            );
        }
    }
    let mut sorted: Vec<&MaturityTier> = tiers.iter().collect();
    sorted.sort_by(|a, b| a.min.partial_cmp(&b.min).unwrap_or(std::cmp::Ordering::Equal));
    for w in sorted.windows(2) {
        if w[1].min <= w[0].max {
            whatever!("maturity tiers {:?} and {:?} overlap", w[0].label, w[1].label);
        }
        // Indexes are published with one decimal, so a bound step of 0.1
        // between consecutive rows leaves no reachable hole.
        if w[1].min - w[0].max > 0.1 + 1e-9 {
            warn!(
                "validate_tier_table: hole between {:?} (up to {}) and {:?} (from {}), indexes in between will not be evaluated",
                w[0].label, w[0].max, w[1].label, w[1].min
            );
        }
    }
    Ok(())
}

fn axes_to_json(card: &ScoreCard) -> JSValue {
    let mut axes: JSMap<String, JSValue> = JSMap::new();
    for asc in card.axis_scores.iter() {
        axes.insert(asc.axis.clone(), json!(asc.mean));
    }
    JSValue::Object(axes)
}

fn maturity_to_json(maturity: &Option<MaturityTier>) -> JSValue {
    match maturity {
        Some(t) => json!(t.label),
        None => JSValue::Null,
    }
}

fn record_to_json(respondent: &str, timestamp: &str, report: &ScoreReport) -> JSValue {
    let mut scores: JSMap<String, JSValue> = JSMap::new();
    for (code, score) in report.scores.iter() {
        scores.insert(code.clone(), json!(*score));
    }
    json!({
        "respondent": respondent,
        "timestamp": timestamp,
        "scores": scores,
        "axes": axes_to_json(&report.card),
        "globalIndex": report.card.global_index,
        "maturity": maturity_to_json(&report.maturity),
    })
}

fn build_summary_js(
    config: &SurveyConfig,
    scale: &LikertScale,
    records: &[JSValue],
    cohort_js: &JSValue,
) -> JSValue {
    let c = OutputConfig {
        survey: config.output_settings.survey_name.clone(),
        date: config.output_settings.survey_date.clone(),
        organization: config.output_settings.organization.clone(),
        scale: scale.labels().to_vec(),
    };
    json!({
        "config": c,
        "results": records,
        "cohort": cohort_js })
}

fn effective_out_path(
    out_path: &Option<String>,
    root_path: &str,
    settings: &OutputSettings,
) -> Option<String> {
    match out_path {
        Some(p) => Some(p.clone()),
        None => settings.output_directory.as_ref().map(|dir| {
            let p: PathBuf = [root_path, dir.as_str(), "summary.json"].iter().collect();
            p.as_path().display().to_string()
        }),
    }
}

pub fn run_tabulation(
    config: &SurveyConfig,
    root_path: &str,
    out_path: &Option<String>,
    reference_path: &Option<String>,
) -> SurveyResult<()> {
    info!("run_tabulation: configuration: {:?}", config);

    let questions = catalog::read_catalog(root_path, &config.question_catalog)?;
    info!("run_tabulation: catalog has {:?} questions", questions.len());

    let scale = build_scale(&config.answer_labels)?;
    let tiers = build_tier_table(&config.maturity_tiers)?;

    let roster: Option<HashSet<String>> = match &config.roster {
        Some(roster_config) => {
            let p: PathBuf = [root_path, roster_config.file_path.as_str()].iter().collect();
            let names = io_csv::read_roster(p.as_path().display().to_string(), roster_config)
                .map_err(|e| *e)?;
            info!("run_tabulation: roster has {:?} respondents", names.len());
            Some(names)
        }
        None => None,
    };
    let policy = match &config.roster {
        Some(roster_config) => roster_config.policy()?,
        None => UnknownRespondentPolicy::Skip,
    };

    let mut parsed: Vec<ParsedSubmission> = Vec::new();
    for source in config.response_sources.iter() {
        let mut source_data = read_response_data(root_path, source, &questions)?;
        parsed.append(&mut source_data);
    }
    info!("run_tabulation: parsed {:?} submissions", parsed.len());

    let submissions = validate_submissions(&parsed, &questions, &roster, policy)?;

    // Score everything before writing anything out. Invalid answer values
    // are collected across the whole batch so that a bad import surfaces
    // all of its problems in a single run.
    let timestamp = Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
    let mut records: Vec<JSValue> = Vec::new();
    let mut completed: Vec<JSValue> = Vec::new();
    let mut cards: Vec<ScoreCard> = Vec::new();
    let mut invalid: Vec<String> = Vec::new();
    for sub in submissions.iter() {
        match run_scoring(&questions, &sub.responses, &scale, &tiers) {
            Result::Ok(report) => {
                let record = record_to_json(sub.respondent.as_str(), timestamp.as_str(), &report);
                completed.push(record.clone());
                records.push(record);
                cards.push(report.card);
            }
            Result::Err(ScoringError::IncompleteSubmission { missing }) => {
                warn!(
                    "run_tabulation: submission from {:?} is missing {:?} answer(s)",
                    sub.respondent,
                    missing.len()
                );
                records.push(json!({
                    "respondent": sub.respondent,
                    "incomplete": missing,
                }));
            }
            Result::Err(
                e @ (ScoringError::UnrecognizedAnswer { .. } | ScoringError::OutOfRangeAnswer { .. }),
            ) => {
                invalid.push(format!("{}: {}", sub.respondent, e));
            }
            Result::Err(e) => {
                whatever!("scoring failed for {:?}: {}", sub.respondent, e)
            }
        }
    }

    if !invalid.is_empty() {
        return Err(SurveyError::InvalidAnswers {
            details: invalid.join("; "),
        });
    }

    let cohort_js: JSValue = if cards.is_empty() {
        warn!("run_tabulation: no complete submission, the cohort block is empty");
        JSValue::Null
    } else {
        let cohort = match aggregate_cohort(&cards) {
            Result::Ok(card) => card,
            Result::Err(e) => {
                whatever!("cohort aggregation failed: {}", e)
            }
        };
        let maturity = classify(cohort.global_index, &tiers);
        json!({
            "respondents": cards.len(),
            "axes": axes_to_json(&cohort),
            "globalIndex": cohort.global_index,
            "maturity": maturity_to_json(&maturity),
        })
    };

    // Assemble the final json
    let summary_js = build_summary_js(config, &scale, &records, &cohort_js);
    let pretty_js_stats = serde_json::to_string_pretty(&summary_js).context(ParsingJsonSnafu {})?;

    match effective_out_path(out_path, root_path, &config.output_settings) {
        Some(p) if p != "stdout" => {
            results_store::write_summary(p.as_str(), &pretty_js_stats)?;
        }
        _ => {
            println!("stats:{}", pretty_js_stats);
        }
    }

    // The reference summary, if provided for comparison. Timestamps are
    // stripped from both sides: they change from run to run.
    if let Some(summary_p) = reference_path {
        let summary_ref = read_summary(summary_p.clone())?;
        let mut summary_ours = summary_js.clone();
        strip_timestamps(&mut summary_ours);
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        let pretty_js_ours =
            serde_json::to_string_pretty(&summary_ours).context(ParsingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_ours {
            warn!("Found differences with the reference summary");
            print_diff(pretty_js_summary_ref.as_str(), pretty_js_ours.as_ref(), "\n");
            whatever!("Difference detected between tabulated summary and reference summary")
        }
    }

    // The results store is only touched once the whole run has succeeded.
    if let Some(results_file) = &config.results_file {
        let p: PathBuf = [root_path, results_file.as_str()].iter().collect();
        results_store::append_results(p.as_path(), &completed)?;
    }

    Ok(())
}

fn base_config(args: &Args) -> SurveyResult<(SurveyConfig, String)> {
    match &args.config {
        Some(config_path) => {
            let mut config = read_config(config_path.as_str())?;
            if let Some(catalog_path) = &args.catalog {
                config.question_catalog = catalog_source_from_path(catalog_path.as_str());
            }
            let root_p = Path::new(config_path.as_str())
                .parent()
                .context(MissingParentDirSnafu {})?;
            let root_path = root_p.as_os_str().to_str().unwrap_or_default().to_string();
            Ok((config, root_path))
        }
        None => {
            let catalog_path = match &args.catalog {
                Some(p) => p.clone(),
                None => {
                    whatever!("a question catalog is required: pass --config or --catalog")
                }
            };
            let survey_name = match &args.input {
                Some(input_path) => io_common::simplify_file_name(input_path.as_str()),
                None => "survey".to_string(),
            };
            let config = SurveyConfig {
                output_settings: OutputSettings {
                    survey_name,
                    output_directory: None,
                    survey_date: None,
                    organization: None,
                },
                question_catalog: catalog_source_from_path(catalog_path.as_str()),
                response_sources: vec![],
                maturity_tiers: None,
                answer_labels: None,
                roster: None,
                results_file: None,
            };
            Ok((config, ".".to_string()))
        }
    }
}

pub fn run_survey(args: &Args) -> SurveyResult<()> {
    let (mut config, root_path) = base_config(args)?;

    if let Some(input_path) = &args.input {
        config.response_sources = vec![response_source_from_parts(
            input_path.as_str(),
            &args.input_type,
            &args.excel_worksheet_name,
        )];
    }
    if let Some(labels) = &args.labels {
        config.answer_labels = Some(labels.clone());
    }
    if config.response_sources.is_empty() {
        whatever!(
            "no response sources detected: pass --input or list responseSources in the configuration file"
        );
    }

    run_tabulation(&config, root_path.as_str(), &args.out, &args.reference)
}
