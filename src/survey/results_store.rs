// Persistence of the tabulated results.

use std::fs;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use log::{debug, info};
use serde_json::Value as JSValue;
use snafu::prelude::*;

use crate::survey::*;

/// Writes the summary, creating the parent directories when needed.
pub fn write_summary(path: &str, contents: &str) -> SurveyResult<()> {
    create_parent_dirs(Path::new(path))?;
    fs::write(path, contents).context(WritingOutputSnafu { path })?;
    info!("write_summary: wrote the summary to {:?}", path);
    Ok(())
}

/// Appends one line per completed submission to the results store.
///
/// The store is append-only: a new campaign adds lines, it never rewrites
/// the history. Incomplete submissions are not stored.
pub fn append_results(path: &Path, records: &[JSValue]) -> SurveyResult<()> {
    if records.is_empty() {
        debug!("append_results: no completed submission to append");
        return Ok(());
    }
    let display = path.display().to_string();
    create_parent_dirs(path)?;
    let mut f = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .context(WritingOutputSnafu {
            path: display.as_str(),
        })?;
    for record in records.iter() {
        let line = serde_json::to_string(record).context(ParsingJsonSnafu {})?;
        writeln!(f, "{}", line).context(WritingOutputSnafu {
            path: display.as_str(),
        })?;
    }
    info!(
        "append_results: appended {:?} result(s) to {:?}",
        records.len(),
        display
    );
    Ok(())
}

fn create_parent_dirs(path: &Path) -> SurveyResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).context(WritingOutputSnafu {
                path: path.display().to_string(),
            })?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn appending_preserves_previous_lines() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("store").join("results.jsonl");

        append_results(&p, &[json!({"respondent": "a"})]).unwrap();
        append_results(&p, &[json!({"respondent": "b"}), json!({"respondent": "c"})]).unwrap();

        let contents = fs::read_to_string(&p).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        let first: JSValue = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["respondent"], json!("a"));
    }

    #[test]
    fn empty_batches_do_not_create_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("results.jsonl");
        append_results(&p, &[]).unwrap();
        assert!(fs::metadata(&p).is_err());
    }

    #[test]
    fn summaries_create_their_directory() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("out").join("summary.json");
        write_summary(p.display().to_string().as_str(), "{}").unwrap();
        assert_eq!(fs::read_to_string(&p).unwrap(), "{}");
    }
}
