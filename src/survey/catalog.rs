// Loading of the question catalog.

use std::path::PathBuf;

use calamine::DataType;
use log::{debug, info};
use snafu::prelude::*;

use culture_index::*;

use crate::survey::io_common::get_range;
use crate::survey::io_csv::get_records;
use crate::survey::*;

/// Reads the question catalog and checks it is structurally sound: no
/// blank field, no duplicated question code.
pub fn read_catalog(root_path: &str, source: &CatalogSource) -> SurveyResult<Vec<Question>> {
    let p: PathBuf = [root_path, source.file_path.as_str()].iter().collect();
    let p2 = p.as_path().display().to_string();
    info!("read_catalog: reading the question catalog from {:?}", p2);
    let questions = match source.provider.as_str() {
        "csv" => read_csv_catalog(p2, source),
        "excel" => read_excel_catalog(p2, source),
        x => {
            return Err(SurveyError::UnknownProvider {
                provider: x.to_string(),
            })
        }
    }
    .map_err(|e| *e)?;
    validate_catalog(&questions).context(InvalidCatalogSnafu {})?;
    debug!("read_catalog: {:?} questions", questions.len());
    Ok(questions)
}

fn read_csv_catalog(path: String, source: &CatalogSource) -> BSurveyResult<Vec<Question>> {
    let code_idx = source.code_column_index()?;
    let axis_idx = source.axis_column_index()?;
    let text_idx = source.text_column_index()?;

    let (records, row_offset) = get_records(&path, source.first_question_row_index()?)?;
    let mut res: Vec<Question> = Vec::new();
    for (idx, line_r) in records.enumerate() {
        let lineno = idx + row_offset + 1;
        let line = line_r.context(CsvLineParseSnafu {})?;
        let code = line
            .get(code_idx)
            .context(CsvLineTooShortSnafu { lineno })?
            .trim()
            .to_string();
        let axis = line
            .get(axis_idx)
            .context(CsvLineTooShortSnafu { lineno })?
            .trim()
            .to_string();
        let text = line
            .get(text_idx)
            .context(CsvLineTooShortSnafu { lineno })?
            .trim()
            .to_string();
        if code.is_empty() && axis.is_empty() && text.is_empty() {
            continue;
        }
        res.push(Question { code, axis, text });
    }
    Ok(res)
}

fn read_excel_catalog(path: String, source: &CatalogSource) -> BSurveyResult<Vec<Question>> {
    let code_idx = source.code_column_index()?;
    let axis_idx = source.axis_column_index()?;
    let text_idx = source.text_column_index()?;
    let first_row = source.first_question_row_index()?;

    let wrange = get_range(path.as_str(), &source.excel_worksheet_name)?;
    let mut res: Vec<Question> = Vec::new();
    for (idx, row) in wrange.rows().enumerate().skip(first_row) {
        if row.iter().all(|c| matches!(c, DataType::Empty)) {
            continue;
        }
        let lineno = (idx + 1) as u64;
        let code = catalog_cell(row, code_idx, lineno)?;
        let axis = catalog_cell(row, axis_idx, lineno)?;
        let text = catalog_cell(row, text_idx, lineno)?;
        res.push(Question { code, axis, text });
    }
    Ok(res)
}

fn catalog_cell(row: &[DataType], col: usize, lineno: u64) -> BSurveyResult<String> {
    match row.get(col) {
        Some(DataType::String(s)) => Ok(s.trim().to_string()),
        Some(DataType::Int(i)) => Ok(i.to_string()),
        Some(DataType::Float(f)) => Ok(format!("{}", f)),
        Some(DataType::Empty) | None => Ok("".to_string()),
        Some(v) => Err(Box::new(SurveyError::ExcelWrongCellType {
            lineno,
            content: format!("{:?} IN {:?}", v, row),
        })),
    }
}
