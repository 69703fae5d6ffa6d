//! Survey loading.
//!
//! Reads a spreadsheet export (xlsx/xls/ods via `calamine`) or a CSV export
//! (via polars) into a DataFrame whose columns are all strings, then drops
//! the timestamp column.

use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result, ResultExt};
use crate::utils::has_column;
use calamine::{Data, Reader, open_workbook_auto};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::collections::HashMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const SPREADSHEET_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Load survey responses and drop the configured timestamp column.
///
/// A missing or unreadable file is fatal.
pub fn load_responses(path: impl AsRef<Path>, config: &AnalysisConfig) -> Result<DataFrame> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(AnalysisError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Input file not found: {}", path.display()),
        )));
    }

    info!("Loading survey responses from: {}", path.display());
    let df = if is_spreadsheet(path) {
        load_spreadsheet(path)?
    } else {
        load_csv_with_fallbacks(path)?
    };
    info!("Survey loaded: {} rows x {} columns", df.height(), df.width());

    drop_timestamp(df, &config.timestamp_column)
}

/// Drop the timestamp column if present.
pub fn drop_timestamp(df: DataFrame, column: &str) -> Result<DataFrame> {
    if has_column(&df, column) {
        debug!("Dropping column '{}'", column);
        Ok(df.drop(column)?)
    } else {
        debug!("No '{}' column to drop", column);
        Ok(df)
    }
}

fn is_spreadsheet(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            SPREADSHEET_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// Read the first worksheet; its first row is the header.
fn load_spreadsheet(path: &Path) -> Result<DataFrame> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AnalysisError::EmptyDataset(format!("{} has no worksheets", path.display())))??;

    let mut rows = range.rows();
    let header = rows.next().ok_or_else(|| {
        AnalysisError::EmptyDataset(format!("{} has no header row", path.display()))
    })?;

    let headers: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(idx, cell)| cell_text(cell).unwrap_or_else(|| format!("column_{}", idx + 1)))
        .collect();

    let mut columns: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    for row in rows {
        for (idx, values) in columns.iter_mut().enumerate() {
            values.push(row.get(idx).and_then(cell_text));
        }
    }

    build_string_frame(headers, columns)
}

/// Text of a spreadsheet cell; empty and error cells are missing.
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(text) if text.is_empty() => None,
        Data::String(text) => Some(text.clone()),
        // Whole numbers (grades, tenure) come back as floats.
        Data::Float(value) if value.is_finite() && value.fract() == 0.0 => {
            Some(format!("{}", *value as i64))
        }
        other => Some(other.to_string()),
    }
}

/// Assemble a DataFrame of string columns, de-duplicating header names.
fn build_string_frame(headers: Vec<String>, columns: Vec<Vec<Option<String>>>) -> Result<DataFrame> {
    if headers.is_empty() {
        return Err(AnalysisError::EmptyDataset("no columns".to_string()));
    }

    let series: Vec<Column> = dedupe_headers(headers)
        .into_iter()
        .zip(columns)
        .map(|(name, values)| Column::new(name.into(), values))
        .collect();

    Ok(DataFrame::new(series)?)
}

/// Make header names unique by suffixing repeats with `_duplicated_N`.
fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    headers
        .into_iter()
        .map(|name| {
            let count = seen.entry(name.clone()).or_insert(0);
            *count += 1;
            if *count == 1 {
                name
            } else {
                format!("{}_duplicated_{}", name, *count - 1)
            }
        })
        .collect()
}

/// Read every column as a string column.
fn csv_options() -> CsvReadOptions {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
}

/// Load CSV with multiple fallback strategies.
fn load_csv_with_fallbacks(path: &Path) -> Result<DataFrame> {
    // Strategy 1: standard loading with quote handling
    match csv_options()
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
        .finish()
    {
        Ok(df) => return Ok(df),
        Err(e) => debug!("Standard loading failed: {}", e),
    }

    // Strategy 2: without quote handling
    match csv_options()
        .with_parse_options(CsvParseOptions::default().with_quote_char(None))
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
        .finish()
    {
        Ok(df) => return Ok(df),
        Err(e) => debug!("Loading without quotes failed: {}", e),
    }

    // Strategy 3: pre-clean content
    let content = std::fs::read_to_string(path).context(format!("Reading {}", path.display()))?;
    csv_options()
        .into_reader_with_file_handle(Cursor::new(clean_csv_content(&content)))
        .finish()
        .context(format!("Parsing {}", path.display()))
}

/// Collapse doubled quotes and drop blank lines.
fn clean_csv_content(content: &str) -> String {
    content
        .replace("\"\"\"", "\"")
        .replace("\"\"", "\"")
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
