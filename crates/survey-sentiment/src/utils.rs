//! Shared utilities for the survey analysis.
//!
//! Column extraction helpers that turn polars columns into plain vectors the
//! statistics code can work with, plus a few string helpers.

use crate::error::{AnalysisError, Result};
use polars::prelude::*;

// =============================================================================
// Column Extraction
// =============================================================================

/// Column names of a DataFrame as owned strings, in table order.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect()
}

/// Whether the DataFrame has a column with this exact name.
#[inline]
pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|col| col.as_str() == name)
}

/// Read a column as optional strings. Non-string columns are cast.
pub fn string_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = df
        .column(name)
        .map_err(|_| AnalysisError::ColumnNotFound(name.to_string()))?;
    let series = column.as_materialized_series().cast(&DataType::String)?;
    Ok(series
        .str()?
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect())
}

/// Read a column as optional floats. NaN is reported as missing.
pub fn float_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = df
        .column(name)
        .map_err(|_| AnalysisError::ColumnNotFound(name.to_string()))?;
    let series = column.as_materialized_series().cast(&DataType::Float64)?;
    Ok(series
        .f64()?
        .into_iter()
        .map(|value| value.filter(|v| !v.is_nan()))
        .collect())
}

/// Distinct non-missing values in order of first appearance.
pub fn distinct_in_order(values: &[Option<String>]) -> Vec<&str> {
    let mut seen = std::collections::HashSet::new();
    values
        .iter()
        .flatten()
        .map(String::as_str)
        .filter(|value| seen.insert(*value))
        .collect()
}

// =============================================================================
// String Utilities
// =============================================================================

/// Cut `text` to `max_chars` characters and append "..." when it was longer.
///
/// Counts characters, not bytes, so multi-byte question text is never split.
pub fn truncate_label(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let mut cut: String = text.chars().take(max_chars).collect();
        cut.push_str("...");
        cut
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_df() -> DataFrame {
        df! {
            "answer" => [Some("Agree"), None, Some("Disagree")],
            "score" => [Some(5.0f64), Some(f64::NAN), None],
        }
        .unwrap()
    }

    #[test]
    fn test_string_values() {
        let df = sample_df();
        assert_eq!(
            string_values(&df, "answer").unwrap(),
            vec![Some("Agree".to_string()), None, Some("Disagree".to_string())]
        );
    }

    #[test]
    fn test_float_values_treats_nan_as_missing() {
        let df = sample_df();
        assert_eq!(float_values(&df, "score").unwrap(), vec![Some(5.0), None, None]);
    }

    #[test]
    fn test_missing_column() {
        let df = sample_df();
        let err = string_values(&df, "nope").unwrap_err();
        assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
        assert!(!has_column(&df, "nope"));
        assert!(has_column(&df, "answer"));
    }

    #[test]
    fn test_distinct_in_order() {
        let values = vec![
            Some("11".to_string()),
            None,
            Some("9".to_string()),
            Some("11".to_string()),
        ];
        assert_eq!(distinct_in_order(&values), vec!["11", "9"]);
    }

    #[test]
    fn test_truncate_label() {
        assert_eq!(truncate_label("short", 55), "short");
        let long = "x".repeat(60);
        let cut = truncate_label(&long, 55);
        assert_eq!(cut.len(), 58);
        assert!(cut.ends_with("..."));
        assert_eq!(truncate_label(&"y".repeat(55), 55), "y".repeat(55));
    }

    #[test]
    fn test_truncate_label_multibyte() {
        let text = "é".repeat(10);
        assert_eq!(truncate_label(&text, 3), "ééé...");
    }
}
