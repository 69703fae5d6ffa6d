//! Custom error types for the survey analysis.
//!
//! This module provides the error hierarchy using `thiserror` so every stage
//! (loading, recoding, statistics, charting) reports failures the same way.

use thiserror::Error;

/// The main error type for the survey analysis.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The loaded table has no header row or no columns.
    #[error("Dataset is empty: {0}")]
    EmptyDataset(String),

    /// A statistical routine was handed too little (or degenerate) data.
    #[error("Insufficient data for {test}: {reason}")]
    InsufficientData { test: String, reason: String },

    /// Spreadsheet (xlsx/ods) could not be opened or read.
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    /// Chart rendering failed.
    #[error("Failed to render chart: {0}")]
    Chart(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<AnalysisError>,
    },
}

impl AnalysisError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        AnalysisError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Shorthand for [`AnalysisError::InsufficientData`].
    pub fn insufficient(test: impl Into<String>, reason: impl Into<String>) -> Self {
        AnalysisError::InsufficientData {
            test: test.into(),
            reason: reason.into(),
        }
    }

    /// Get a stable error code for machine-readable output.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::EmptyDataset(_) => "EMPTY_DATASET",
            Self::InsufficientData { .. } => "INSUFFICIENT_DATA",
            Self::Spreadsheet(_) => "SPREADSHEET_ERROR",
            Self::Chart(_) => "CHART_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Whether the error only means a single comparison could not be computed.
    ///
    /// The association stage skips such pairs instead of aborting the run.
    pub fn is_insufficient_data(&self) -> bool {
        match self {
            Self::InsufficientData { .. } => true,
            Self::WithContext { source, .. } => source.is_insufficient_data(),
            _ => false,
        }
    }
}

impl From<calamine::Error> for AnalysisError {
    fn from(err: calamine::Error) -> Self {
        AnalysisError::Spreadsheet(err.to_string())
    }
}

/// Result type alias for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| AnalysisError::Polars(e).with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| AnalysisError::Io(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            AnalysisError::ColumnNotFound("Timestamp".to_string()).error_code(),
            "COLUMN_NOT_FOUND"
        );
        assert_eq!(
            AnalysisError::insufficient("kruskal", "one group").error_code(),
            "INSUFFICIENT_DATA"
        );
    }

    #[test]
    fn test_is_insufficient_data() {
        assert!(AnalysisError::insufficient("spearman", "n < 3").is_insufficient_data());
        assert!(
            AnalysisError::insufficient("spearman", "n < 3")
                .with_context("Years at HKIS")
                .is_insufficient_data()
        );
        assert!(!AnalysisError::Chart("boom".to_string()).is_insufficient_data());
    }

    #[test]
    fn test_with_context() {
        let error =
            AnalysisError::EmptyDataset("no header".to_string()).with_context("Loading survey");
        assert!(error.to_string().contains("Loading survey"));
        assert_eq!(error.error_code(), "EMPTY_DATASET");
    }

    #[test]
    fn test_io_context() {
        let result: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing",
        ));
        let error = result.context("Opening survey.xlsx").unwrap_err();
        assert_eq!(error.error_code(), "IO_ERROR");
        assert!(error.to_string().starts_with("Opening survey.xlsx"));
    }
}
