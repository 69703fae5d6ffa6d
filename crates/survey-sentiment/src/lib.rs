//! Survey Sentiment Analysis Library
//!
//! Analyses a table of survey responses whose questions are answered on a
//! six-point agreement scale, built with Rust and Polars.
//!
//! # Overview
//!
//! - **Loading**: xlsx/ods workbooks via `calamine`, CSV via Polars, every
//!   column read as text
//! - **Recoding**: Likert labels to scores 1-6, column roles from declared
//!   kinds or vocabulary detection, derived participation and tenure fields
//! - **Flagging**: questions whose mean sits more than one standard
//!   deviation below the mean of all question means
//! - **Associations**: Kruskal-Wallis for grade, gender and participation;
//!   Spearman for tenure; filtered by significance and effect size
//! - **Charting**: bar chart of the lowest-scoring questions
//! - **Reporting**: console summary and JSON report
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use survey_sentiment::{AnalysisConfig, ReportGenerator, SurveyAnalysis};
//!
//! let config = AnalysisConfig::builder()
//!     .min_group_size(10)
//!     .top_n(10)
//!     .build()?;
//!
//! let outcome = SurveyAnalysis::builder()
//!     .config(config)
//!     .chart_path("chart_low_sentiments.png")
//!     .build()?
//!     .run_file("2024_Biennial_Census_Results.xlsx")?;
//!
//! let report = ReportGenerator::build_report("2024_Biennial_Census_Results.xlsx", &outcome);
//! println!("{}", serde_json::to_string_pretty(&report)?);
//! ```
//!
//! # Column Roles
//!
//! Every column can be tagged explicitly with a [`ColumnKind`]. Untagged
//! columns are detected from their answers unless
//! [`AnalysisConfig::strict_schema`] is set:
//!
//! ```rust,ignore
//! use survey_sentiment::{AnalysisConfig, ColumnKind};
//!
//! let config = AnalysisConfig::builder()
//!     .strict_schema(true)
//!     .column_kind("I feel safe at school", ColumnKind::Sentiment)
//!     .column_kind("Any other comments?", ColumnKind::Ignore)
//!     .build()?;
//! ```

pub mod chart;
pub mod config;
pub mod error;
pub mod likert;
pub mod loader;
pub mod pipeline;
pub mod recoder;
pub mod reporting;
pub mod statistics;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use chart::render_low_sentiment_chart;
pub use config::{
    AnalysisConfig, AnalysisConfigBuilder, ColumnKind, ConfigValidationError, TraitColumns,
};
pub use error::{AnalysisError, Result as AnalysisResult, ResultExt};
pub use likert::{LikertScale, MAX_SCORE, MIN_SCORE};
pub use loader::load_responses;
pub use pipeline::{SurveyAnalysis, SurveyAnalysisBuilder, find_associations, flag_low_sentiment};
pub use recoder::{classify_columns, derive_fields, encode, extract_years};
pub use reporting::{AnalysisReport, ConsoleSummary, ReportGenerator};
pub use types::{
    AnalysisOutcome, AssociationMethod, AssociationResult, ChartOutput, ColumnSchema,
    QuestionScore, SentimentSummary,
};
