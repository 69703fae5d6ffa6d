//! Report generation module.
//!
//! [`AnalysisReport`] is the single output shape for:
//! - JSON output to stdout (`--json` CLI flag)
//! - JSON file output (`--emit-report` CLI flag)
//! - Programmatic access in library mode
//!
//! # Example
//!
//! ```rust,ignore
//! use survey_sentiment::reporting::{ConsoleSummary, ReportGenerator};
//!
//! let report = ReportGenerator::build_report("census.xlsx", &outcome);
//! print!("{}", ConsoleSummary::new(&report, 20));
//!
//! let generator = ReportGenerator::new("reports");
//! generator.write_report_to_file(&report, "census")?;
//! ```

mod generator;

pub use generator::{report_stem, AnalysisReport, ConsoleSummary, ReportGenerator};
