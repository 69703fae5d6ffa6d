use crate::error::Result;
use crate::types::{AnalysisOutcome, AssociationResult, QuestionScore, SentimentSummary};
use crate::utils::truncate_label;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

// ============================================================================
// Report Types
// ============================================================================

/// Everything a run produced, for `--json` output and `--emit-report` files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Timestamp when the report was generated
    pub generated_at: String,
    pub input_file: String,
    /// Responses analysed
    pub rows: usize,
    /// Columns after the timestamp was dropped
    pub columns: usize,
    pub sentiment_columns: Vec<String>,
    pub trait_columns: Vec<String>,
    pub ignored_columns: Vec<String>,
    pub summary: SentimentSummary,
    /// Kept associations, strongest effect first
    pub associations: Vec<AssociationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_error: Option<String>,
    pub duration_ms: u64,
}

impl AnalysisReport {
    pub fn flagged(&self) -> &[QuestionScore] {
        &self.summary.flagged
    }
}

// ============================================================================
// Report Generator
// ============================================================================

/// Writes reports to an output directory.
pub struct ReportGenerator {
    output_dir: PathBuf,
}

impl ReportGenerator {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Build a report from an analysis outcome.
    pub fn build_report(input_file: &str, outcome: &AnalysisOutcome) -> AnalysisReport {
        AnalysisReport {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            input_file: input_file.to_string(),
            rows: outcome.shape.0,
            columns: outcome.shape.1,
            sentiment_columns: outcome.schema.sentiment.clone(),
            trait_columns: outcome.schema.traits.clone(),
            ignored_columns: outcome.schema.ignored.clone(),
            summary: outcome.summary.clone(),
            associations: outcome.associations.clone(),
            chart_path: outcome
                .chart
                .as_ref()
                .map(|chart| chart.path.display().to_string()),
            chart_error: outcome.chart_error.clone(),
            duration_ms: outcome.duration_ms,
        }
    }

    /// Write a report as pretty JSON.
    ///
    /// If `report_base_name` is "census", the file is "census_report.json".
    pub fn write_report_to_file(
        &self,
        report: &AnalysisReport,
        report_base_name: &str,
    ) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;

        let report_path = self.output_dir.join(format!("{}_report.json", report_base_name));
        let mut file = File::create(&report_path)?;
        file.write_all(serde_json::to_string_pretty(report)?.as_bytes())?;

        info!("Report saved: {}", report_path.display());

        Ok(report_path)
    }
}

/// File stem of `path`, or "output" when it has none.
pub fn report_stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output")
        .to_string()
}

// ============================================================================
// Console Summary
// ============================================================================

const SENTIMENT_WIDTH: usize = 60;

/// Human-readable summary of a report: means and threshold, flagged
/// questions, and the `top_n` strongest associations.
pub struct ConsoleSummary<'a> {
    report: &'a AnalysisReport,
    top_n: usize,
}

impl<'a> ConsoleSummary<'a> {
    pub fn new(report: &'a AnalysisReport, top_n: usize) -> Self {
        Self { report, top_n }
    }
}

impl fmt::Display for ConsoleSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = &self.report.summary;

        writeln!(f, "Overall sentiment mean: {:.2}", summary.overall_mean)?;
        writeln!(
            f,
            "Flagging threshold (mean - {}): {:.2}",
            summary.sd_label(),
            summary.threshold
        )?;
        writeln!(f)?;

        if summary.flagged.is_empty() {
            writeln!(f, "No questions scored unusually low.")?;
        } else {
            writeln!(f, "{} questions scored unusually low:", summary.flagged.len())?;
            for score in &summary.flagged {
                writeln!(f, "  [{:.2}] {}", score.mean, score.question)?;
            }
        }

        let associations = &self.report.associations;
        if !associations.is_empty() {
            writeln!(f)?;
            writeln!(
                f,
                "Top {} Trait to Sentiment correlations (by effect size):",
                self.top_n
            )?;
            writeln!(
                f,
                "{:<16} {:<width$} {:>10} {:>11}  {}",
                "trait",
                "sentiment",
                "p_value",
                "effect_size",
                "method",
                width = SENTIMENT_WIDTH + 3
            )?;
            writeln!(f, "{}", "-".repeat(SENTIMENT_WIDTH + 60))?;
            for result in associations.iter().take(self.top_n) {
                writeln!(
                    f,
                    "{:<16} {:<width$} {:>10.4e} {:>11.4}  {}",
                    result.trait_name,
                    truncate_label(&result.sentiment, SENTIMENT_WIDTH),
                    result.p_value,
                    result.effect_size,
                    result.method,
                    width = SENTIMENT_WIDTH + 3
                )?;
            }
        }

        if let Some(chart) = &self.report.chart_path {
            writeln!(f)?;
            writeln!(f, "Chart: {}", chart)?;
        } else if let Some(err) = &self.report.chart_error {
            writeln!(f)?;
            writeln!(f, "Chart not written: {}", err)?;
        }

        writeln!(f)?;
        writeln!(f, "Completed.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AssociationMethod, ColumnSchema};
    use pretty_assertions::assert_eq;

    fn outcome() -> AnalysisOutcome {
        let means = vec![
            QuestionScore {
                question: "I enjoy lunch".to_string(),
                mean: 2.0,
            },
            QuestionScore {
                question: "I feel safe".to_string(),
                mean: 5.0,
            },
        ];
        AnalysisOutcome {
            shape: (40, 5),
            schema: ColumnSchema {
                sentiment: vec!["I enjoy lunch".to_string(), "I feel safe".to_string()],
                traits: vec!["What grade are you in?".to_string()],
                ignored: vec!["Comments".to_string()],
            },
            summary: SentimentSummary {
                question_means: means,
                overall_mean: 3.5,
                overall_std: 2.1213,
                std_multiplier: 1.0,
                threshold: 1.3787,
                flagged: Vec::new(),
            },
            associations: vec![AssociationResult {
                trait_name: "Grade".to_string(),
                sentiment: "I enjoy lunch".to_string(),
                p_value: 0.001,
                effect_size: 0.184,
                method: AssociationMethod::KruskalWallis,
                n: 40,
            }],
            chart: None,
            chart_error: None,
            duration_ms: 12,
        }
    }

    #[test]
    fn test_build_report() {
        let report = ReportGenerator::build_report("census.xlsx", &outcome());
        assert_eq!(report.input_file, "census.xlsx");
        assert_eq!(report.rows, 40);
        assert_eq!(report.columns, 5);
        assert_eq!(report.ignored_columns, vec!["Comments".to_string()]);
        assert_eq!(report.associations.len(), 1);
        assert!(report.chart_path.is_none());
        assert!(report.flagged().is_empty());
    }

    #[test]
    fn test_write_report_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let generator = ReportGenerator::new(dir.path().join("reports"));
        let report = ReportGenerator::build_report("census.xlsx", &outcome());

        let path = generator.write_report_to_file(&report, "census").unwrap();
        assert_eq!(path.file_name().unwrap(), "census_report.json");

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["rows"], 40);
        assert_eq!(json["associations"][0]["method"], "kruskal_wallis");
        assert!(json.get("chart_path").is_none());
    }

    #[test]
    fn test_report_stem() {
        assert_eq!(report_stem("data/2024_Census.xlsx"), "2024_Census");
        assert_eq!(report_stem(""), "output");
    }

    #[test]
    fn test_console_summary() {
        let mut outcome = outcome();
        outcome.summary.flagged = vec![outcome.summary.question_means[0].clone()];
        let report = ReportGenerator::build_report("census.xlsx", &outcome);

        let text = ConsoleSummary::new(&report, 20).to_string();
        assert!(text.starts_with("Overall sentiment mean: 3.50\n"));
        assert!(text.contains("Flagging threshold (mean - 1 SD): 1.38"));
        assert!(text.contains("1 questions scored unusually low:"));
        assert!(text.contains("  [2.00] I enjoy lunch"));
        assert!(text.contains("Top 20 Trait to Sentiment correlations (by effect size):"));
        assert!(text.contains("Kruskal-Wallis"));
        assert!(text.trim_end().ends_with("Completed."));
    }

    #[test]
    fn test_console_summary_without_results() {
        let mut outcome = outcome();
        outcome.associations.clear();
        let report = ReportGenerator::build_report("census.xlsx", &outcome);

        let text = ConsoleSummary::new(&report, 20).to_string();
        assert!(text.contains("No questions scored unusually low."));
        assert!(!text.contains("Top 20"));
        assert!(!text.contains("Trait to Sentiment"));
        assert!(text.ends_with("No questions scored unusually low.\n\nCompleted.\n"));
    }

    #[test]
    fn test_console_summary_threshold_label() {
        let mut outcome = outcome();
        outcome.summary.std_multiplier = 1.5;
        let report = ReportGenerator::build_report("census.xlsx", &outcome);

        let text = ConsoleSummary::new(&report, 20).to_string();
        assert!(text.contains("Flagging threshold (mean - 1.5 SD): 1.38"));
        assert!(!text.contains("1 SD"));
    }

    #[test]
    fn test_console_summary_reports_chart_error() {
        let mut outcome = outcome();
        outcome.chart_error = Some("IO error: Not a directory".to_string());
        let report = ReportGenerator::build_report("census.xlsx", &outcome);

        let text = ConsoleSummary::new(&report, 20).to_string();
        assert!(text.contains("Chart not written: IO error: Not a directory"));
        assert!(text.contains("Top 20 Trait to Sentiment"));
    }
}
