//! The `SurveyAnalysis` orchestrator and its builder.

use crate::chart::render_low_sentiment_chart;
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::loader::load_responses;
use crate::pipeline::{find_associations, flag_low_sentiment};
use crate::recoder::{classify_columns, derive_fields, encode};
use crate::types::{AnalysisOutcome, ChartOutput};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info, warn};

/// Default output path of the low-sentiment chart.
pub const DEFAULT_CHART_PATH: &str = "chart_low_sentiments.png";

/// Runs the full analysis over one response table.
///
/// # Example
///
/// ```rust,ignore
/// use survey_sentiment::{AnalysisConfig, SurveyAnalysis};
///
/// let outcome = SurveyAnalysis::builder()
///     .config(AnalysisConfig::builder().top_n(10).build()?)
///     .chart_path("out/chart.png")
///     .build()?
///     .run_file("2024_Biennial_Census_Results.xlsx")?;
///
/// for question in &outcome.summary.flagged {
///     println!("[{:.2}] {}", question.mean, question.question);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct SurveyAnalysis {
    config: AnalysisConfig,
    chart_path: PathBuf,
    render_chart: bool,
}

static_assertions::assert_impl_all!(SurveyAnalysis: Send, Sync);

impl SurveyAnalysis {
    pub fn builder() -> SurveyAnalysisBuilder {
        SurveyAnalysisBuilder::default()
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Load `path` and analyse it.
    pub fn run_file(&self, path: impl AsRef<Path>) -> Result<AnalysisOutcome> {
        let raw = load_responses(path.as_ref(), &self.config)?;
        self.run(raw)
    }

    /// Analyse an already loaded table of string columns.
    pub fn run(&self, raw: DataFrame) -> Result<AnalysisOutcome> {
        self.run_internal(raw).inspect_err(|e| error!("Analysis failed: {}", e))
    }

    fn run_internal(&self, raw: DataFrame) -> Result<AnalysisOutcome> {
        let start_time = Instant::now();
        let shape = raw.shape();
        info!("Starting analysis of {} responses x {} columns", shape.0, shape.1);

        info!("Step 1: Classifying and recoding columns...");
        let schema = classify_columns(&raw, &self.config)?;
        let mut encoded = encode(&raw, &schema, &self.config.likert_scale)?;
        derive_fields(&raw, &mut encoded, &self.config)?;

        info!("Step 2: Flagging low-sentiment questions...");
        let summary = flag_low_sentiment(&encoded, &schema.sentiment, &self.config)?;

        info!("Step 3: Testing trait associations...");
        let associations = find_associations(&encoded, &schema.sentiment, &self.config)?;

        let mut chart = None;
        let mut chart_error = None;
        if self.render_chart {
            info!("Step 4: Rendering chart...");
            match render_low_sentiment_chart(&self.chart_path, &summary, &self.config) {
                Ok(0) => {}
                Ok(bars) => {
                    chart = Some(ChartOutput {
                        path: self.chart_path.clone(),
                        bars,
                    })
                }
                // the computed results are still reported
                Err(e) => {
                    warn!("Chart not written to {}: {}", self.chart_path.display(), e);
                    chart_error = Some(e.to_string());
                }
            }
        } else {
            info!("Step 4: Skipping chart (disabled)");
        }

        let duration_ms = start_time.elapsed().as_millis() as u64;
        info!("Analysis completed in {} ms", duration_ms);

        Ok(AnalysisOutcome {
            shape,
            schema,
            summary,
            associations,
            chart,
            chart_error,
            duration_ms,
        })
    }
}

/// Builder for [`SurveyAnalysis`].
#[derive(Debug, Default)]
pub struct SurveyAnalysisBuilder {
    config: Option<AnalysisConfig>,
    chart_path: Option<PathBuf>,
    render_chart: Option<bool>,
}

impl SurveyAnalysisBuilder {
    /// Set the analysis configuration. Defaults to [`AnalysisConfig::default`].
    pub fn config(mut self, config: AnalysisConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Where the chart is written. Defaults to `chart_low_sentiments.png`.
    pub fn chart_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.chart_path = Some(path.into());
        self
    }

    /// Whether to render the chart at all. Defaults to `true`.
    pub fn render_chart(mut self, render: bool) -> Self {
        self.render_chart = Some(render);
        self
    }

    /// Validate the configuration and build the analysis.
    pub fn build(self) -> Result<SurveyAnalysis> {
        let config = self.config.unwrap_or_default();
        config
            .validate()
            .map_err(|e| AnalysisError::InvalidConfig(e.to_string()))?;

        Ok(SurveyAnalysis {
            config,
            chart_path: self
                .chart_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CHART_PATH)),
            render_chart: self.render_chart.unwrap_or(true),
        })
    }
}
