//! Configuration types for the survey analysis.
//!
//! Everything the analysis used to hard-code (question texts of the trait
//! columns, the Likert vocabulary, significance cut-offs, chart geometry)
//! lives in [`AnalysisConfig`], which is passed explicitly to every stage.
//! Build one with [`AnalysisConfig::builder()`] or load it from JSON.

use crate::error::{AnalysisError, Result, ResultExt};
use crate::likert::LikertScale;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Declared role of a survey column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Likert question, recoded to scores 1..6.
    Sentiment,
    /// Respondent attribute used for grouping; never recoded.
    Trait,
    /// Excluded from the analysis.
    Ignore,
}

/// Question texts of the respondent-trait columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraitColumns {
    pub grade: String,
    pub gender: String,
    /// Tenure, answered as `"<years> (joined in <year>)"`.
    pub years: String,
    pub cultures: String,
    pub clubs: String,
    /// Free-text involvement description; a "Yes" anywhere means participation.
    pub involvement: String,
}

impl Default for TraitColumns {
    fn default() -> Self {
        Self {
            grade: "What grade are you in?".to_string(),
            gender: "How would you describe your gender?".to_string(),
            years: "How many years have you attended HKIS?".to_string(),
            cultures: "Which of the following cultures do you identify with? [Choose all that apply]"
                .to_string(),
            clubs: "Which of the following are you involved in (in-school)? [Choose all that apply]"
                .to_string(),
            involvement: "Which of the following best describes your involvement at HKIS?"
                .to_string(),
        }
    }
}

impl TraitColumns {
    /// All trait question texts.
    pub fn all(&self) -> [&str; 6] {
        [
            self.grade.as_str(),
            self.gender.as_str(),
            self.years.as_str(),
            self.cultures.as_str(),
            self.clubs.as_str(),
            self.involvement.as_str(),
        ]
    }

    /// Whether `column` is one of the trait columns.
    pub fn contains(&self, column: &str) -> bool {
        self.all().contains(&column)
    }
}

/// Configuration for the survey analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Column dropped right after loading.
    /// Default: "Timestamp"
    pub timestamp_column: String,

    /// Trait question texts.
    pub trait_columns: TraitColumns,

    /// Answer-text to score mapping.
    pub likert_scale: LikertScale,

    /// Explicit per-column roles. Declared roles take precedence over
    /// vocabulary detection.
    /// Default: empty
    pub column_kinds: BTreeMap<String, ColumnKind>,

    /// When true, undeclared non-trait columns are ignored instead of being
    /// sniffed for Likert labels.
    /// Default: false
    pub strict_schema: bool,

    /// Significance level for both association tests.
    /// Default: 0.05
    pub alpha: f64,

    /// Groups with fewer observations are dropped before Kruskal-Wallis.
    /// Default: 5
    pub min_group_size: usize,

    /// Categorical pairs need an eta-squared strictly above this.
    /// Default: 0.02
    pub min_eta_squared: f64,

    /// Tenure pairs need at least this many complete observations.
    /// Default: 30
    pub min_paired_observations: usize,

    /// Tenure pairs need |rho| strictly above this.
    /// Default: 0.1
    pub min_abs_rho: f64,

    /// Number of associations printed in the summary table.
    /// Default: 20
    pub top_n: usize,

    /// Questions below `mean - flag_std_multiplier * std` are flagged.
    /// Default: 1.0
    pub flag_std_multiplier: f64,

    /// Number of lowest-scoring questions drawn on the chart.
    /// Default: 15
    pub chart_bottom_n: usize,

    /// Chart labels longer than this are cut and suffixed with "...".
    /// Default: 55
    pub label_max_chars: usize,

    /// Raster resolution of the chart.
    /// Default: 150
    pub chart_dpi: u32,

    /// Chart size in inches (width, height).
    /// Default: (14.0, 8.0)
    pub chart_size_inches: (f64, f64),

    /// Survey name used in the chart title.
    /// Default: "HKIS 2024 Census"
    pub survey_title: String,

    /// Label used for the tenure trait in association results.
    /// Default: "Years at HKIS"
    pub tenure_label: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            timestamp_column: "Timestamp".to_string(),
            trait_columns: TraitColumns::default(),
            likert_scale: LikertScale::default(),
            column_kinds: BTreeMap::new(),
            strict_schema: false,
            alpha: 0.05,
            min_group_size: 5,
            min_eta_squared: 0.02,
            min_paired_observations: 30,
            min_abs_rho: 0.1,
            top_n: 20,
            flag_std_multiplier: 1.0,
            chart_bottom_n: 15,
            label_max_chars: 55,
            chart_dpi: 150,
            chart_size_inches: (14.0, 8.0),
            survey_title: "HKIS 2024 Census".to_string(),
            tenure_label: "Years at HKIS".to_string(),
        }
    }
}

impl AnalysisConfig {
    /// Create a new configuration builder.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .context(format!("Reading config {}", path.display()))?;
        let config: AnalysisConfig = serde_json::from_str(&text)?;
        config
            .validate()
            .map_err(|e| AnalysisError::InvalidConfig(e.to_string()))?;
        Ok(config)
    }

    /// Declared role of a column, if any.
    pub fn declared_kind(&self, column: &str) -> Option<ColumnKind> {
        self.column_kinds.get(column).copied()
    }

    /// Chart size in pixels at the configured DPI.
    pub fn chart_pixels(&self) -> (u32, u32) {
        let dpi = f64::from(self.chart_dpi);
        (
            (self.chart_size_inches.0 * dpi).round() as u32,
            (self.chart_size_inches.1 * dpi).round() as u32,
        )
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> std::result::Result<(), ConfigValidationError> {
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(ConfigValidationError::InvalidProbability {
                field: "alpha".to_string(),
                value: self.alpha,
            });
        }

        for (field, value) in [
            ("min_eta_squared", self.min_eta_squared),
            ("min_abs_rho", self.min_abs_rho),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigValidationError::InvalidProbability {
                    field: field.to_string(),
                    value,
                });
            }
        }

        if self.min_group_size == 0 {
            return Err(ConfigValidationError::InvalidCount {
                field: "min_group_size".to_string(),
                value: self.min_group_size,
                minimum: 1,
            });
        }

        // Spearman's t approximation needs n - 2 > 0 degrees of freedom.
        if self.min_paired_observations < 3 {
            return Err(ConfigValidationError::InvalidCount {
                field: "min_paired_observations".to_string(),
                value: self.min_paired_observations,
                minimum: 3,
            });
        }

        if !self.flag_std_multiplier.is_finite() || self.flag_std_multiplier < 0.0 {
            return Err(ConfigValidationError::InvalidMultiplier(
                self.flag_std_multiplier,
            ));
        }

        let (width, height) = self.chart_size_inches;
        if self.chart_dpi == 0 || !(width > 0.0 && height > 0.0) {
            return Err(ConfigValidationError::InvalidChartGeometry {
                dpi: self.chart_dpi,
                width,
                height,
            });
        }

        if self.likert_scale.is_empty() {
            return Err(ConfigValidationError::EmptyLikertScale);
        }

        if let Some(label) = self.likert_scale.out_of_range_labels().first() {
            return Err(ConfigValidationError::ScoreOutOfRange((*label).to_string()));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid value for '{field}': {value} (must be between 0.0 and 1.0)")]
    InvalidProbability { field: String, value: f64 },

    #[error("Invalid value for '{field}': {value} (must be at least {minimum})")]
    InvalidCount {
        field: String,
        value: usize,
        minimum: usize,
    },

    #[error("Invalid flag multiplier: {0} (must be finite and non-negative)")]
    InvalidMultiplier(f64),

    #[error("Invalid chart geometry: {width}x{height} in at {dpi} dpi")]
    InvalidChartGeometry { dpi: u32, width: f64, height: f64 },

    #[error("Likert scale has no labels")]
    EmptyLikertScale,

    #[error("Likert label '{0}' has a score outside 1..=6")]
    ScoreOutOfRange(String),
}

/// Builder for [`AnalysisConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct AnalysisConfigBuilder {
    timestamp_column: Option<String>,
    trait_columns: Option<TraitColumns>,
    likert_scale: Option<LikertScale>,
    column_kinds: BTreeMap<String, ColumnKind>,
    strict_schema: Option<bool>,
    alpha: Option<f64>,
    min_group_size: Option<usize>,
    min_eta_squared: Option<f64>,
    min_paired_observations: Option<usize>,
    min_abs_rho: Option<f64>,
    top_n: Option<usize>,
    flag_std_multiplier: Option<f64>,
    chart_bottom_n: Option<usize>,
    label_max_chars: Option<usize>,
    chart_dpi: Option<u32>,
    chart_size_inches: Option<(f64, f64)>,
    survey_title: Option<String>,
    tenure_label: Option<String>,
}

impl AnalysisConfigBuilder {
    /// Set the column dropped after loading.
    pub fn timestamp_column(mut self, column: impl Into<String>) -> Self {
        self.timestamp_column = Some(column.into());
        self
    }

    /// Set the trait question texts.
    pub fn trait_columns(mut self, traits: TraitColumns) -> Self {
        self.trait_columns = Some(traits);
        self
    }

    /// Replace the Likert vocabulary.
    pub fn likert_scale(mut self, scale: LikertScale) -> Self {
        self.likert_scale = Some(scale);
        self
    }

    /// Declare the role of a single column.
    pub fn column_kind(mut self, column: impl Into<String>, kind: ColumnKind) -> Self {
        self.column_kinds.insert(column.into(), kind);
        self
    }

    /// Only analyse columns whose role is declared (or that are traits).
    pub fn strict_schema(mut self, strict: bool) -> Self {
        self.strict_schema = Some(strict);
        self
    }

    /// Set the significance level.
    pub fn alpha(mut self, alpha: f64) -> Self {
        self.alpha = Some(alpha);
        self
    }

    /// Set the minimum group size for Kruskal-Wallis.
    pub fn min_group_size(mut self, size: usize) -> Self {
        self.min_group_size = Some(size);
        self
    }

    /// Set the minimum eta-squared for categorical pairs.
    pub fn min_eta_squared(mut self, eta: f64) -> Self {
        self.min_eta_squared = Some(eta);
        self
    }

    /// Set the minimum paired observations for the tenure correlation.
    pub fn min_paired_observations(mut self, n: usize) -> Self {
        self.min_paired_observations = Some(n);
        self
    }

    /// Set the minimum |rho| for tenure pairs.
    pub fn min_abs_rho(mut self, rho: f64) -> Self {
        self.min_abs_rho = Some(rho);
        self
    }

    /// Set how many associations are printed.
    pub fn top_n(mut self, n: usize) -> Self {
        self.top_n = Some(n);
        self
    }

    /// Set the standard-deviation multiplier for the low-score threshold.
    pub fn flag_std_multiplier(mut self, multiplier: f64) -> Self {
        self.flag_std_multiplier = Some(multiplier);
        self
    }

    /// Set how many questions the chart shows.
    pub fn chart_bottom_n(mut self, n: usize) -> Self {
        self.chart_bottom_n = Some(n);
        self
    }

    /// Set the chart label truncation width.
    pub fn label_max_chars(mut self, n: usize) -> Self {
        self.label_max_chars = Some(n);
        self
    }

    /// Set the chart resolution.
    pub fn chart_dpi(mut self, dpi: u32) -> Self {
        self.chart_dpi = Some(dpi);
        self
    }

    /// Set the chart size in inches.
    pub fn chart_size_inches(mut self, width: f64, height: f64) -> Self {
        self.chart_size_inches = Some((width, height));
        self
    }

    /// Set the survey name shown in the chart title.
    pub fn survey_title(mut self, title: impl Into<String>) -> Self {
        self.survey_title = Some(title.into());
        self
    }

    /// Set the label of the tenure trait.
    pub fn tenure_label(mut self, label: impl Into<String>) -> Self {
        self.tenure_label = Some(label.into());
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `AnalysisConfig` or an error if validation fails.
    pub fn build(self) -> std::result::Result<AnalysisConfig, ConfigValidationError> {
        let defaults = AnalysisConfig::default();
        let config = AnalysisConfig {
            timestamp_column: self.timestamp_column.unwrap_or(defaults.timestamp_column),
            trait_columns: self.trait_columns.unwrap_or(defaults.trait_columns),
            likert_scale: self.likert_scale.unwrap_or(defaults.likert_scale),
            column_kinds: self.column_kinds,
            strict_schema: self.strict_schema.unwrap_or(defaults.strict_schema),
            alpha: self.alpha.unwrap_or(defaults.alpha),
            min_group_size: self.min_group_size.unwrap_or(defaults.min_group_size),
            min_eta_squared: self.min_eta_squared.unwrap_or(defaults.min_eta_squared),
            min_paired_observations: self
                .min_paired_observations
                .unwrap_or(defaults.min_paired_observations),
            min_abs_rho: self.min_abs_rho.unwrap_or(defaults.min_abs_rho),
            top_n: self.top_n.unwrap_or(defaults.top_n),
            flag_std_multiplier: self
                .flag_std_multiplier
                .unwrap_or(defaults.flag_std_multiplier),
            chart_bottom_n: self.chart_bottom_n.unwrap_or(defaults.chart_bottom_n),
            label_max_chars: self.label_max_chars.unwrap_or(defaults.label_max_chars),
            chart_dpi: self.chart_dpi.unwrap_or(defaults.chart_dpi),
            chart_size_inches: self.chart_size_inches.unwrap_or(defaults.chart_size_inches),
            survey_title: self.survey_title.unwrap_or(defaults.survey_title),
            tenure_label: self.tenure_label.unwrap_or(defaults.tenure_label),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AnalysisConfig::default();
        assert_eq!(config.timestamp_column, "Timestamp");
        assert_eq!(config.alpha, 0.05);
        assert_eq!(config.min_group_size, 5);
        assert_eq!(config.min_eta_squared, 0.02);
        assert_eq!(config.min_paired_observations, 30);
        assert_eq!(config.min_abs_rho, 0.1);
        assert_eq!(config.top_n, 20);
        assert_eq!(config.chart_bottom_n, 15);
        assert_eq!(config.label_max_chars, 55);
        assert_eq!(config.chart_dpi, 150);
        assert!(!config.strict_schema);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_chart_pixels() {
        let config = AnalysisConfig::default();
        assert_eq!(config.chart_pixels(), (2100, 1200));
    }

    #[test]
    fn test_trait_columns_contains() {
        let traits = TraitColumns::default();
        assert!(traits.contains("What grade are you in?"));
        assert!(traits.contains("How many years have you attended HKIS?"));
        assert!(!traits.contains("I feel safe at school"));
    }

    #[test]
    fn test_builder_custom_values() {
        let config = AnalysisConfig::builder()
            .alpha(0.01)
            .min_group_size(3)
            .top_n(5)
            .column_kind("Comments", ColumnKind::Ignore)
            .strict_schema(true)
            .build()
            .unwrap();

        assert_eq!(config.alpha, 0.01);
        assert_eq!(config.min_group_size, 3);
        assert_eq!(config.top_n, 5);
        assert!(config.strict_schema);
        assert_eq!(config.declared_kind("Comments"), Some(ColumnKind::Ignore));
        assert_eq!(config.declared_kind("Other"), None);
    }

    #[test]
    fn test_validation_invalid_alpha() {
        let result = AnalysisConfig::builder().alpha(1.5).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidProbability { .. }
        ));
    }

    #[test]
    fn test_validation_invalid_group_size() {
        let result = AnalysisConfig::builder().min_group_size(0).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidCount { minimum: 1, .. }
        ));
    }

    #[test]
    fn test_validation_paired_observations() {
        let result = AnalysisConfig::builder().min_paired_observations(2).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidCount { minimum: 3, .. }
        ));
    }

    #[test]
    fn test_validation_bad_scale() {
        let result = AnalysisConfig::builder()
            .likert_scale(LikertScale::new([("Agree", 7)]))
            .build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::ScoreOutOfRange(label) if label == "Agree"
        ));

        let result = AnalysisConfig::builder()
            .likert_scale(LikertScale::new(Vec::<(String, u8)>::new()))
            .build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::EmptyLikertScale
        ));
    }

    #[test]
    fn test_config_from_partial_json() {
        let json = r#"{
            "alpha": 0.01,
            "trait_columns": { "grade": "Year group" },
            "column_kinds": { "Any comments?": "ignore", "Rate the canteen": "sentiment" },
            "survey_title": "Pilot"
        }"#;

        let config: AnalysisConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.alpha, 0.01);
        assert_eq!(config.trait_columns.grade, "Year group");
        assert_eq!(
            config.trait_columns.gender,
            TraitColumns::default().gender
        );
        assert_eq!(config.declared_kind("Any comments?"), Some(ColumnKind::Ignore));
        assert_eq!(
            config.declared_kind("Rate the canteen"),
            Some(ColumnKind::Sentiment)
        );
        assert_eq!(config.survey_title, "Pilot");
        assert_eq!(config.likert_scale, LikertScale::default());
    }

    #[test]
    fn test_from_json_file_validates() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "alpha": 2.0 }}"#).unwrap();

        let err = AnalysisConfig::from_json_file(file.path()).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_from_json_file_missing() {
        let err = AnalysisConfig::from_json_file("/definitely/not/here.json").unwrap_err();
        assert_eq!(err.error_code(), "IO_ERROR");
    }
}
