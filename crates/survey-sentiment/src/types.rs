use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Column roles after classification, each list in table order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub sentiment: Vec<String>,
    pub traits: Vec<String>,
    pub ignored: Vec<String>,
}

/// Mean Likert score of one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionScore {
    pub question: String,
    pub mean: f64,
}

/// Output of the low-sentiment flagger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentSummary {
    /// Per-question means, ascending.
    pub question_means: Vec<QuestionScore>,
    /// Mean of the per-question means.
    pub overall_mean: f64,
    /// Sample standard deviation of the per-question means.
    pub overall_std: f64,
    /// Standard deviations below the overall mean where flagging starts.
    #[serde(default = "default_std_multiplier")]
    pub std_multiplier: f64,
    pub threshold: f64,
    /// Questions strictly below the threshold, ascending.
    pub flagged: Vec<QuestionScore>,
}

fn default_std_multiplier() -> f64 {
    1.0
}

impl SentimentSummary {
    /// Width of the flagging band, e.g. "1 SD" or "1.5 SD".
    pub fn sd_label(&self) -> String {
        format!("{} SD", self.std_multiplier)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssociationMethod {
    KruskalWallis,
    Spearman,
}

impl fmt::Display for AssociationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssociationMethod::KruskalWallis => write!(f, "Kruskal-Wallis"),
            AssociationMethod::Spearman => write!(f, "Spearman"),
        }
    }
}

/// A trait/question pair that passed both the significance and effect-size
/// filters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociationResult {
    pub trait_name: String,
    pub sentiment: String,
    pub p_value: f64,
    /// eta-squared for categorical traits, rho squared for tenure.
    pub effect_size: f64,
    pub method: AssociationMethod,
    /// Observations that entered the test.
    pub n: usize,
}

/// Where the chart went and how many bars it has.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartOutput {
    pub path: PathBuf,
    pub bars: usize,
}

/// Everything one analysis run produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    /// Shape of the loaded table (rows, columns), timestamp already dropped.
    pub shape: (usize, usize),
    pub schema: ColumnSchema,
    pub summary: SentimentSummary,
    /// All kept associations, strongest effect first.
    pub associations: Vec<AssociationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<ChartOutput>,
    /// Why the chart could not be written, if rendering failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_error: Option<String>,
    pub duration_ms: u64,
}
