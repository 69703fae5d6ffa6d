//! Analysis pipeline.
//!
//! [`SurveyAnalysis`] runs the stages in order: classify and recode the
//! responses, flag low-sentiment questions, test trait associations, and
//! render the chart.

pub mod associations;
mod builder;
pub mod outliers;

pub use associations::{find_associations, CategoricalTrait};
pub use builder::{SurveyAnalysis, SurveyAnalysisBuilder};
pub use outliers::flag_low_sentiment;
