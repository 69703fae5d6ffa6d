//! Statistical routines used by the analysis.
//!
//! This module provides:
//! - Descriptive statistics that skip NaN (mean, sample standard deviation)
//! - Kruskal-Wallis H test across independent groups
//! - Spearman rank correlation with a two-sided p-value
//!
//! The rank tests come from `anofox_statistics`; failures are reported as
//! [`AnalysisError::InsufficientData`](crate::error::AnalysisError::InsufficientData).

mod descriptive;
mod kruskal;
mod spearman;

pub use descriptive::{mean, sample_std};
pub use kruskal::kruskal_wallis;
pub use spearman::spearman;
