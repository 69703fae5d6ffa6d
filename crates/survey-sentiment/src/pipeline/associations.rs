//! Trait-to-sentiment association testing.
//!
//! Categorical traits (grade, gender, the derived participation flag) are
//! tested against every sentiment column with Kruskal-Wallis; tenure is
//! tested with Spearman's rho. Only pairs that are both significant and
//! practically relevant are kept, strongest effect first.

use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::recoder::{INVOLVEMENT_COLUMN, YEARS_COLUMN};
use crate::statistics::{kruskal_wallis, spearman};
use crate::types::{AssociationMethod, AssociationResult};
use crate::utils::{distinct_in_order, float_values, has_column, string_values};
use polars::prelude::*;
use std::cmp::Ordering;
use tracing::{debug, info, warn};

/// A categorical trait: display label and the column holding it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoricalTrait {
    pub label: String,
    pub column: String,
}

/// Grade, gender and involvement, as far as their columns exist.
pub fn categorical_traits(encoded: &DataFrame, config: &AnalysisConfig) -> Vec<CategoricalTrait> {
    [
        ("Grade", config.trait_columns.grade.as_str()),
        ("Gender", config.trait_columns.gender.as_str()),
        ("Involvement", INVOLVEMENT_COLUMN),
    ]
    .into_iter()
    .filter_map(|(label, column)| {
        if has_column(encoded, column) {
            Some(CategoricalTrait {
                label: label.to_string(),
                column: column.to_string(),
            })
        } else {
            warn!("{} column '{}' not found; skipping", label, column);
            None
        }
    })
    .collect()
}

/// Simplified eta-squared from the H statistic: `max(0, (H - k + 1) / (N - k))`.
///
/// Zero when `N <= k`, where the estimator is undefined.
pub fn eta_squared(h: f64, groups: usize, observations: usize) -> f64 {
    if observations <= groups {
        return 0.0;
    }
    let k = groups as f64;
    ((h - k + 1.0) / (observations as f64 - k)).max(0.0)
}

/// Split scores by trait value.
///
/// Groups follow the first appearance of each non-missing trait value; rows
/// with a missing score are left out, and groups with fewer than
/// `min_group_size` scores are dropped.
pub fn group_scores(
    traits: &[Option<String>],
    scores: &[Option<f64>],
    min_group_size: usize,
) -> Vec<Vec<f64>> {
    distinct_in_order(traits)
        .into_iter()
        .map(|group| {
            traits
                .iter()
                .zip(scores)
                .filter(|(value, _)| value.as_deref() == Some(group))
                .filter_map(|(_, score)| *score)
                .collect::<Vec<f64>>()
        })
        .filter(|group| group.len() >= min_group_size)
        .collect()
}

fn log_skipped(trait_label: &str, sentiment: &str, err: &AnalysisError) {
    if err.is_insufficient_data() {
        debug!("{} x '{}': {}; skipped", trait_label, sentiment, err);
    } else {
        warn!("{} x '{}' could not be tested: {}", trait_label, sentiment, err);
    }
}

/// Test one categorical trait against one sentiment column.
///
/// Returns `None` when the pair is skipped or filtered out.
pub fn test_categorical(
    trait_values: &[Option<String>],
    scores: &[Option<f64>],
    trait_label: &str,
    sentiment: &str,
    config: &AnalysisConfig,
) -> Option<AssociationResult> {
    let groups = group_scores(trait_values, scores, config.min_group_size);
    if groups.len() < 2 {
        debug!(
            "{} x '{}': {} group(s) with >= {} answers; skipped",
            trait_label,
            sentiment,
            groups.len(),
            config.min_group_size
        );
        return None;
    }

    let outcome = match kruskal_wallis(&groups) {
        Ok(outcome) => outcome,
        Err(e) => {
            log_skipped(trait_label, sentiment, &e);
            return None;
        }
    };
    if !(outcome.p_value < config.alpha) {
        return None;
    }

    let n: usize = groups.iter().map(Vec::len).sum();
    let effect_size = eta_squared(outcome.statistic, groups.len(), n);
    if effect_size <= config.min_eta_squared {
        debug!(
            "{} x '{}': significant but eta^2 {:.4} too small",
            trait_label, sentiment, effect_size
        );
        return None;
    }

    Some(AssociationResult {
        trait_name: trait_label.to_string(),
        sentiment: sentiment.to_string(),
        p_value: outcome.p_value,
        effect_size,
        method: AssociationMethod::KruskalWallis,
        n,
    })
}

/// Test tenure against one sentiment column.
///
/// Returns `None` when the pair is skipped or filtered out.
pub fn test_tenure(
    years: &[Option<f64>],
    scores: &[Option<f64>],
    sentiment: &str,
    config: &AnalysisConfig,
) -> Option<AssociationResult> {
    let (x, y): (Vec<f64>, Vec<f64>) = years
        .iter()
        .zip(scores)
        .filter_map(|(year, score)| Some(((*year)?, (*score)?)))
        .unzip();

    if x.len() < config.min_paired_observations {
        debug!(
            "{} x '{}': {} paired answers (< {}); skipped",
            config.tenure_label,
            sentiment,
            x.len(),
            config.min_paired_observations
        );
        return None;
    }

    let outcome = match spearman(&x, &y) {
        Ok(outcome) => outcome,
        Err(e) => {
            log_skipped(&config.tenure_label, sentiment, &e);
            return None;
        }
    };
    if !(outcome.p_value < config.alpha) || outcome.estimate.abs() <= config.min_abs_rho {
        return None;
    }

    Some(AssociationResult {
        trait_name: config.tenure_label.clone(),
        sentiment: sentiment.to_string(),
        p_value: outcome.p_value,
        effect_size: outcome.estimate * outcome.estimate,
        method: AssociationMethod::Spearman,
        n: outcome.n,
    })
}

/// Sort strongest effect first. Equal effects keep their order.
pub fn rank_associations(results: &mut [AssociationResult]) {
    results.sort_by(|a, b| {
        b.effect_size
            .partial_cmp(&a.effect_size)
            .unwrap_or(Ordering::Equal)
    });
}

/// Run both analyses over every sentiment column and rank the kept pairs.
pub fn find_associations(
    encoded: &DataFrame,
    sentiment: &[String],
    config: &AnalysisConfig,
) -> Result<Vec<AssociationResult>> {
    let mut results = Vec::new();

    let score_columns: Vec<(&String, Vec<Option<f64>>)> = sentiment
        .iter()
        .map(|question| -> Result<_> { Ok((question, float_values(encoded, question)?)) })
        .collect::<Result<_>>()?;

    for categorical in categorical_traits(encoded, config) {
        let trait_values = string_values(encoded, &categorical.column)?;
        for (question, scores) in &score_columns {
            if let Some(result) =
                test_categorical(&trait_values, scores, &categorical.label, question, config)
            {
                results.push(result);
            }
        }
    }

    if has_column(encoded, YEARS_COLUMN) {
        let years = float_values(encoded, YEARS_COLUMN)?;
        for (question, scores) in &score_columns {
            if let Some(result) = test_tenure(&years, scores, question, config) {
                results.push(result);
            }
        }
    }

    rank_associations(&mut results);
    info!("{} trait/sentiment associations kept", results.len());
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<Option<String>> {
        values.iter().map(|v| Some(v.to_string())).collect()
    }

    fn scores(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    // ==================== eta-squared ====================

    #[test]
    fn test_eta_squared_reference_case() {
        // k = 2, N = 40, H = 8: (8 - 2 + 1) / (40 - 2)
        let eta = eta_squared(8.0, 2, 40);
        assert!((eta - 7.0 / 38.0).abs() < 1e-12);
        assert!((eta - 0.184).abs() < 1e-3);
    }

    #[test]
    fn test_eta_squared_clamps_at_zero() {
        assert_eq!(eta_squared(0.1, 3, 30), 0.0);
    }

    #[test]
    fn test_eta_squared_undefined_is_zero() {
        assert_eq!(eta_squared(5.0, 4, 4), 0.0);
    }

    // ==================== grouping ====================

    #[test]
    fn test_group_scores_drops_small_groups_and_missing() {
        let traits = vec![
            Some("9".to_string()),
            Some("10".to_string()),
            None,
            Some("9".to_string()),
            Some("10".to_string()),
            Some("9".to_string()),
        ];
        let values = vec![Some(1.0), Some(2.0), Some(3.0), None, Some(4.0), Some(5.0)];

        let groups = group_scores(&traits, &values, 2);
        assert_eq!(groups, vec![vec![1.0, 5.0], vec![2.0, 4.0]]);

        let groups = group_scores(&traits, &values, 3);
        assert!(groups.is_empty());
    }

    // ==================== categorical ====================

    #[test]
    fn test_categorical_strong_difference_is_kept() {
        let config = AnalysisConfig::default();
        let traits = strings(&["A"; 8].iter().chain(&["B"; 8]).copied().collect::<Vec<_>>());
        let values = scores(&[
            1.0, 2.0, 1.0, 2.0, 1.0, 2.0, 1.0, 2.0, 5.0, 6.0, 5.0, 6.0, 5.0, 6.0, 5.0, 6.0,
        ]);

        let result = test_categorical(&traits, &values, "Grade", "Q", &config).unwrap();
        assert_eq!(result.method, AssociationMethod::KruskalWallis);
        assert_eq!(result.n, 16);
        assert!(result.p_value < config.alpha);
        assert!(result.effect_size > config.min_eta_squared);
    }

    #[test]
    fn test_categorical_single_group_is_skipped() {
        let config = AnalysisConfig::default();
        let traits = strings(&["A"; 10]);
        let values = scores(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 1.0, 2.0, 3.0, 4.0]);
        assert!(test_categorical(&traits, &values, "Gender", "Q", &config).is_none());
    }

    #[test]
    fn test_categorical_no_difference_is_dropped() {
        let config = AnalysisConfig::default();
        let traits = strings(&["A"; 6].iter().chain(&["B"; 6]).copied().collect::<Vec<_>>());
        let values = scores(&[1.0, 3.0, 5.0, 2.0, 4.0, 6.0, 1.0, 3.0, 5.0, 2.0, 4.0, 6.0]);
        assert!(test_categorical(&traits, &values, "Gender", "Q", &config).is_none());
    }

    // ==================== tenure ====================

    #[test]
    fn test_tenure_requires_enough_pairs() {
        let config = AnalysisConfig::default();
        let years: Vec<Option<f64>> = (0..29).map(|i| Some(i as f64)).collect();
        let values: Vec<Option<f64>> = (0..29).map(|i| Some((i % 6 + 1) as f64)).collect();
        assert!(test_tenure(&years, &values, "Q", &config).is_none());
    }

    #[test]
    fn test_tenure_monotonic_is_kept() {
        let config = AnalysisConfig::default();
        let years: Vec<Option<f64>> = (0..40).map(|i| Some((i / 4) as f64)).collect();
        let values: Vec<Option<f64>> = (0..40).map(|i| Some((i / 7 + 1) as f64)).collect();

        let result = test_tenure(&years, &values, "Q", &config).unwrap();
        assert_eq!(result.trait_name, "Years at HKIS");
        assert_eq!(result.method, AssociationMethod::Spearman);
        assert_eq!(result.n, 40);
        assert!(result.p_value < 0.05);
        assert!(result.effect_size > 0.01);
        assert!(result.effect_size <= 1.0);
    }

    #[test]
    fn test_tenure_skips_incomplete_rows() {
        let config = AnalysisConfig::builder()
            .min_paired_observations(5)
            .build()
            .unwrap();
        let years = vec![Some(1.0), None, Some(2.0), Some(3.0), Some(4.0), Some(5.0)];
        let values = vec![Some(1.0), Some(6.0), None, Some(3.0), Some(4.0), Some(5.0)];
        // only four complete pairs
        assert!(test_tenure(&years, &values, "Q", &config).is_none());
    }

    // ==================== ranking ====================

    #[test]
    fn test_rank_associations_descending() {
        let make = |name: &str, effect: f64| AssociationResult {
            trait_name: name.to_string(),
            sentiment: "Q".to_string(),
            p_value: 0.01,
            effect_size: effect,
            method: AssociationMethod::KruskalWallis,
            n: 10,
        };
        let mut results = vec![make("a", 0.05), make("b", 0.3), make("c", 0.1)];
        rank_associations(&mut results);
        let names: Vec<&str> = results.iter().map(|r| r.trait_name.as_str()).collect();
        assert_eq!(names, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_find_associations_on_empty_table() {
        let df = DataFrame::empty();
        let results = find_associations(&df, &[], &AnalysisConfig::default()).unwrap();
        assert!(results.is_empty());
    }
}
