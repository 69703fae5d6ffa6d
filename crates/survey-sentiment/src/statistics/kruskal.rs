//! Kruskal-Wallis H test for independent groups.

use crate::error::{AnalysisError, Result};
use anofox_statistics::nonparametric::kruskal::{KruskalResult, kruskal_wallis as kruskal_test};

const TEST: &str = "Kruskal-Wallis";

/// Kruskal-Wallis H test with tie correction.
///
/// H is compared against a chi-squared distribution with `k - 1` degrees of
/// freedom. Fails with [`AnalysisError::InsufficientData`] when there are
/// fewer than two groups, a group is empty, or every value is identical
/// (H is undefined then).
pub fn kruskal_wallis(groups: &[Vec<f64>]) -> Result<KruskalResult> {
    let group_refs: Vec<&[f64]> = groups.iter().map(|g| g.as_slice()).collect();
    let result =
        kruskal_test(&group_refs).map_err(|e| AnalysisError::insufficient(TEST, e.to_string()))?;

    if !result.statistic.is_finite() {
        return Err(AnalysisError::insufficient(TEST, "all values are identical"));
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_interleaved_groups() {
        let result = kruskal_wallis(&[
            vec![1.0, 3.0, 5.0, 7.0, 9.0],
            vec![2.0, 4.0, 6.0, 8.0, 10.0],
        ])
        .unwrap();
        assert!(close(result.statistic, 0.2727272727272734));
        assert!(close(result.p_value, 0.6015081344405895));
        assert_eq!(result.df, 1.0);
    }

    #[test]
    fn test_ties_are_corrected() {
        let result = kruskal_wallis(&[
            vec![1.0, 1.0, 1.0],
            vec![2.0, 2.0, 2.0],
            vec![2.0, 2.0],
        ])
        .unwrap();
        assert!(close(result.statistic, 7.0));
        assert!(close(result.p_value, 0.0301973834223185));
        assert_eq!(result.df, 2.0);
    }

    #[test]
    fn test_separated_groups_are_significant() {
        let result = kruskal_wallis(&[
            vec![1.0, 1.0, 2.0, 1.0, 2.0, 1.0],
            vec![5.0, 6.0, 6.0, 5.0, 6.0, 5.0],
        ])
        .unwrap();
        assert!(result.p_value < 0.01);
    }

    #[test]
    fn test_single_group_fails() {
        let err = kruskal_wallis(&[vec![1.0, 2.0]]).unwrap_err();
        assert!(err.is_insufficient_data());
    }

    #[test]
    fn test_empty_group_fails() {
        let err = kruskal_wallis(&[vec![1.0, 2.0], vec![]]).unwrap_err();
        assert!(err.is_insufficient_data());
    }

    #[test]
    fn test_identical_values_fail() {
        let err = kruskal_wallis(&[vec![4.0; 5], vec![4.0; 6]]).unwrap_err();
        assert!(err.is_insufficient_data());
    }
}
