//! Spearman rank correlation.

use crate::error::{AnalysisError, Result};
use anofox_statistics::correlation::{CorrelationResult, spearman as spearman_test};

const TEST: &str = "Spearman";

/// Spearman's rho between paired samples, with a two-sided p-value from the
/// t approximation on `n - 2` degrees of freedom.
///
/// Fails when the samples differ in length, have fewer than three pairs, or
/// either side is constant (rho is undefined then).
pub fn spearman(x: &[f64], y: &[f64]) -> Result<CorrelationResult> {
    if is_constant(x) || is_constant(y) {
        return Err(AnalysisError::insufficient(TEST, "constant input"));
    }
    spearman_test(x, y, Some(0.95)).map_err(|e| AnalysisError::insufficient(TEST, e.to_string()))
}

fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|pair| pair[0] == pair[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rho_with_ties() {
        let result = spearman(&[1.0, 2.0, 3.0, 4.0, 5.0], &[5.0, 6.0, 7.0, 8.0, 7.0]).unwrap();
        assert!((result.estimate - 0.8207826816681233).abs() < 1e-12);
        assert!((result.p_value - 0.0885870053135438).abs() < 1e-9);
        assert_eq!(result.n, 5);
    }

    #[test]
    fn test_perfect_monotonic() {
        let result = spearman(&[1.0, 2.0, 3.0, 4.0], &[10.0, 20.0, 30.0, 400.0]).unwrap();
        assert_eq!(result.estimate, 1.0);
        assert_eq!(result.p_value, 0.0);

        let result = spearman(&[1.0, 2.0, 3.0, 4.0], &[4.0, 3.0, 2.0, 1.0]).unwrap();
        assert_eq!(result.estimate, -1.0);
    }

    #[test]
    fn test_constant_input_fails() {
        let err = spearman(&[1.0, 2.0, 3.0], &[2.0, 2.0, 2.0]).unwrap_err();
        assert!(err.is_insufficient_data());
    }

    #[test]
    fn test_length_mismatch_fails() {
        let err = spearman(&[1.0, 2.0, 3.0], &[1.0, 2.0]).unwrap_err();
        assert!(err.is_insufficient_data());
    }

    #[test]
    fn test_too_few_pairs_fails() {
        assert!(spearman(&[1.0, 2.0], &[2.0, 1.0]).is_err());
    }
}
