//! Low-sentiment flagging.
//!
//! Questions whose mean score sits more than `flag_std_multiplier` standard
//! deviations below the mean of all question means are flagged.

use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::statistics::{mean, sample_std};
use crate::types::{QuestionScore, SentimentSummary};
use crate::utils::float_values;
use polars::prelude::*;
use std::cmp::Ordering;
use tracing::{debug, info};

/// Mean score of every sentiment column, ascending.
///
/// Columns without a single recognised answer have no mean and are left out.
pub fn question_means(encoded: &DataFrame, sentiment: &[String]) -> Result<Vec<QuestionScore>> {
    let mut scores = Vec::with_capacity(sentiment.len());
    for question in sentiment {
        let values: Vec<f64> = float_values(encoded, question)?
            .into_iter()
            .flatten()
            .collect();
        let question_mean = mean(&values);
        if question_mean.is_nan() {
            debug!("'{}' has no scored answers; left out of the means", question);
            continue;
        }
        scores.push(QuestionScore {
            question: question.clone(),
            mean: question_mean,
        });
    }

    scores.sort_by(|a, b| a.mean.partial_cmp(&b.mean).unwrap_or(Ordering::Equal));
    Ok(scores)
}

/// Summarise ascending question means and flag the low ones.
///
/// With fewer than two questions the standard deviation, and so the
/// threshold, is NaN and nothing is flagged.
pub fn summarize(question_means: Vec<QuestionScore>, std_multiplier: f64) -> SentimentSummary {
    let means: Vec<f64> = question_means.iter().map(|score| score.mean).collect();
    let overall_mean = mean(&means);
    let overall_std = sample_std(&means);
    let threshold = overall_mean - std_multiplier * overall_std;

    // NaN threshold compares false, so the degenerate case flags nothing.
    let flagged = question_means
        .iter()
        .filter(|score| score.mean < threshold)
        .cloned()
        .collect();

    SentimentSummary {
        question_means,
        overall_mean,
        overall_std,
        std_multiplier,
        threshold,
        flagged,
    }
}

/// Compute question means and flag questions below the threshold.
pub fn flag_low_sentiment(
    encoded: &DataFrame,
    sentiment: &[String],
    config: &AnalysisConfig,
) -> Result<SentimentSummary> {
    let scores = question_means(encoded, sentiment)?;
    let summary = summarize(scores, config.flag_std_multiplier);

    info!(
        "Sentiment mean {:.2}, threshold {:.2}: {} of {} questions flagged",
        summary.overall_mean,
        summary.threshold,
        summary.flagged.len(),
        summary.question_means.len()
    );
    Ok(summary)
}
