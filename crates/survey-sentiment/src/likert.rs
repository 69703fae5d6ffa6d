//! Likert vocabulary: the fixed mapping from answer text to ordinal score.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lowest score on the agreement scale (Strongly Disagree).
pub const MIN_SCORE: u8 = 1;
/// Highest score on the agreement scale (Strongly Agree).
pub const MAX_SCORE: u8 = 6;

/// Mapping from Likert answer labels to scores.
///
/// Matching is exact: labels that differ in case or whitespace are not
/// recognised and recode to missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LikertScale {
    labels: BTreeMap<String, u8>,
}

impl Default for LikertScale {
    /// Six canonical levels plus the two "would use" variants found on the
    /// facilities questions.
    fn default() -> Self {
        Self::new([
            ("Strongly Agree", 6),
            ("Agree", 5),
            ("Slightly Agree", 4),
            ("Slightly Disagree", 3),
            ("Disagree", 2),
            ("Strongly Disagree", 1),
            ("Strongly Agree (Would use)", 6),
            ("Strongly Disagree (Would not use)", 1),
        ])
    }
}

impl LikertScale {
    /// Build a scale from `(label, score)` pairs. Later duplicates win.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, u8)>,
        S: Into<String>,
    {
        Self {
            labels: entries
                .into_iter()
                .map(|(label, score)| (label.into(), score))
                .collect(),
        }
    }

    /// Score for a label, or `None` if the label is not in the vocabulary.
    #[inline]
    pub fn score(&self, label: &str) -> Option<u8> {
        self.labels.get(label).copied()
    }

    /// Whether the label belongs to the vocabulary.
    #[inline]
    pub fn contains(&self, label: &str) -> bool {
        self.labels.contains_key(label)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Iterate `(label, score)` pairs in label order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u8)> {
        self.labels.iter().map(|(label, score)| (label.as_str(), *score))
    }

    /// Labels whose score lies outside `MIN_SCORE..=MAX_SCORE`.
    pub fn out_of_range_labels(&self) -> Vec<&str> {
        self.iter()
            .filter(|(_, score)| !(MIN_SCORE..=MAX_SCORE).contains(score))
            .map(|(label, _)| label)
            .collect()
    }
}
