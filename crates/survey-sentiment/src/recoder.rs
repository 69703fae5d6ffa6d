//! Likert recoding and derived respondent fields.
//!
//! Columns are split into sentiment questions and traits. Declared roles in
//! [`AnalysisConfig::column_kinds`] win; undeclared columns fall back to
//! vocabulary detection unless the schema is strict. Sentiment columns are
//! then replaced by `Float64` scores, and two derived trait fields are
//! appended: a participation flag and numeric tenure.

use crate::config::{AnalysisConfig, ColumnKind};
use crate::error::Result;
use crate::likert::LikertScale;
use crate::types::ColumnSchema;
use crate::utils::{column_names, has_column, string_values};
use polars::prelude::*;
use tracing::{debug, info, warn};

/// Name of the derived participation flag column.
pub const INVOLVEMENT_COLUMN: &str = "involvement_binary";
/// Name of the derived numeric tenure column.
pub const YEARS_COLUMN: &str = "years_numeric";

pub const PARTICIPATES: &str = "Participates";
pub const DOES_NOT_PARTICIPATE: &str = "Does not";

/// Classify every column of the table.
///
/// Trait columns are never sentiment columns, whatever they contain.
pub fn classify_columns(df: &DataFrame, config: &AnalysisConfig) -> Result<ColumnSchema> {
    let mut schema = ColumnSchema::default();

    for name in column_names(df) {
        let kind = if config.trait_columns.contains(&name) {
            ColumnKind::Trait
        } else if let Some(kind) = config.declared_kind(&name) {
            kind
        } else if config.strict_schema {
            ColumnKind::Ignore
        } else if uses_vocabulary(df, &name, &config.likert_scale)? {
            ColumnKind::Sentiment
        } else {
            ColumnKind::Ignore
        };

        match kind {
            ColumnKind::Sentiment => schema.sentiment.push(name),
            ColumnKind::Trait => schema.traits.push(name),
            ColumnKind::Ignore => schema.ignored.push(name),
        }
    }

    info!(
        "Classified columns: {} sentiment, {} trait, {} ignored",
        schema.sentiment.len(),
        schema.traits.len(),
        schema.ignored.len()
    );
    Ok(schema)
}

/// Whether any non-missing value of the column is a Likert label.
fn uses_vocabulary(df: &DataFrame, name: &str, scale: &LikertScale) -> Result<bool> {
    Ok(string_values(df, name)?
        .iter()
        .flatten()
        .any(|value| scale.contains(value)))
}

/// Recode a list of answers. Labels outside the vocabulary become missing.
pub fn recode_values(values: &[Option<String>], scale: &LikertScale) -> Vec<Option<f64>> {
    values
        .iter()
        .map(|value| value.as_deref().and_then(|label| scale.score(label)).map(f64::from))
        .collect()
}

/// Copy of `df` with every sentiment column replaced by its scores.
pub fn encode(df: &DataFrame, schema: &ColumnSchema, scale: &LikertScale) -> Result<DataFrame> {
    let mut encoded = df.clone();
    for name in &schema.sentiment {
        let raw = string_values(df, name)?;
        let scores = recode_values(&raw, scale);
        let unrecognised = raw
            .iter()
            .zip(&scores)
            .filter(|(raw, score)| raw.is_some() && score.is_none())
            .count();
        if unrecognised > 0 {
            debug!("'{}': {} answers outside the Likert vocabulary", name, unrecognised);
        }
        encoded.with_column(Series::new(name.as_str().into(), scores))?;
    }
    Ok(encoded)
}

/// Participation flag from the free-text involvement answer.
///
/// Any answer containing "Yes" participates; everything else, including a
/// missing answer, does not.
pub fn involvement_flag(answer: Option<&str>) -> &'static str {
    match answer {
        Some(text) if text.contains("Yes") => PARTICIPATES,
        _ => DOES_NOT_PARTICIPATE,
    }
}

/// Years of attendance from an answer like `"3 (joined in 2022)"`.
///
/// The text before the first `(` is trimmed and parsed as an integer;
/// anything unparsable is missing.
pub fn extract_years(answer: &str) -> Option<i64> {
    answer.split('(').next()?.trim().parse().ok()
}

/// Append the derived trait fields to the encoded table.
///
/// Each field is only added when its source column is present. Returns the
/// names of the fields that were added.
pub fn derive_fields(
    raw: &DataFrame,
    encoded: &mut DataFrame,
    config: &AnalysisConfig,
) -> Result<Vec<&'static str>> {
    let mut added = Vec::new();
    let traits = &config.trait_columns;

    if has_column(raw, &traits.involvement) {
        let flags: Vec<&str> = string_values(raw, &traits.involvement)?
            .iter()
            .map(|answer| involvement_flag(answer.as_deref()))
            .collect();
        encoded.with_column(Series::new(INVOLVEMENT_COLUMN.into(), flags))?;
        added.push(INVOLVEMENT_COLUMN);
    } else {
        warn!(
            "Involvement column '{}' not found; involvement analysis skipped",
            traits.involvement
        );
    }

    if has_column(raw, &traits.years) {
        let years: Vec<Option<i64>> = string_values(raw, &traits.years)?
            .iter()
            .map(|answer| answer.as_deref().and_then(extract_years))
            .collect();
        let parsed = years.iter().flatten().count();
        debug!("Parsed tenure for {} of {} respondents", parsed, years.len());
        encoded.with_column(Series::new(YEARS_COLUMN.into(), years))?;
        added.push(YEARS_COLUMN);
    } else {
        warn!(
            "Tenure column '{}' not found; tenure analysis skipped",
            traits.years
        );
    }

    Ok(added)
}
