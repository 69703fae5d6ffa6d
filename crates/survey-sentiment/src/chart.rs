//! Bar chart of the lowest-scoring questions.
//!
//! One horizontal bar per question, lowest score on top, coloured by whether
//! it falls below the flagging threshold, with reference lines at the
//! overall mean and at the threshold. Rendered with `plotters` to a PNG.

use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::likert::MAX_SCORE;
use crate::types::SentimentSummary;
use crate::utils::truncate_label;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;
use tracing::{info, warn};

/// Bar colour for questions below the threshold.
pub const BELOW_THRESHOLD_COLOR: RGBColor = RGBColor(0xd3, 0x2f, 0x2f);
/// Bar colour for the remaining questions.
pub const ABOVE_THRESHOLD_COLOR: RGBColor = RGBColor(0xff, 0x98, 0x00);

const X_AXIS_DESC: &str = "Mean Score (1=Strongly Disagree → 6=Strongly Agree)";

/// One bar of the chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: f64,
    pub below_threshold: bool,
}

/// Bars for the `chart_bottom_n` lowest questions, lowest first.
pub fn chart_bars(summary: &SentimentSummary, config: &AnalysisConfig) -> Vec<Bar> {
    summary
        .question_means
        .iter()
        .take(config.chart_bottom_n)
        .map(|score| Bar {
            label: truncate_label(&score.question, config.label_max_chars),
            value: score.mean,
            below_threshold: score.mean < summary.threshold,
        })
        .collect()
}

fn chart_error<E: std::fmt::Display>(err: E) -> AnalysisError {
    AnalysisError::Chart(err.to_string())
}

/// Vertical line at `x` broken into dashes of `dash` with gaps of `gap`
/// (both in row units).
fn dashed_line(
    x: f64,
    from: f64,
    to: f64,
    dash: f64,
    gap: f64,
    style: ShapeStyle,
) -> Vec<PathElement<(f64, f64)>> {
    let mut segments = Vec::new();
    let mut y = from;
    while y < to {
        let end = (y + dash).min(to);
        segments.push(PathElement::new(vec![(x, y), (x, end)], style));
        y = end + gap;
    }
    segments
}

/// Render the chart to `path`, overwriting any existing file.
///
/// Returns the number of bars drawn. With no questions nothing is written.
pub fn render_low_sentiment_chart(
    path: &Path,
    summary: &SentimentSummary,
    config: &AnalysisConfig,
) -> Result<usize> {
    let bars = chart_bars(summary, config);
    if bars.is_empty() {
        warn!("No sentiment questions to chart; {} not written", path.display());
        return Ok(0);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let (width, height) = config.chart_pixels();
    // point sizes to pixels at the configured resolution
    let px = |points: f64| (points * f64::from(config.chart_dpi) / 72.0).round() as u32;

    let count = bars.len();
    let row = |idx: usize| (count - 1 - idx) as f64;
    let x_max = bars
        .iter()
        .map(|bar| bar.value)
        .chain([summary.overall_mean, summary.threshold])
        .filter(|v| v.is_finite())
        .fold(0.0, f64::max)
        * 1.05;
    let x_max = if x_max > 0.0 { x_max } else { f64::from(MAX_SCORE) };

    let longest_label = bars.iter().map(|b| b.label.chars().count()).max().unwrap_or(0);
    let label_area = (longest_label as f64 * f64::from(px(8.0)) * 0.52) as u32 + px(10.0);

    let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_error)?;

    let title = format!(
        "Bottom {} Sentiment Scores — {}",
        config.chart_bottom_n, config.survey_title
    );
    let mut chart = ChartBuilder::on(&root)
        .caption(
            title,
            ("sans-serif", px(12.0)).into_font().style(FontStyle::Bold),
        )
        .margin(px(8.0))
        .x_label_area_size(px(30.0))
        .y_label_area_size(label_area)
        .build_cartesian_2d(0f64..x_max, -0.5f64..(count as f64 - 0.5))
        .map_err(chart_error)?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_label_formatter(&|_| String::new())
        .x_desc(X_AXIS_DESC)
        .axis_desc_style(("sans-serif", px(10.0)))
        .label_style(("sans-serif", px(8.0)))
        .draw()
        .map_err(chart_error)?;

    chart
        .draw_series(bars.iter().enumerate().map(|(idx, bar)| {
            let y = row(idx);
            let color = if bar.below_threshold {
                BELOW_THRESHOLD_COLOR
            } else {
                ABOVE_THRESHOLD_COLOR
            };
            Rectangle::new([(0.0, y - 0.4), (bar.value, y + 0.4)], color.filled())
        }))
        .map_err(chart_error)?;

    // question labels, right-aligned against the plotting area
    let label_style = TextStyle::from(("sans-serif", px(8.0)).into_font())
        .pos(Pos::new(HPos::Right, VPos::Center))
        .color(&BLACK);
    for (idx, bar) in bars.iter().enumerate() {
        let (x, y) = chart.backend_coord(&(0.0, row(idx)));
        root.draw(&Text::new(bar.label.clone(), (x - px(4.0) as i32, y), label_style.clone()))
            .map_err(chart_error)?;
    }

    let (y_from, y_to) = (-0.5, count as f64 - 0.5);
    let mut has_legend = false;

    if summary.overall_mean.is_finite() {
        let style = BLACK.stroke_width(2);
        chart
            .draw_series(dashed_line(summary.overall_mean, y_from, y_to, 0.25, 0.15, style))
            .map_err(chart_error)?
            .label(format!("Mean ({:.2})", summary.overall_mean))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
        has_legend = true;
    }

    if summary.threshold.is_finite() {
        let style = BELOW_THRESHOLD_COLOR.stroke_width(2);
        chart
            .draw_series(dashed_line(summary.threshold, y_from, y_to, 0.05, 0.1, style))
            .map_err(chart_error)?
            .label(format!("-{} ({:.2})", summary.sd_label(), summary.threshold))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
        has_legend = true;
    }

    if has_legend {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(&BLACK)
            .label_font(("sans-serif", px(9.0)))
            .draw()
            .map_err(chart_error)?;
    }

    root.present().map_err(chart_error)?;
    info!("Chart saved: {} ({} bars)", path.display(), count);
    Ok(count)
}
