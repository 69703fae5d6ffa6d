//! CLI entry point for the survey sentiment analysis.

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use survey_sentiment::reporting::report_stem;
use survey_sentiment::{AnalysisConfig, ConsoleSummary, ReportGenerator, SurveyAnalysis};
use tracing::info;

const DEFAULT_INPUT: &str = "2024_Biennial_Census_Results.xlsx";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Likert survey sentiment analysis",
    long_about = "Flags survey questions with unusually low agreement, tests which \
                  respondent traits are associated with each question, and draws a \
                  chart of the lowest-scoring questions.\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  RUST_LOG              Overrides --log-level (e.g. survey_sentiment=debug)\n\n\
                  EXAMPLES:\n  \
                  # Analyse the default census export\n  \
                  survey-sentiment\n\n  \
                  # CSV export, custom chart path, JSON report next to it\n  \
                  survey-sentiment -i responses.csv -o out/chart.png -r --report-dir out\n\n  \
                  # Declared column roles and thresholds\n  \
                  survey-sentiment -i census.xlsx -c analysis.json"
)]
struct Args {
    /// Survey export to analyse (xlsx, xls, ods or csv)
    #[arg(value_name = "INPUT", conflicts_with = "input")]
    input_path: Option<String>,

    /// Survey export to analyse (same as the positional argument)
    #[arg(short, long)]
    input: Option<String>,

    /// Output path of the low-sentiment chart
    #[arg(short = 'o', long, default_value = "chart_low_sentiments.png")]
    chart: String,

    /// JSON file with analysis settings
    ///
    /// Missing fields take their defaults. Column roles go under
    /// "column_kinds", e.g. {"column_kinds": {"Any comments?": "ignore"}}
    #[arg(short, long)]
    config: Option<String>,

    /// Skip rendering the chart
    #[arg(long)]
    no_chart: bool,

    /// Output JSON to stdout instead of the human-readable summary
    ///
    /// Disables all logs; only the final JSON report is written.
    #[arg(long)]
    json: bool,

    /// Write a JSON report to the report directory
    ///
    /// The report will be saved as <input_name>_report.json
    #[arg(short = 'r', long)]
    emit_report: bool,

    /// Directory for --emit-report
    #[arg(long, default_value = ".")]
    report_dir: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings, errors and the summary)
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    fn input_file(&self) -> &str {
        self.input
            .as_deref()
            .or(self.input_path.as_deref())
            .unwrap_or(DEFAULT_INPUT)
    }
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    let config = match &args.config {
        Some(path) => AnalysisConfig::from_json_file(path)
            .with_context(|| format!("Invalid configuration in {}", path))?,
        None => AnalysisConfig::default(),
    };

    let analysis = SurveyAnalysis::builder()
        .config(config)
        .chart_path(&args.chart)
        .render_chart(!args.no_chart)
        .build()?;

    let input = args.input_file();
    info!("{}", "=".repeat(80));
    info!("Analysing {}", input);
    info!("{}", "=".repeat(80));

    let outcome = analysis
        .run_file(input)
        .map_err(|e| anyhow!("Analysis failed: {}", e))?;
    let report = ReportGenerator::build_report(input, &outcome);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if args.emit_report {
        let generator = ReportGenerator::new(&args.report_dir);
        let report_path = generator.write_report_to_file(&report, &report_stem(input))?;
        info!("Report written to: {}", report_path.display());
    }

    print!("{}", ConsoleSummary::new(&report, analysis.config().top_n));
    Ok(())
}
