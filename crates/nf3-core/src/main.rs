//! nf3-core: batch analytics over NF3 gas-flow extracts.
//!
//! Every analysis subcommand reads one CSV extract, applies the resolved
//! configuration, and writes a single report to stdout. Logs go to stderr.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use nf3_common::{Dimension, Error, FlowUnit, Granularity, OutputFormat, Result};
use nf3_config::{resolve_config, ConfigPaths, ConfigSnapshot, PresetName};
use nf3_core::config_cli::{run_config, ConfigArgs};
use nf3_core::exit_codes::ExitCode;
use nf3_core::logging::init_logging;
use nf3_core::output::{write_report, Render, Report};
use nf3_core::Pipeline;
use serde::Serialize;
use tracing::{debug, info};

/// NF3 flow aggregation, unit conversion and outlier reports
#[derive(Parser, Debug)]
#[command(name = "nf3-core", version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Debug)]
struct GlobalOpts {
    /// CSV extract to analyze
    #[arg(short, long, global = true, env = "NF3_INPUT")]
    input: Option<PathBuf>,

    /// Config file (JSON or TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Built-in preset, used when no config file is found
    #[arg(long, global = true, value_enum)]
    preset: Option<PresetName>,

    /// Override the configured flow unit
    #[arg(long, global = true, value_enum)]
    unit: Option<FlowUnit>,

    /// Override the configured time granularity
    #[arg(long, global = true, value_enum)]
    granularity: Option<Granularity>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run overview: totals, date span, flagged buckets, cost
    Summary,
    /// Bucketed totals with rolling means, monthly cumulative sums and change rates
    Series,
    /// Per-category totals and shares
    Shares {
        #[arg(short, long, value_enum, default_value_t = Dimension::Chamber)]
        dimension: Dimension,
        #[arg(long, value_enum, default_value = "bucket")]
        view: ShareView,
        /// Restrict the overall view to one day
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// IQR outlier verdict per bucket (exit 1 when any bucket is flagged)
    Outliers {
        /// Screen (bucket, category) cells of this dimension instead of bucket totals
        #[arg(short, long, value_enum)]
        dimension: Option<Dimension>,
    },
    /// Buckets exceeding N times their recent average (exit 1 when any)
    Abnormal,
    /// Hierarchical breakdown whose parents sum their children
    Tree {
        /// Comma-separated levels, overriding the configured hierarchy
        #[arg(long, value_enum, value_delimiter = ',')]
        dims: Vec<Dimension>,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Top chambers by flow
    Ranking {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Day-over-day and month-over-month change for one day (default: latest)
    Changes {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Glass counts and flow per glass
    Glass,
    /// Parameter correlation matrix for one step
    Correlation {
        #[arg(long)]
        step: Option<String>,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Recent daily flow table, newest first
    Recent,
    /// Mass, cost and CO2-equivalent emissions over the cleaned daily series
    Cost,
    /// Inspect and validate configuration
    Config(ConfigArgs),
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Layout of the `shares` report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ShareView {
    /// Category shares within each time bucket
    Bucket,
    /// Totals per category over the whole (or one day's) table
    Overall,
    /// Month by category pivot of percentages
    Monthly,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.global.verbose, cli.global.log_json);

    let code = match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("nf3-core: {}", err);
            ExitCode::from(&err)
        }
    };
    std::process::exit(code.as_i32());
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let global = &cli.global;
    match &cli.command {
        Commands::Config(args) => {
            return Ok(run_config(
                &global.format,
                args,
                global.config.as_deref(),
                global.preset,
            ))
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(*shell, &mut cmd, "nf3-core", &mut io::stdout());
            return Ok(ExitCode::Clean);
        }
        _ => {}
    }

    let snapshot = effective_config(global)?;
    let input = global
        .input
        .as_deref()
        .ok_or_else(|| Error::InvalidInput("no input file (use --input or NF3_INPUT)".into()))?;
    let pipeline = load_pipeline(input, &snapshot)?;
    dispatch(&cli.command, &pipeline, snapshot, global.format)
}

/// Resolve the config, apply CLI overrides, and freeze it for the report.
fn effective_config(global: &GlobalOpts) -> Result<ConfigSnapshot> {
    let mut resolved = resolve_config(&ConfigPaths::discover(global.config.as_deref()), global.preset)?;
    if let Some(unit) = global.unit {
        resolved.config.unit = unit;
    }
    if let Some(granularity) = global.granularity {
        resolved.config.granularity = granularity;
    }
    info!(
        source = %resolved.source,
        unit = %resolved.config.unit,
        granularity = %resolved.config.granularity,
        "configuration resolved"
    );
    Ok(ConfigSnapshot::capture(&resolved)?)
}

fn load_pipeline(input: &Path, snapshot: &ConfigSnapshot) -> Result<Pipeline> {
    let pipeline = Pipeline::load(input, snapshot.config.clone())?;
    let ingest = pipeline.ingest_report();
    info!(
        path = %input.display(),
        rows = ingest.rows,
        kept = pipeline.filter_summary().kept,
        "input loaded"
    );
    Ok(pipeline)
}

fn dispatch(
    command: &Commands,
    pipeline: &Pipeline,
    snapshot: ConfigSnapshot,
    format: OutputFormat,
) -> Result<ExitCode> {
    match command {
        Commands::Summary => emit(format, "summary", snapshot, pipeline.summary()),
        Commands::Series => emit(format, "series", snapshot, pipeline.series()),
        Commands::Shares {
            dimension,
            view,
            date,
        } => match view {
            ShareView::Bucket => emit(format, "shares", snapshot, pipeline.shares(*dimension)),
            ShareView::Overall => emit(
                format,
                "shares",
                snapshot,
                pipeline.distribution(*dimension, *date),
            ),
            ShareView::Monthly => emit(
                format,
                "shares",
                snapshot,
                pipeline.monthly_shares(*dimension),
            ),
        },
        Commands::Outliers { dimension: None } => {
            let table = pipeline.outliers();
            let flagged = table.outlier_count();
            debug!(flagged, "iqr outliers");
            emit(format, "outliers", snapshot, table)?;
            Ok(ExitCode::from_findings(flagged))
        }
        Commands::Outliers {
            dimension: Some(dimension),
        } => {
            let table = pipeline.category_outliers(*dimension);
            let flagged = table.outlier_count();
            debug!(flagged, %dimension, "iqr category outliers");
            emit(format, "outliers", snapshot, table)?;
            Ok(ExitCode::from_findings(flagged))
        }
        Commands::Abnormal => {
            let table = pipeline.abnormal();
            let flagged = table.abnormal_count();
            debug!(flagged, "abnormal buckets");
            emit(format, "abnormal", snapshot, table)?;
            Ok(ExitCode::from_findings(flagged))
        }
        Commands::Tree { dims, date } => {
            let dims = (!dims.is_empty()).then_some(dims.as_slice());
            let tree = pipeline.hierarchy(dims, *date)?;
            emit(format, "tree", snapshot, tree)
        }
        Commands::Ranking { date } => emit(format, "ranking", snapshot, pipeline.ranking(*date)),
        Commands::Changes { date } => {
            let date = date.or_else(|| pipeline.latest_date()).ok_or_else(|| Error::NoData {
                what: "any dated record".into(),
            })?;
            emit(format, "changes", snapshot, pipeline.flow_changes(date)?)
        }
        Commands::Glass => emit(format, "glass", snapshot, pipeline.glass_report()),
        Commands::Correlation { step, date } => emit(
            format,
            "correlation",
            snapshot,
            pipeline.correlation(step.as_deref(), *date),
        ),
        Commands::Recent => emit(format, "recent", snapshot, pipeline.recent_days()),
        Commands::Cost => emit(format, "cost", snapshot, pipeline.cost_summary()),
        Commands::Config(_) | Commands::Completions { .. } => Ok(ExitCode::Clean),
    }
}

fn emit<T>(format: OutputFormat, command: &str, snapshot: ConfigSnapshot, data: T) -> Result<ExitCode>
where
    T: Serialize + Render,
{
    let report = Report::new(command, snapshot, data);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_report(&mut out, format, &report)?;
    out.flush()?;
    Ok(ExitCode::Clean)
}
