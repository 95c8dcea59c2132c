use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use trace_trainer::comparison::{BatchedComparator, ComparisonMetric};
use trace_trainer::telemetry;
use trace_trainer::{AppConfig, Trace, TraceRole, TracingSession};

#[derive(Parser, Debug)]
#[command(
    name = "trace_cli",
    about = "Offline harness for the trace trainer feedback engine"
)]
struct Cli {
    /// JSON configuration file (defaults are used when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log progress to stderr
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compare a student trace against an expert trace and print the plot data
    Compare {
        #[arg(long)]
        expert: PathBuf,
        #[arg(long)]
        student: PathBuf,
        #[arg(long, value_enum, default_value_t = MetricArg::Pressure)]
        metric: MetricArg,
    },
    /// Replay a student trace through a live session, one feedback line per sample
    Replay {
        #[arg(long)]
        expert: PathBuf,
        #[arg(long)]
        student: PathBuf,
        /// Print the telemetry snapshot after the last stroke
        #[arg(long)]
        telemetry: bool,
    },
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum MetricArg {
    Accuracy,
    Pressure,
    Tilt,
    Speed,
}

impl From<MetricArg> for ComparisonMetric {
    fn from(arg: MetricArg) -> Self {
        match arg {
            MetricArg::Accuracy => ComparisonMetric::Accuracy,
            MetricArg::Pressure => ComparisonMetric::Pressure,
            MetricArg::Tilt => ComparisonMetric::Tilt,
            MetricArg::Speed => ComparisonMetric::Speed,
        }
    }
}

#[derive(Serialize)]
struct StrokeSummary {
    stroke_id: u64,
    samples: usize,
    discarded_segments: usize,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    if cli.verbose {
        trace_trainer::init_logging();
    }
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Compare {
            expert,
            student,
            metric,
        } => run_compare(config, &expert, &student, metric.into()),
        Commands::Replay {
            expert,
            student,
            telemetry,
        } => run_replay(config, &expert, &student, telemetry),
    }
}

fn run_compare(
    config: AppConfig,
    expert_path: &Path,
    student_path: &Path,
    metric: ComparisonMetric,
) -> Result<ExitCode> {
    let expert = load_trace(expert_path, TraceRole::Expert)?;
    let student = load_trace(student_path, TraceRole::Student)?;

    let comparator = BatchedComparator::new(config.thresholds, config.comparison);
    let comparison = comparator
        .compare_traces(&expert, &student, metric)
        .with_context(|| format!("comparing {} traces", metric.label()))?;

    println!("{}", serde_json::to_string_pretty(&comparison)?);
    Ok(ExitCode::from(0))
}

fn run_replay(
    config: AppConfig,
    expert_path: &Path,
    student_path: &Path,
    print_telemetry: bool,
) -> Result<ExitCode> {
    let expert = load_trace(expert_path, TraceRole::Expert)?;
    let student = load_trace(student_path, TraceRole::Student)?;
    let session = TracingSession::new(config, expert);

    for stroke in &student.strokes {
        session.begin_stroke()?;
        for sample in stroke.samples() {
            let feedback = session.on_sample(*sample)?;
            println!("{}", serde_json::to_string(&feedback)?);
        }

        if let Some(finalized) = session.finish_stroke()? {
            let summary = StrokeSummary {
                stroke_id: finalized.stroke_id,
                samples: finalized.len(),
                discarded_segments: finalized.discarded_segments,
            };
            println!("{}", serde_json::to_string(&summary)?);
        }
    }

    if print_telemetry {
        println!("{}", serde_json::to_string(&telemetry::hub().snapshot())?);
    }

    Ok(ExitCode::from(0))
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            AppConfig::from_json_str(&contents)
                .with_context(|| format!("parsing config {}", path.display()))
        }
        None => Ok(AppConfig::default()),
    }
}

fn load_trace(path: &Path, role: TraceRole) -> Result<Trace> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("reading trace {}", path.display()))?;
    let mut trace: Trace = serde_json::from_str(&contents)
        .with_context(|| format!("parsing trace {}", path.display()))?;
    trace.role = role;
    Ok(trace)
}
