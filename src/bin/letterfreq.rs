//! letterfreq CLI: one worker process per input file, one histogram record per worker.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use letterfreq::Error;
use letterfreq::config::Config;
use letterfreq::engine::{Orchestrator, OrchestratorConfig, RunSummary, WorkerCommand, worker};
use letterfreq::model::WorkerOutcome;
use letterfreq::telemetry::{TelemetryConfig, init_telemetry};
use letterfreq::writer::FileResultWriter;

#[derive(Parser)]
#[command(
    name = "letterfreq",
    about = "Count letter frequencies per file, one worker process per file"
)]
struct Cli {
    /// Input files. The literal `SIG` simulates a worker that is interrupted
    files: Vec<String>,
    /// Directory for histogram records
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
    /// Abort the whole run on the first failed job
    #[arg(long)]
    strict: bool,
    /// Write a JSON run report to this path
    #[arg(long)]
    report: Option<PathBuf>,
    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Arguments in worker mode: a single job, histogram written to stdout.
#[derive(Parser)]
#[command(name = "letterfreq-worker")]
struct WorkerArgs {
    input: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    if worker::in_worker_role() {
        let args = WorkerArgs::parse();
        let _guard = init_telemetry(TelemetryConfig {
            endpoint: None,
            service_name: "letterfreq-worker".to_string(),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "warn".to_string()),
        })
        .ok();
        return worker::run(&args.input).into();
    }

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => match e.downcast_ref::<Error>() {
            Some(Error::Usage(msg)) => {
                eprintln!("Error: {msg}");
                eprintln!("Usage: letterfreq [OPTIONS] <FILES>...");
                ExitCode::from(2)
            }
            _ => {
                eprintln!("Error: {e:#}");
                ExitCode::FAILURE
            }
        },
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if cli.files.is_empty() {
        return Err(Error::Usage("no input files provided".to_string()).into());
    }

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }
    if cli.strict {
        config.strict = true;
    }

    let _guard = init_telemetry(TelemetryConfig {
        endpoint: config.otel_endpoint.clone(),
        service_name: "letterfreq".to_string(),
        log_level: config.log_level.clone(),
    })?;

    let writer = FileResultWriter::new(&config.output_dir);
    writer
        .ensure_dir()
        .with_context(|| format!("cannot create {}", config.output_dir.display()))?;

    let worker = match &config.worker {
        Some(program) => WorkerCommand::letterfreq(program),
        None => WorkerCommand::current_exe().context("cannot locate worker executable")?,
    };

    let orchestrator = Orchestrator::new(
        OrchestratorConfig {
            worker,
            policy: config.policy(),
        },
        writer,
    );
    let summary = orchestrator.run(&cli.files).await?;
    print_summary(&summary);

    if let Some(path) = cli.report {
        let json = serde_json::to_string_pretty(&summary)?;
        std::fs::write(&path, json)
            .with_context(|| format!("cannot write report {}", path.display()))?;
    }

    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!("{:<4}  {:<8}  {:<8}  {:<30}  DETAIL", "JOB", "PID", "STATUS", "INPUT");
    println!("{}", "-".repeat(80));

    for report in &summary.jobs {
        let (status, detail) = match (&report.outcome, &report.record, &report.write_error) {
            (WorkerOutcome::Completed(_), Some(path), _) => ("ok", path.display().to_string()),
            (WorkerOutcome::Completed(_), None, Some(err)) => ("unsaved", err.clone()),
            (WorkerOutcome::Completed(_), None, None) => ("unsaved", "-".to_string()),
            (WorkerOutcome::Failed(reason), _, _) => ("FAILED", reason.to_string()),
        };
        println!(
            "{:<4}  {:<8}  {:<8}  {:<30}  {}",
            report.job.0, report.pid, status, report.input, detail
        );
    }

    println!(
        "\n{} job(s): {} completed, {} failed, {} unsaved",
        summary.jobs.len(),
        summary.completed,
        summary.failed,
        summary.write_failures
    );
}
