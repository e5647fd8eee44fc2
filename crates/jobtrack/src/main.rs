//! jobtrack - submitit job state inspector for SLURM.

mod output;

use clap::Parser;
use jobtrack_cli::{Args, Command};
use jobtrack_core::{Layout, job_file_paths, load_job_trackers};
use jobtrack_slurm::query_queued_job_ids;
use jobtrack_state::{Experiment, JobStateRow, JobStateTable, load_job_state};
use miette::{IntoDiagnostic, Result};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let layout = build_layout(&args);
    tracing::debug!("Using layout {:?}", layout);

    match &args.command {
        Command::State { jobs } => {
            let mut rows = Vec::new();
            for job in jobs {
                let state = load_job_state(&layout, job).await;
                rows.push(JobStateRow::from_result(job.clone(), state));
            }
            output::print_job_states(&JobStateTable { rows }, args.json)?;
        }
        Command::Files { job } => {
            let files = job_file_paths(&layout, job).into_diagnostic()?;
            output::print_job_files(&files, args.json)?;
        }
        Command::Queue { experiment } => {
            let ids =
                query_queued_job_ids(layout.queue_program(), layout.user(), experiment.as_deref())
                    .await;
            output::print_job_ids(&ids, args.json)?;
        }
        Command::Experiment { name } => {
            let experiment = Experiment::new(name, &layout);
            if !experiment.exists() {
                tracing::warn!(
                    "Experiment {} is incomplete or missing under {}",
                    name,
                    experiment.dir()
                );
            }
            if args.json {
                output::print_job_states(&experiment.job_states_table().await, true)?;
            } else {
                experiment.show_job_states().await;
            }
        }
        Command::Tracker { name } => {
            let records =
                load_job_trackers(layout.tracking_dir(), name.as_deref()).into_diagnostic()?;
            output::print_tracker(&records, args.json)?;
        }
    }

    Ok(())
}

/// Resolve directories and queue settings from flags, then environment.
fn build_layout(args: &Args) -> Layout {
    let mut layout = match &args.root {
        Some(root) => Layout::new(root.clone()),
        None => Layout::from_env(),
    };
    if let Some(dir) = &args.tracking_dir {
        layout = layout.with_tracking_dir(dir.clone());
    }
    if let Some(user) = &args.user {
        layout = layout.with_user(user.clone());
    }
    layout.with_queue_program(args.squeue.clone())
}

/// Log to stderr, filtered by RUST_LOG (default `warn`, `debug` with -v).
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
