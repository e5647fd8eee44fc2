//! CLI argument parsing for jobtrack.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "jobtrack")]
#[command(about = "Infer the state of submitit jobs running on SLURM")]
pub struct Args {
    /// submititnow root directory (defaults to ~/.submititnow)
    #[arg(long, global = true, env = jobtrack_core::ROOT_ENV)]
    pub root: Option<Utf8PathBuf>,

    /// Directory holding <experiment>.csv trackers (defaults to the root)
    #[arg(long, global = true)]
    pub tracking_dir: Option<Utf8PathBuf>,

    /// User whose queue is inspected (defaults to $USER)
    #[arg(long, global = true)]
    pub user: Option<String>,

    /// Queue listing program
    #[arg(long, global = true, default_value = "squeue")]
    pub squeue: String,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Infer the state of one or more jobs
    State {
        /// Job ids, as <job> or <job>_<task>
        #[arg(required = true)]
        jobs: Vec<String>,
    },
    /// List the script, log and pickle files of a job
    Files {
        /// Job id, as <job> or <job>_<task>
        job: String,
    },
    /// List job ids currently in the queue
    Queue {
        /// Only keep queue lines mentioning this experiment
        #[arg(long)]
        experiment: Option<String>,
    },
    /// Show the job-state table of an experiment
    Experiment {
        /// Experiment name
        name: String,
    },
    /// Show tracked job submissions
    Tracker {
        /// Experiment name (all trackers when omitted)
        name: Option<String>,
    },
}
