//! Job state inference for jobtrack.
//!
//! Combines located log files with the live SLURM queue to label each job,
//! and groups jobs by experiment.

pub mod classify;
pub mod experiment;

pub use classify::{
    ClassifyError, ERR_MARKERS, JobState, OUT_MARKER, classify_job, classify_logs, load_job_state,
};
pub use experiment::{Experiment, JobStateRow, JobStateTable};
