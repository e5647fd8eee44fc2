//! Job state inference from submitit and SLURM log lines.
//!
//! Only two kinds of lines are considered: submitit's own log lines in the
//! output log (`submitit INFO (2024-01-15 10:30:00,123) - Job completed
//! successfully`) and srun/slurmstepd lines in the error log
//! (`slurmstepd: error: *** JOB 12345 ON node017 CANCELLED AT ... ***`).

use camino::Utf8Path;
use jobtrack_core::{ERR, JobFiles, Layout, LocateError, OUT, SH, job_file_paths};
use jobtrack_parsers::job_id_prefix;
use jobtrack_slurm::query_queued_job_ids;
use std::fmt;
use std::fs;
use thiserror::Error;

/// Prefix of submitit log lines in the output log.
pub const OUT_MARKER: &str = "submitit ";

/// Prefixes of scheduler lines in the error log.
pub const ERR_MARKERS: &[&str] = &["srun: ", "slurmstepd: "];

#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Locate(#[from] LocateError),
    #[error("No {kind} file found for job {job}")]
    MissingFile { job: String, kind: String },
    #[error("No submitit lines in {path}")]
    NoMarkerLines { path: String },
}

/// Lifecycle state inferred for a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    /// Script written, no output yet, still in the queue
    Pending,
    /// Script written, no output, no longer queued
    CancelledBeforeStart,
    Completed,
    /// The submitted function raised
    FailedException,
    /// scancel while running
    CancelledByUser,
    /// Scheduler-reported error with its message
    Failed(String),
    Running,
    /// Last submitit message, verbatim, when no rule matched
    Other(String),
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::CancelledBeforeStart => write!(f, "CANCELLED (before starting execution)"),
            Self::Completed => write!(f, "COMPLETED SUCCESSFULLY"),
            Self::FailedException => write!(f, "FAILED: Triggered an Exception"),
            Self::CancelledByUser => write!(f, "CANCELLED (terminated by user)"),
            Self::Failed(message) => write!(f, "FAILED: {}", message),
            Self::Running => write!(f, "RUNNING"),
            Self::Other(message) => write!(f, "{}", message),
        }
    }
}

/// Lines of `content` starting with any of `prefixes`, in file order.
pub fn marker_lines<'a>(content: &'a str, prefixes: &[&str]) -> Vec<&'a str> {
    content
        .lines()
        .filter(|line| prefixes.iter().any(|p| line.starts_with(p)))
        .collect()
}

/// Message part of a submitit line: the text after the first `" - "`.
pub fn output_message(line: &str) -> &str {
    line.split_once(" - ").map(|(_, msg)| msg).unwrap_or(line)
}

/// Error text of a scheduler line: its last colon-separated segment.
pub fn error_message(line: &str) -> &str {
    line.rsplit(':').next().unwrap_or(line).trim()
}

/// Apply the log rules to the marker lines of a started job.
///
/// Returns `None` when the output log has no submitit lines.
pub fn classify_logs(out_lines: &[&str], err_lines: &[&str]) -> Option<JobState> {
    let msg = output_message(out_lines.last()?);

    if msg.contains("completed successfully") {
        return Some(JobState::Completed);
    }
    if msg.contains("triggered an exception") {
        return Some(JobState::FailedException);
    }

    if let Some(err) = err_lines.last().filter(|line| line.contains("error")) {
        if err.contains("CANCELLED") {
            return Some(JobState::CancelledByUser);
        }
        return Some(JobState::Failed(error_message(err).to_string()));
    }

    if msg.contains("Loading") || msg.contains("Starting") {
        return Some(JobState::Running);
    }

    Some(JobState::Other(msg.to_string()))
}

/// Whether classifying `files` depends on the live queue.
pub fn needs_queue(files: &JobFiles) -> bool {
    !files.contains(OUT) && files.contains(SH)
}

/// Classify `job_task` from its located files and the queued job ids.
pub fn classify_job(
    job_task: &str,
    files: &JobFiles,
    queued: &[String],
) -> Result<JobState, ClassifyError> {
    if needs_queue(files) {
        let job_id = job_id_prefix(job_task);
        let state = if queued.iter().any(|id| id == job_id) {
            JobState::Pending
        } else {
            JobState::CancelledBeforeStart
        };
        return Ok(state);
    }

    let out_path = files.get(OUT).ok_or_else(|| ClassifyError::MissingFile {
        job: job_task.to_string(),
        kind: OUT.to_string(),
    })?;
    let out_content = read_lossy(out_path)?;
    let err_content = match files.get(ERR) {
        Some(path) => read_lossy(path)?,
        None => {
            tracing::debug!("Job {} has no error log", job_task);
            String::new()
        }
    };

    let out_lines = marker_lines(&out_content, &[OUT_MARKER]);
    let err_lines = marker_lines(&err_content, ERR_MARKERS);

    let state = classify_logs(&out_lines, &err_lines).ok_or_else(|| no_marker_lines(out_path))?;
    tracing::debug!("Job {} classified as {}", job_task, state);
    Ok(state)
}

/// Read a log file, replacing invalid UTF-8 from job output.
fn read_lossy(path: &Utf8Path) -> Result<String, ClassifyError> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn no_marker_lines(path: &Utf8Path) -> ClassifyError {
    ClassifyError::NoMarkerLines {
        path: path.to_string(),
    }
}

/// Locate the files of `job_task` and infer its state.
///
/// The queue is only queried when the job has a script but no output log.
pub async fn load_job_state(layout: &Layout, job_task: &str) -> Result<JobState, ClassifyError> {
    let files = job_file_paths(layout, job_task)?;
    let queued = if needs_queue(&files) {
        query_queued_job_ids(layout.queue_program(), layout.user(), None).await
    } else {
        Vec::new()
    };
    classify_job(job_task, &files, &queued)
}
