//! Locate the script, log and pickle files of a job.
//!
//! submitit names every file after the job: `<job>_submission.sh`,
//! `<job>_<task>_log.out`, `<job>_<task>_log.err`,
//! `<job>_<task>_submitted.pkl`, `<job>_<task>_result.pkl`.

use crate::layout::Layout;
use camino::{Utf8Path, Utf8PathBuf};
use jobtrack_parsers::{JobIdError, JobTaskId};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Submission script.
pub const SH: &str = "sh";
/// Standard output log.
pub const OUT: &str = "out";
/// Standard error log.
pub const ERR: &str = "err";

const PICKLE_EXTENSIONS: &[&str] = &["pkl", "pickle"];

#[derive(Error, Debug)]
pub enum LocateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Non UTF-8 path: {0}")]
    NonUtf8Path(String),
    #[error(transparent)]
    JobId(#[from] JobIdError),
    #[error("No {kind} file found for job {job}")]
    MissingFile { job: String, kind: String },
}

/// Files found for one job, keyed by kind (`sh`, `out`, `err` or a pickle tag).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct JobFiles(BTreeMap<String, Utf8PathBuf>);

impl JobFiles {
    pub fn get(&self, kind: &str) -> Option<&Utf8Path> {
        self.0.get(kind).map(Utf8PathBuf::as_path)
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.0.contains_key(kind)
    }

    pub fn insert(&mut self, kind: impl Into<String>, path: Utf8PathBuf) {
        self.0.insert(kind.into(), path);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Utf8Path)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_path()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Recursively list every regular file under `root`, in sorted order.
///
/// A missing root yields no files.
pub fn list_files(root: &Utf8Path) -> Result<Vec<Utf8PathBuf>, LocateError> {
    let mut files = Vec::new();
    if root.is_dir() {
        walk(root, &mut files)?;
    }
    Ok(files)
}

fn walk(dir: &Utf8Path, files: &mut Vec<Utf8PathBuf>) -> Result<(), LocateError> {
    let mut entries = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = Utf8PathBuf::try_from(entry.path())
            .map_err(|e| LocateError::NonUtf8Path(e.into_path_buf().display().to_string()))?;
        entries.push(path);
    }
    entries.sort();

    for path in entries {
        if path.is_dir() {
            walk(&path, files)?;
        } else if path.is_file() {
            files.push(path);
        }
    }
    Ok(())
}

/// Find the files of `job` under `experiments_root`.
///
/// A `.sh` file matches on the bare job id. Other files must contain the
/// job tag (`<job>_<task>`, or `<job>` without a task) and are keyed by
/// extension, except pickles which are keyed by the last `_` token of their
/// stem. Later matches of the same kind replace earlier ones.
pub fn find_job_files(
    experiments_root: &Utf8Path,
    job: JobTaskId,
) -> Result<JobFiles, LocateError> {
    let job_id = job.job_id.to_string();
    let tag = job.tag();
    let mut files = JobFiles::default();

    for path in list_files(experiments_root)? {
        let relative = path
            .strip_prefix(experiments_root)
            .map(Utf8Path::as_str)
            .unwrap_or(path.as_str());

        if relative.ends_with(".sh") && relative.contains(&job_id) {
            files.insert(SH, path);
            continue;
        }
        if !relative.contains(&tag) {
            continue;
        }

        let Some(extension) = path.extension() else {
            tracing::debug!("Skipping {} without extension", path);
            continue;
        };
        let kind = if PICKLE_EXTENSIONS.contains(&extension) {
            let stem = path.file_stem().unwrap_or(extension);
            stem.rsplit('_').next().unwrap_or(stem).to_string()
        } else {
            extension.to_string()
        };
        files.insert(kind, path);
    }

    tracing::debug!("Job {}: found {} file(s)", tag, files.len());
    Ok(files)
}

/// Files of the job named by `job_task` (`"<job>"` or `"<job>_<task>"`).
///
/// A bare job id is looked up as task 0, which is how submitit names the
/// logs of non-array jobs.
pub fn job_file_paths(layout: &Layout, job_task: &str) -> Result<JobFiles, LocateError> {
    let job: JobTaskId = job_task.parse()?;
    find_job_files(&layout.experiments_root(), job.with_default_task(0))
}

/// Path of one kind of file for `job_task`.
pub fn job_file_path(
    layout: &Layout,
    job_task: &str,
    kind: &str,
) -> Result<Utf8PathBuf, LocateError> {
    job_file_paths(layout, job_task)?
        .get(kind)
        .map(Utf8Path::to_path_buf)
        .ok_or_else(|| LocateError::MissingFile {
            job: job_task.to_string(),
            kind: kind.to_string(),
        })
}
