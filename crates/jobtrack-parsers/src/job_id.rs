//! Job identifiers as they appear in log names, queue listings and trackers.
//!
//! A job is a numeric SLURM id, optionally paired with an array task index:
//! `"12345_3"` or bare `"12345"`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JobIdError {
    #[error("Invalid job id: {0:?}")]
    InvalidJob(String),
    #[error("Invalid task id in {0:?}")]
    InvalidTask(String),
}

/// Numeric job id with optional array task index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobTaskId {
    pub job_id: u64,
    pub task_id: Option<u32>,
}

impl JobTaskId {
    pub fn new(job_id: u64, task_id: Option<u32>) -> Self {
        Self { job_id, task_id }
    }

    /// Same job with the task index filled in when absent.
    pub fn with_default_task(self, task_id: u32) -> Self {
        Self {
            job_id: self.job_id,
            task_id: Some(self.task_id.unwrap_or(task_id)),
        }
    }

    /// Tag embedded in log file names: `"<job>_<task>"` or `"<job>"`.
    pub fn tag(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for JobTaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.task_id {
            Some(task) => write!(f, "{}_{}", self.job_id, task),
            None => write!(f, "{}", self.job_id),
        }
    }
}

impl FromStr for JobTaskId {
    type Err = JobIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (job, task) = match s.split_once('_') {
            Some((job, task)) => (job, Some(task)),
            None => (s, None),
        };

        let job_id = job
            .parse::<u64>()
            .map_err(|_| JobIdError::InvalidJob(s.to_string()))?;
        let task_id = task
            .map(|t| t.parse::<u32>())
            .transpose()
            .map_err(|_| JobIdError::InvalidTask(s.to_string()))?;

        Ok(Self { job_id, task_id })
    }
}

/// Job part of a composite id: everything before the first underscore.
///
/// Works on queue tokens that carry non-numeric task ranges such as
/// `"12345_[1-10%2]"`.
pub fn job_id_prefix(s: &str) -> &str {
    s.split('_').next().unwrap_or(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_and_composite() {
        assert_eq!("12345".parse::<JobTaskId>(), Ok(JobTaskId::new(12345, None)));
        assert_eq!("12345_3".parse::<JobTaskId>(), Ok(JobTaskId::new(12345, Some(3))));
        assert_eq!(" 7_0 ".parse::<JobTaskId>(), Ok(JobTaskId::new(7, Some(0))));
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(
            "abc".parse::<JobTaskId>(),
            Err(JobIdError::InvalidJob(_))
        ));
        assert!(matches!(
            "12_x".parse::<JobTaskId>(),
            Err(JobIdError::InvalidTask(_))
        ));
    }

    #[test]
    fn test_tag_and_default_task() {
        let bare = JobTaskId::new(42, None);
        assert_eq!(bare.tag(), "42");
        assert_eq!(bare.with_default_task(0).tag(), "42_0");
        assert_eq!(JobTaskId::new(42, Some(5)).with_default_task(0).tag(), "42_5");
    }

    #[test]
    fn test_job_id_prefix() {
        assert_eq!(job_id_prefix("12345_[1-10%2]"), "12345");
        assert_eq!(job_id_prefix("12345_7"), "12345");
        assert_eq!(job_id_prefix("12345"), "12345");
    }
}
