//! Directory layout written by the submititnow submission helper.
//!
//! ```text
//! <root>/
//!   <experiment>.csv            tracker per experiment (tracking dir)
//!   experiments/
//!     <experiment>/
//!       tracker.csv
//!       submitit_logs/
//!         <job>_<task>_log.out
//!         <job>_<task>_log.err
//!         <job>_<task>_result.pkl
//! ```

use camino::{Utf8Path, Utf8PathBuf};

/// Environment variable overriding the submititnow root.
pub const ROOT_ENV: &str = "SUBMITITNOW_DIR";

const DEFAULT_DIR_NAME: &str = ".submititnow";
const DEFAULT_QUEUE_PROGRAM: &str = "squeue";

/// Resolved locations and the scheduler user to query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    root: Utf8PathBuf,
    tracking_dir: Utf8PathBuf,
    user: String,
    queue_program: String,
}

impl Layout {
    /// Layout rooted at `root`, tracking trackers in the root itself.
    ///
    /// The queue user defaults to `$USER`.
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        let root = root.into();
        Self {
            tracking_dir: root.clone(),
            root,
            user: std::env::var("USER").unwrap_or_default(),
            queue_program: DEFAULT_QUEUE_PROGRAM.to_string(),
        }
    }

    /// Layout rooted at `$SUBMITITNOW_DIR`, falling back to `~/.submititnow`.
    pub fn from_env() -> Self {
        Self::new(default_root())
    }

    pub fn with_tracking_dir(mut self, dir: impl Into<Utf8PathBuf>) -> Self {
        self.tracking_dir = dir.into();
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    /// Program invoked to list the queue (`squeue` unless overridden).
    pub fn with_queue_program(mut self, program: impl Into<String>) -> Self {
        self.queue_program = program.into();
        self
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Directory holding one subdirectory per experiment.
    pub fn experiments_root(&self) -> Utf8PathBuf {
        self.root.join("experiments")
    }

    pub fn tracking_dir(&self) -> &Utf8Path {
        &self.tracking_dir
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn queue_program(&self) -> &str {
        &self.queue_program
    }
}

fn default_root() -> Utf8PathBuf {
    if let Ok(dir) = std::env::var(ROOT_ENV) {
        if !dir.is_empty() {
            return Utf8PathBuf::from(dir);
        }
    }
    match std::env::var("HOME") {
        Ok(home) => Utf8PathBuf::from(home).join(DEFAULT_DIR_NAME),
        Err(_) => Utf8PathBuf::from(DEFAULT_DIR_NAME),
    }
}
