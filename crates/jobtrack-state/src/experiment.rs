//! Named experiments and their job-state tables.

use crate::classify::{ClassifyError, JobState, load_job_state};
use camino::Utf8PathBuf;
use jobtrack_core::{Layout, TrackerError, TrackerRecord, format_table, load_tracker_file};
use jobtrack_slurm::query_queued_job_ids;
use serde::Serialize;
use std::fmt;

/// One experiment directory under the experiments root.
#[derive(Debug, Clone)]
pub struct Experiment {
    name: String,
    layout: Layout,
}

/// Row of a job-state table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobStateRow {
    pub job_id: String,
    pub state: String,
}

/// Job ids of an experiment with their inferred states.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct JobStateTable {
    pub rows: Vec<JobStateRow>,
}

impl JobStateRow {
    /// Row for `job_id`, labelled `UNKNOWN (<reason>)` when inference failed.
    pub fn from_result(job_id: String, state: Result<JobState, ClassifyError>) -> Self {
        let state = match state {
            Ok(state) => state.to_string(),
            Err(e) => {
                tracing::warn!("Could not infer state of job {}: {}", job_id, e);
                format!("UNKNOWN ({})", e)
            }
        };
        Self { job_id, state }
    }
}

impl fmt::Display for JobStateTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| vec![row.job_id.clone(), row.state.clone()])
            .collect();
        write!(f, "{}", format_table(&["job_id", "state"], &rows))
    }
}

impl Experiment {
    pub fn new(name: impl Into<String>, layout: &Layout) -> Self {
        Self {
            name: name.into(),
            layout: layout.clone(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dir(&self) -> Utf8PathBuf {
        self.layout.experiments_root().join(&self.name)
    }

    pub fn tracker_file(&self) -> Utf8PathBuf {
        self.dir().join("tracker.csv")
    }

    pub fn logs_dir(&self) -> Utf8PathBuf {
        self.dir().join("submitit_logs")
    }

    /// True only when the directory, tracker file and logs directory all exist.
    pub fn exists(&self) -> bool {
        self.dir().is_dir() && self.tracker_file().is_file() && self.logs_dir().is_dir()
    }

    /// Queued job ids whose queue line mentions this experiment.
    pub async fn job_ids(&self) -> Vec<String> {
        query_queued_job_ids(
            self.layout.queue_program(),
            self.layout.user(),
            Some(self.name.as_str()),
        )
        .await
    }

    /// Infer the state of each queued job of this experiment.
    pub async fn job_states(&self) -> Vec<(String, Result<JobState, ClassifyError>)> {
        let mut states = Vec::new();
        for job_id in self.job_ids().await {
            let state = load_job_state(&self.layout, &job_id).await;
            states.push((job_id, state));
        }
        states
    }

    /// Two-column table of job ids and state labels.
    ///
    /// A job whose state cannot be inferred is listed as `UNKNOWN (<reason>)`.
    pub async fn job_states_table(&self) -> JobStateTable {
        let rows = self
            .job_states()
            .await
            .into_iter()
            .map(|(job_id, state)| JobStateRow::from_result(job_id, state))
            .collect();
        JobStateTable { rows }
    }

    /// Print the job-state table to stdout.
    pub async fn show_job_states(&self) {
        print!("{}", self.job_states_table().await);
    }

    /// Rows of this experiment's own `tracker.csv`.
    pub fn load_tracker(&self) -> Result<Vec<TrackerRecord>, TrackerError> {
        load_tracker_file(&self.tracker_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn layout(temp: &TempDir) -> Layout {
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
        Layout::new(root).with_user("alice")
    }

    /// Write an executable stand-in for squeue that prints `listing`.
    fn fake_squeue(temp: &TempDir, listing: &str) -> String {
        let path = temp.path().join("fake_squeue.sh");
        fs::write(&path, format!("#!/bin/sh\ncat <<'LISTING'\n{}LISTING\n", listing)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path.to_str().unwrap().to_string()
    }

    #[test]
    fn test_paths_and_exists() {
        let temp = TempDir::new().unwrap();
        let layout = layout(&temp);
        let exp = Experiment::new("lr_sweep", &layout);

        assert_eq!(exp.name(), "lr_sweep");
        assert_eq!(exp.dir(), layout.experiments_root().join("lr_sweep"));
        assert!(exp.tracker_file().as_str().ends_with("lr_sweep/tracker.csv"));
        assert!(exp.logs_dir().as_str().ends_with("lr_sweep/submitit_logs"));
        assert!(!exp.exists());

        fs::create_dir_all(exp.logs_dir()).unwrap();
        assert!(!exp.exists());

        fs::write(exp.tracker_file(), "").unwrap();
        assert!(exp.exists());
    }

    #[test]
    fn test_load_tracker() {
        let temp = TempDir::new().unwrap();
        let exp = Experiment::new("lr_sweep", &layout(&temp));
        fs::create_dir_all(exp.dir()).unwrap();
        fs::write(
            exp.tracker_file(),
            "2024-01-15 10:30:00\t501_0\tlr=0.1\n2024-01-15 10:31:00\t502_0\tlr=0.01\n",
        )
        .unwrap();

        let records = exp.load_tracker().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].job, 502);
    }

    #[test]
    fn test_row_from_result() {
        let ok = JobStateRow::from_result("1".to_string(), Ok(JobState::Running));
        assert_eq!(ok.state, "RUNNING");

        let err = JobStateRow::from_result(
            "2".to_string(),
            Err(ClassifyError::NoMarkerLines {
                path: "2_0_log.out".to_string(),
            }),
        );
        assert_eq!(err.job_id, "2");
        assert_eq!(err.state, "UNKNOWN (No submitit lines in 2_0_log.out)");
    }

    #[tokio::test]
    async fn test_job_states_table() {
        let temp = TempDir::new().unwrap();
        let listing = "\
 JOBID PARTITION     NAME     USER ST       TIME  NODES NODELIST(REASON)
   501   compute lr_sweep    alice  R      12:01      1 node017
   502   compute lr_sweep    alice PD       0:00      1 (Priority)
   600   compute ablation    alice  R       1:00      1 node018
   503   compute lr_sweep    alice  R       2:00      1 node019
";
        let squeue = fake_squeue(&temp, listing);
        let layout = layout(&temp).with_queue_program(squeue);

        let exp = Experiment::new("lr_sweep", &layout);
        fs::create_dir_all(exp.logs_dir()).unwrap();
        fs::write(
            exp.logs_dir().join("501_0_log.out"),
            "submitit INFO (2024-01-15) - Starting with JobEnvironment()\n",
        )
        .unwrap();
        fs::write(exp.logs_dir().join("501_0_log.err"), "").unwrap();
        fs::write(exp.logs_dir().join("502_submission.sh"), "#!/bin/bash\n").unwrap();
        fs::write(exp.logs_dir().join("503_0_log.out"), "no marker lines\n").unwrap();

        assert_eq!(exp.job_ids().await, vec!["501", "502", "503"]);

        let table = exp.job_states_table().await;
        let states: Vec<(&str, &str)> = table
            .rows
            .iter()
            .map(|r| (r.job_id.as_str(), r.state.as_str()))
            .collect();
        assert_eq!(states[0], ("501", "RUNNING"));
        assert_eq!(states[1], ("502", "PENDING"));
        assert_eq!(states[2].0, "503");
        assert!(states[2].1.starts_with("UNKNOWN ("));

        let rendered = table.to_string();
        assert!(rendered.starts_with("job_id  state\n"));
        assert!(rendered.contains("501     RUNNING\n"));
    }
}
