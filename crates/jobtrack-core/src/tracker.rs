//! Experiment tracker files.
//!
//! A tracker is a headerless, tab-delimited file appended to by the
//! submission helper, one row per submitted job:
//!
//! ```text
//! 2024-01-15 10:30:00.123456<TAB>12345_0<TAB>lr=0.1 warmup sweep
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use chrono::NaiveDateTime;
use jobtrack_parsers::{job_id_prefix, split_fields};
use serde::Serialize;
use std::fs;
use thiserror::Error;

/// Timestamp layouts seen in tracker files.
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{path}:{line}: {message}")]
    Parse {
        path: Utf8PathBuf,
        line: usize,
        message: String,
    },
}

/// One submission recorded in a tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackerRecord {
    /// Numeric job id, taken from the composite id
    pub job: u64,
    /// Timestamp column as written
    pub timestamp: String,
    /// Parsed timestamp, when it matches a known layout
    pub submitted_at: Option<NaiveDateTime>,
    /// Composite `<job>_<task>` id
    pub job_task: String,
    /// Free-text job description
    pub description: String,
}

impl TrackerRecord {
    /// Parse one tab-delimited tracker row.
    pub fn parse_line(line: &str) -> Result<Self, String> {
        let fields = split_fields(line, '\t', 3)?;
        let timestamp = fields[0].trim();
        let job_task = fields[1].trim();
        let job = job_id_prefix(job_task)
            .parse::<u64>()
            .map_err(|_| format!("Invalid job id {:?}", job_task))?;

        Ok(Self {
            job,
            timestamp: timestamp.to_string(),
            submitted_at: parse_timestamp(timestamp),
            job_task: job_task.to_string(),
            description: fields[2].trim_end_matches(['\r', '\n']).to_string(),
        })
    }
}

fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
}

/// Parse tracker content read from `path`. Blank lines are skipped.
pub fn parse_tracker(content: &str, path: &Utf8Path) -> Result<Vec<TrackerRecord>, TrackerError> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            TrackerRecord::parse_line(line).map_err(|message| TrackerError::Parse {
                path: path.to_path_buf(),
                line: i + 1,
                message,
            })
        })
        .collect()
}

/// Load a single tracker file.
pub fn load_tracker_file(path: &Utf8Path) -> Result<Vec<TrackerRecord>, TrackerError> {
    let content = fs::read_to_string(path)?;
    parse_tracker(&content, path)
}

/// Tracker files in `tracking_dir`: `<experiment>.csv` when named,
/// otherwise every `*.csv`, sorted by file name.
pub fn tracker_files(
    tracking_dir: &Utf8Path,
    experiment: Option<&str>,
) -> Result<Vec<Utf8PathBuf>, TrackerError> {
    if let Some(name) = experiment {
        let path = tracking_dir.join(format!("{}.csv", name));
        return Ok(if path.is_file() { vec![path] } else { vec![] });
    }

    if !tracking_dir.is_dir() {
        return Ok(vec![]);
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(tracking_dir)? {
        let entry = entry?;
        let Ok(path) = Utf8PathBuf::try_from(entry.path()) else {
            continue;
        };
        if path.is_file() && path.extension() == Some("csv") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Load and concatenate the trackers of one experiment, or of all of them.
pub fn load_job_trackers(
    tracking_dir: &Utf8Path,
    experiment: Option<&str>,
) -> Result<Vec<TrackerRecord>, TrackerError> {
    let files = tracker_files(tracking_dir, experiment)?;
    if files.is_empty() {
        tracing::warn!("No tracker files found in {}", tracking_dir);
    }

    let mut records = Vec::new();
    for path in files {
        let loaded = load_tracker_file(&path)?;
        tracing::debug!("Loaded {} tracker row(s) from {}", loaded.len(), path);
        records.extend(loaded);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use tempfile::TempDir;

    fn temp_dir() -> (TempDir, Utf8PathBuf) {
        let temp = TempDir::new().unwrap();
        let dir = Utf8Path::from_path(temp.path()).unwrap().to_path_buf();
        (temp, dir)
    }

    #[test]
    fn test_parse_line() {
        let record =
            TrackerRecord::parse_line("2024-01-15 10:30:00.123456\t12345_3\tlr=0.1 warmup sweep")
                .unwrap();
        assert_eq!(record.job, 12345);
        assert_eq!(record.job_task, "12345_3");
        assert_eq!(record.description, "lr=0.1 warmup sweep");

        let at = record.submitted_at.unwrap();
        assert_eq!((at.year(), at.month(), at.day()), (2024, 1, 15));
        assert_eq!((at.hour(), at.minute()), (10, 30));
    }

    #[test]
    fn test_parse_line_bare_job_and_odd_timestamp() {
        let record = TrackerRecord::parse_line("yesterday\t42\tbaseline").unwrap();
        assert_eq!(record.job, 42);
        assert_eq!(record.timestamp, "yesterday");
        assert!(record.submitted_at.is_none());
    }

    #[test]
    fn test_parse_line_errors() {
        assert!(TrackerRecord::parse_line("2024-01-15\t12345_0").is_err());
        assert!(TrackerRecord::parse_line("2024-01-15\tabc_0\tdesc").is_err());
    }

    #[test]
    fn test_round_trip() {
        let (_temp, dir) = temp_dir();
        let path = dir.join("lr_sweep.csv");
        let rows: Vec<String> = (0..5)
            .map(|i| format!("2024-01-15 10:3{}:00\t{}_{}\trun {}", i, 1000 + i, i, i))
            .collect();
        fs::write(&path, rows.join("\n") + "\n").unwrap();

        let records = load_tracker_file(&path).unwrap();
        assert_eq!(records.len(), 5);
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.job, 1000 + i as u64);
            assert_eq!(record.description, format!("run {}", i));
        }
    }

    #[test]
    fn test_parse_error_names_line() {
        let (_temp, dir) = temp_dir();
        let path = dir.join("bad.csv");
        fs::write(&path, "2024-01-15\t1_0\tok\n\nbroken row\n").unwrap();

        match load_tracker_file(&path) {
            Err(TrackerError::Parse { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_job_trackers_all_and_named() {
        let (_temp, dir) = temp_dir();
        fs::write(dir.join("b.csv"), "t\t2_0\tsecond\n").unwrap();
        fs::write(dir.join("a.csv"), "t\t1_0\tfirst\nt\t1_1\tfirst again\n").unwrap();
        fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let all = load_job_trackers(&dir, None).unwrap();
        let jobs: Vec<u64> = all.iter().map(|r| r.job).collect();
        assert_eq!(jobs, vec![1, 1, 2]);

        let named = load_job_trackers(&dir, Some("b")).unwrap();
        assert_eq!(named.len(), 1);
        assert_eq!(named[0].description, "second");

        assert!(load_job_trackers(&dir, Some("missing")).unwrap().is_empty());
    }

    #[test]
    fn test_load_job_trackers_missing_dir() {
        let (_temp, dir) = temp_dir();
        assert!(load_job_trackers(&dir.join("nope"), None).unwrap().is_empty());
    }
}
