//! Filesystem side of jobtrack.
//!
//! Resolves the submititnow directory layout, locates per-job log files and
//! loads experiment tracker CSVs.

pub mod layout;
pub mod locator;
pub mod table;
pub mod tracker;

pub use layout::{Layout, ROOT_ENV};
pub use locator::{
    ERR, JobFiles, LocateError, OUT, SH, find_job_files, job_file_path, job_file_paths,
    list_files,
};
pub use table::format_table;
pub use tracker::{
    TrackerError, TrackerRecord, load_job_trackers, load_tracker_file, parse_tracker,
    tracker_files,
};
