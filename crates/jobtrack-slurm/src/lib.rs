//! SLURM integration for jobtrack.
//!
//! Query the live job queue via squeue.

pub mod squeue;

pub use squeue::{parse_queue_listing, query_queued_job_ids};
