//! Query queued and running job ids via squeue.
//!
//! squeue is asked for job id and full job name only:
//!
//! ```text
//! JOBID NAME
//! 12345_3 lr_sweep_warmup
//! 12346 ablation
//! 12347_[4-10%2] lr_sweep_warmup
//! ```
//!
//! Only the job part of the first column is kept.

use jobtrack_parsers::{job_id_prefix, run_command};

/// Job id and untruncated job name; the default layout cuts NAME to 8 chars.
const QUEUE_FORMAT: &str = "%i %j";

/// Extract job ids from squeue output.
///
/// Drops the header row, keeps lines containing `name_filter` when given,
/// and strips any task suffix from the first column.
pub fn parse_queue_listing(stdout: &str, name_filter: Option<&str>) -> Vec<String> {
    stdout
        .lines()
        .skip(1)
        .filter(|line| name_filter.is_none_or(|name| line.contains(name)))
        .filter_map(|line| line.split_whitespace().next())
        .map(|token| job_id_prefix(token).to_string())
        .collect()
}

/// Job ids currently in the queue for `user`, optionally filtered by name.
///
/// `program` is normally `squeue`. Any failure to query the
/// scheduler yields an empty list.
pub async fn query_queued_job_ids(
    program: &str,
    user: &str,
    name_filter: Option<&str>,
) -> Vec<String> {
    match run_command(program, &["-u", user, "-o", QUEUE_FORMAT]).await {
        Ok(stdout) => {
            let ids = parse_queue_listing(&stdout, name_filter);
            tracing::debug!("{} listed {} job(s) for {}", program, ids.len(), user);
            ids
        }
        Err(e) => {
            tracing::warn!("Treating queue as empty: {}", e);
            Vec::new()
        }
    }
}
