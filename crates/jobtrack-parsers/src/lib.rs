//! Shared parsing utilities for job identifiers and scheduler output.
//!
//! Used by jobtrack-slurm for queue listings and by jobtrack-core for
//! log file names and tracker rows.

pub mod command;
pub mod job_id;

pub use command::{CommandError, run_command};
pub use job_id::{JobIdError, JobTaskId, job_id_prefix};

/// Split a delimited line into exactly `fields` columns.
///
/// The last column keeps any further delimiters, so free-text trailing
/// fields survive intact.
pub fn split_fields(line: &str, delimiter: char, fields: usize) -> Result<Vec<&str>, String> {
    let parts: Vec<&str> = line.splitn(fields, delimiter).collect();
    if parts.len() < fields {
        return Err(format!(
            "Expected {} fields, got {}: {}",
            fields,
            parts.len(),
            line
        ));
    }
    Ok(parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_fields() {
        let line = "a\tb\tc";
        assert_eq!(split_fields(line, '\t', 3).unwrap(), vec!["a", "b", "c"]);
        assert!(split_fields(line, '\t', 4).is_err());
    }

    #[test]
    fn test_split_fields_keeps_trailing_delimiters() {
        let line = "2024-01-01\t12_0\tsweep lr\t0.1";
        assert_eq!(
            split_fields(line, '\t', 3).unwrap(),
            vec!["2024-01-01", "12_0", "sweep lr\t0.1"]
        );
    }
}
