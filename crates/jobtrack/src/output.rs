//! Table and JSON rendering for command output.

use jobtrack_core::{JobFiles, TrackerRecord, format_table};
use jobtrack_state::JobStateTable;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).into_diagnostic()?;
    println!("{}", json);
    Ok(())
}

pub fn print_job_states(table: &JobStateTable, json: bool) -> Result<()> {
    if json {
        return print_json(table);
    }
    print!("{}", table);
    Ok(())
}

pub fn print_job_files(files: &JobFiles, json: bool) -> Result<()> {
    if json {
        return print_json(files);
    }
    let rows: Vec<Vec<String>> = files
        .iter()
        .map(|(kind, path)| vec![kind.to_string(), path.to_string()])
        .collect();
    print!("{}", format_table(&["kind", "path"], &rows));
    Ok(())
}

pub fn print_job_ids(ids: &[String], json: bool) -> Result<()> {
    if json {
        return print_json(ids);
    }
    for id in ids {
        println!("{}", id);
    }
    Ok(())
}

pub fn print_tracker(records: &[TrackerRecord], json: bool) -> Result<()> {
    if json {
        return print_json(records);
    }
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| {
            vec![
                r.job.to_string(),
                r.timestamp.clone(),
                r.job_task.clone(),
                r.description.clone(),
            ]
        })
        .collect();
    print!(
        "{}",
        format_table(&["Job", "Timestamp", "Job_Task", "Job Description"], &rows)
    );
    Ok(())
}
