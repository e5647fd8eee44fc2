//! External command execution for scheduler queries.

use thiserror::Error;
use tokio::process::Command;

/// Error type for command execution.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Failed to execute {command}: {error}")]
    Execution { command: String, error: String },
    #[error("Command {command} failed: {stderr}")]
    Failed { command: String, stderr: String },
}

/// Run `program args...` and return stdout.
///
/// A non-zero exit status is an error carrying the command's stderr.
pub async fn run_command(program: &str, args: &[&str]) -> Result<String, CommandError> {
    tracing::debug!("Running {} {}", program, args.join(" "));

    let output = Command::new(program)
        .args(args)
        .output()
        .await
        .map_err(|e| CommandError::Execution {
            command: program.to_string(),
            error: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(CommandError::Failed {
            command: program.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
