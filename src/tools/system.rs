//! Runner that spawns real subprocesses.

use super::{CommandRunner, OutputMode, ToolCommand, ToolOutput};
use crate::error::{Result, ToolError};
use std::process::Stdio;

/// Spawns commands with `tokio::process` and waits for each to finish
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    /// Create a runner
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemRunner {
    async fn run(&self, command: &ToolCommand) -> Result<ToolOutput> {
        log::debug!("{}", command);

        // Resolve the program first so a missing tool is reported as such
        // instead of as a generic spawn failure.
        let program = match command.working_dir() {
            Some(dir) => which::which_in(command.program(), std::env::var_os("PATH"), dir),
            None => which::which(command.program()),
        }
        .map_err(|_| ToolError::NotFound {
            program: command.program().to_string(),
        })?;

        let mut process = tokio::process::Command::new(&program);
        process.args(command.arguments());
        if let Some(dir) = command.working_dir() {
            process.current_dir(dir);
        }

        // ssh/scp may ask for a password on the terminal
        process.stdin(Stdio::inherit());
        match command.mode() {
            OutputMode::Capture => {
                process.stdout(Stdio::piped()).stderr(Stdio::piped());
            }
            OutputMode::Inherit => {
                process.stdout(Stdio::inherit()).stderr(Stdio::inherit());
            }
            OutputMode::Discard => {
                process.stdout(Stdio::null()).stderr(Stdio::piped());
            }
        }

        let output = process
            .output()
            .await
            .map_err(|source| ToolError::SpawnFailed {
                command: command.to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(ToolError::ExitStatus {
                command: command.to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            }
            .into());
        }

        Ok(ToolOutput::captured(String::from_utf8_lossy(&output.stdout)))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::error::ReleaseError;

    #[tokio::test]
    async fn test_captures_stdout() {
        let output = SystemRunner::new()
            .run(&ToolCommand::new("echo").arg("Framework version: 3.1.0").capture())
            .await
            .unwrap();
        assert_eq!(output.stdout, "Framework version: 3.1.0\n");
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_an_error() {
        let err = SystemRunner::new()
            .run(&ToolCommand::new("false"))
            .await
            .unwrap_err();
        assert!(matches!(err, ReleaseError::Tool(ToolError::ExitStatus { .. })));
    }

    #[tokio::test]
    async fn test_missing_program_is_reported() {
        let err = SystemRunner::new()
            .run(&ToolCommand::new("epicsqt-no-such-tool"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ReleaseError::Tool(ToolError::NotFound { ref program })
                if program == "epicsqt-no-such-tool"
        ));
    }
}
