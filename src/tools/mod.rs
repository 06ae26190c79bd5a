//! External tool invocation.
//!
//! Every subprocess the release touches (svn, doxygen, make, ssh, scp and the
//! freshly built qegui) is described by a [`ToolCommand`] and executed through
//! a [`CommandRunner`]. The production runner is [`SystemRunner`]; tests plug in
//! a recording fake.

mod system;

pub use system::SystemRunner;

use crate::error::Result;
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};

/// What happens to a command's standard output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Capture stdout for parsing
    Capture,
    /// Stream output straight to the operator's terminal
    Inherit,
    /// Discard stdout; stderr is kept for failure reports
    Discard,
}

/// A single external command invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    program: String,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
    mode: OutputMode,
}

impl ToolCommand {
    /// Create a command that streams its output to the terminal
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            mode: OutputMode::Inherit,
        }
    }

    /// Append one argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Run the command from `dir`
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Capture stdout instead of streaming it
    pub fn capture(mut self) -> Self {
        self.mode = OutputMode::Capture;
        self
    }

    /// Throw stdout away
    pub fn discard(mut self) -> Self {
        self.mode = OutputMode::Discard;
        self
    }

    /// Program name or path
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments in order
    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// Working directory, if any
    pub fn working_dir(&self) -> Option<&Path> {
        self.current_dir.as_deref()
    }

    /// Output handling
    pub fn mode(&self) -> OutputMode {
        self.mode
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(dir) = &self.current_dir {
            write!(f, "(cd {}) ", dir.display())?;
        }
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Output of a successful command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Captured stdout (empty unless the command was run with [`OutputMode::Capture`])
    pub stdout: String,
}

impl ToolOutput {
    /// Output carrying captured stdout
    pub fn captured(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
        }
    }
}

/// Executes external commands, one at a time
pub trait CommandRunner {
    /// Run `command` to completion.
    ///
    /// A non-zero exit status is an error.
    fn run(&self, command: &ToolCommand) -> impl Future<Output = Result<ToolOutput>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_quotes_messages() {
        let command = ToolCommand::new("svn")
            .args(["commit", "/tmp/epicsqt/trunk", "-m"])
            .arg("Release version 3.1.0");
        assert_eq!(
            command.to_string(),
            "svn commit /tmp/epicsqt/trunk -m \"Release version 3.1.0\""
        );
    }

    #[test]
    fn test_display_shows_working_dir() {
        let command = ToolCommand::new("make")
            .arg("pdf")
            .current_dir("/tmp/epicsqt/trunk/documentation/latex")
            .discard();
        assert_eq!(
            command.to_string(),
            "(cd /tmp/epicsqt/trunk/documentation/latex) make pdf"
        );
        assert_eq!(command.mode(), OutputMode::Discard);
    }
}
