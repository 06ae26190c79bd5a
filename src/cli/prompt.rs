//! Blocking operator prompts.

use crate::error::{ReleaseError, Result};
use std::io::{BufRead, Write};

/// Question shown at every confirmation gate
pub const PROCEED_PROMPT: &str = "Proceed (y/n): ";

/// Source of operator answers
pub trait Prompter {
    /// Show `prompt` and read one line without its terminator.
    ///
    /// Returns `None` when input is closed.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;

    /// Read a line; closed input counts as an interruption
    fn ask(&mut self, prompt: &str) -> Result<String> {
        self.read_line(prompt)?.ok_or(ReleaseError::Interrupted)
    }

    /// Ask until the answer is yes or no
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        loop {
            let answer = self.ask(prompt)?;
            match answer.trim().to_ascii_lowercase().as_str() {
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => continue,
            }
        }
    }
}

/// Prompts on the controlling terminal
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl TerminalPrompter {
    /// Create a terminal prompter
    pub fn new() -> Self {
        Self
    }
}

impl Prompter for TerminalPrompter {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        let mut stdout = std::io::stdout();
        write!(stdout, "{}", prompt)?;
        stdout.flush()?;

        let mut input = String::new();
        if std::io::stdin().lock().read_line(&mut input)? == 0 {
            return Ok(None);
        }
        Ok(Some(strip_line_ending(&input).to_string()))
    }
}

fn strip_line_ending(line: &str) -> &str {
    line.strip_suffix('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .unwrap_or(line)
}
