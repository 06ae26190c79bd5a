//! Colored terminal output for release operations
//!
//! Provides consistent, colored CLI output with proper formatting

use std::io::Write;
use termcolor::{BufferWriter, Color, ColorChoice, ColorSpec, WriteColor};

/// Output manager for consistent colored terminal output
#[derive(Debug)]
pub struct OutputManager {
    bufwtr: BufferWriter,
}

impl Clone for OutputManager {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl Default for OutputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputManager {
    /// Create a new output manager writing to stdout
    pub fn new() -> Self {
        Self {
            bufwtr: BufferWriter::stdout(ColorChoice::Auto),
        }
    }

    fn emit(&self, symbol: Option<(&str, ColorSpec)>, message: &str, body: Option<ColorSpec>) {
        let mut buffer = self.bufwtr.buffer();
        if let Some((symbol, spec)) = symbol {
            let _ = buffer.set_color(&spec);
            let _ = write!(&mut buffer, "{}", symbol);
            let _ = buffer.reset();
            let _ = write!(&mut buffer, " ");
        }
        if let Some(spec) = body {
            let _ = buffer.set_color(&spec);
        }
        let _ = writeln!(&mut buffer, "{}", message);
        let _ = buffer.reset();
        let _ = self.bufwtr.print(&buffer);
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        self.emit(
            Some(("ℹ", ColorSpec::new().set_fg(Some(Color::Cyan)).clone())),
            message,
            None,
        );
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        self.emit(
            Some(("✓", ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true).clone())),
            message,
            None,
        );
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) {
        self.emit(
            Some(("⚠", ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true).clone())),
            message,
            Some(ColorSpec::new().set_fg(Some(Color::Yellow)).clone()),
        );
    }

    /// Print an error message to stderr
    pub fn error(&self, message: &str) {
        let bufwtr = BufferWriter::stderr(ColorChoice::Auto);
        let mut buffer = bufwtr.buffer();

        if buffer.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true)).is_err()
            || write!(&mut buffer, "✗").is_err()
            || buffer.reset().is_err()
            || buffer.set_color(ColorSpec::new().set_fg(Some(Color::Red))).is_err()
            || writeln!(&mut buffer, " {}", message).is_err()
            || buffer.reset().is_err()
            || bufwtr.print(&buffer).is_err()
        {
            // Stderr failed - fallback to stdout as last resort
            println!("[STDERR ERROR] ✗ {}", message);
        }
    }

    /// Print a progress message for a running step
    pub fn progress(&self, message: &str) {
        self.emit(
            Some(("⋯", ColorSpec::new().set_fg(Some(Color::Magenta)).clone())),
            message,
            None,
        );
    }

    /// Print a section header
    pub fn section(&self, title: &str) {
        let mut buffer = self.bufwtr.buffer();
        let _ = writeln!(&mut buffer);
        let _ = buffer.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true));
        let _ = writeln!(&mut buffer, "═══ {} ═══", title);
        let _ = buffer.reset();
        let _ = self.bufwtr.print(&buffer);
    }

    /// Print indented text (for sub-items)
    pub fn indent(&self, message: &str) {
        self.emit(None, &format!("    {}", message), None);
    }

    /// Print a plain message
    pub fn println(&self, message: &str) {
        self.emit(None, message, None);
    }

    /// Print a block of text verbatim, e.g. a fetched log
    pub fn block(&self, text: &str) {
        let mut buffer = self.bufwtr.buffer();
        let _ = write!(&mut buffer, "{}", text);
        if !text.is_empty() && !text.ends_with('\n') {
            let _ = writeln!(&mut buffer);
        }
        let _ = self.bufwtr.print(&buffer);
    }
}
