//! Command line interface for epicsqt_release.
//!
//! Wires the configuration, the system command runner and the terminal
//! prompter into the release pipeline and turns its outcome into an exit code.

mod args;
mod output;
mod prompt;

pub use args::Args;
pub use output::OutputManager;
pub use prompt::{PROCEED_PROMPT, Prompter, TerminalPrompter};

use crate::config::ReleaseConfig;
use crate::error::{ReleaseError, Result};
use crate::pipeline::{Orchestrator, Outcome};
use crate::tools::SystemRunner;

/// Reminder printed after a successful release
pub const NEXT_CYCLE_REMINDER: &str = "Please do not forget to update the MAJOR, MINOR, RELEASE and the QE_VERSION_STAGE definitions in file 'QEFrameworkVersion.h' since a new cycle of development has started.";

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    watch_for_interrupt()?;

    let config = ReleaseConfig::load()?;
    let runner = SystemRunner::new();
    let mut prompter = TerminalPrompter::new();
    let output = OutputManager::new();

    let outcome = Orchestrator::new(&config, &runner, &mut prompter, &output, args.mode())
        .run()
        .await?;

    Ok(report(&output, &outcome))
}

/// Print the closing messages for `outcome` and return the exit code
pub fn report(output: &OutputManager, outcome: &Outcome) -> i32 {
    match outcome {
        Outcome::Completed { version, .. } => {
            // Creating a tag alone does not start a development cycle
            if version.is_some() {
                output.println("");
                output.warn(NEXT_CYCLE_REMINDER);
            }
            output.println("");
            output.success("Release done!");
            0
        }
        Outcome::Declined { at, .. } => {
            log::info!("Declined at step '{}'", at.name());
            output.println("");
            output.warn(&ReleaseError::Interrupted.to_string());
            0
        }
    }
}

/// Treat Ctrl-C as an operator abort: message and exit status 0.
///
/// Prompts block on stdin, so the handler exits the process itself.
fn watch_for_interrupt() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        let mut interrupt = signal(SignalKind::interrupt())?;
        tokio::spawn(async move {
            if interrupt.recv().await.is_some() {
                abort_by_user();
            }
        });
    }

    #[cfg(not(unix))]
    tokio::spawn(async {
        if tokio::signal::ctrl_c().await.is_ok() {
            abort_by_user();
        }
    });

    Ok(())
}

fn abort_by_user() -> ! {
    let output = OutputManager::new();
    output.println("");
    output.warn(&ReleaseError::Interrupted.to_string());
    std::process::exit(0);
}
