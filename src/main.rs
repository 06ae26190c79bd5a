//! EPICS Qt Release - interactive release driver for the EPICS Qt framework.

use epicsqt_release::cli;
use epicsqt_release::cli::OutputManager;
use std::process;

#[tokio::main]
async fn main() {
    env_logger::init();

    match cli::run().await {
        Ok(exit_code) => {
            process::exit(exit_code);
        }
        Err(e) if e.is_user_abort() => {
            let output = OutputManager::new();
            output.println("");
            output.warn(&e.to_string());
            process::exit(e.exit_code());
        }
        Err(e) => {
            let output = OutputManager::new();
            output.error(&e.to_string());

            // Show recovery suggestions for critical errors
            let suggestions = e.recovery_suggestions();
            if !suggestions.is_empty() {
                output.println("\n💡 Recovery suggestions:");
                for suggestion in suggestions {
                    output.indent(&suggestion);
                }
            }

            process::exit(e.exit_code());
        }
    }
}
