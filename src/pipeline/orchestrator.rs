//! Runs a release plan step by step.

use super::context::ReleaseState;
use super::plan::{ReleaseMode, Step, plan};
use crate::cli::{OutputManager, Prompter};
use crate::config::ReleaseConfig;
use crate::error::Result;
use crate::tools::CommandRunner;
use std::path::PathBuf;

/// What a step asks the orchestrator to do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Go on with the next step
    Continue,
    /// The operator answered no at a gate
    Declined,
}

/// How a release run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Every applicable step ran
    Completed {
        /// Steps that ran, in order
        steps: Vec<Step>,
        /// Released version; `None` when only a tag was created
        version: Option<String>,
        /// Source archive that was built
        archive: Option<PathBuf>,
    },
    /// The operator declined at a gate
    Declined {
        /// Step whose gate was declined
        at: Step,
        /// Steps completed before it
        steps: Vec<Step>,
    },
}

/// Drives the release plan for one mode
pub struct Orchestrator<'a, R, P> {
    pub(super) config: &'a ReleaseConfig,
    pub(super) runner: &'a R,
    pub(super) prompter: &'a mut P,
    pub(super) output: &'a OutputManager,
    pub(super) mode: ReleaseMode,
    pub(super) state: ReleaseState,
}

impl<'a, R: CommandRunner, P: Prompter> Orchestrator<'a, R, P> {
    /// Prepare a release run
    pub fn new(
        config: &'a ReleaseConfig,
        runner: &'a R,
        prompter: &'a mut P,
        output: &'a OutputManager,
        mode: ReleaseMode,
    ) -> Self {
        Self {
            config,
            runner,
            prompter,
            output,
            mode,
            state: ReleaseState::new(config.remote_user.clone()),
        }
    }

    /// Run every applicable step in order.
    ///
    /// The first failing step ends the run with its error wrapped in the
    /// step's failure message. Later steps never run.
    pub async fn run(mut self) -> Result<Outcome> {
        let steps = plan(&self.mode);
        let mut completed = Vec::with_capacity(steps.len());

        for (index, &step) in steps.iter().enumerate() {
            if !step.applies(&self.mode, &self.state) {
                log::debug!("Skipping step {} ({})", index + 1, step.name());
                continue;
            }

            log::info!("Step {}/{}: {}", index + 1, steps.len(), step.name());
            let flow = self
                .execute(step)
                .await
                .map_err(|e| e.in_step(step.name(), step.failure_message()))?;

            match flow {
                Flow::Continue => completed.push(step),
                Flow::Declined => {
                    return Ok(Outcome::Declined {
                        at: step,
                        steps: completed,
                    });
                }
            }
        }

        Ok(Outcome::Completed {
            steps: completed,
            version: self.state.new_version,
            archive: self.state.archive,
        })
    }

    /// Ask to proceed; no stops the release
    pub(super) fn gate(&mut self) -> Result<Flow> {
        if self.prompter.confirm(crate::cli::PROCEED_PROMPT)? {
            self.output.println("");
            Ok(Flow::Continue)
        } else {
            Ok(Flow::Declined)
        }
    }
}
