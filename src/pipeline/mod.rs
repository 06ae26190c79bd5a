//! The release pipeline.
//!
//! A release is an ordered plan of [`Step`]s. Each step either continues,
//! stops the release at an operator gate, or fails; a failure is reported
//! with the step's message and nothing after it runs.

mod context;
mod orchestrator;
mod plan;
mod steps;

pub use context::{ReleaseState, TagTarget};
pub use orchestrator::{Flow, Orchestrator, Outcome};
pub use plan::{ReleaseMode, Step, plan};
pub use steps::parse_tag_source;
