//! # EPICS Qt Release
//!
//! Interactive release driver for the EPICS Qt framework.
//!
//! The release reads the new version from the built framework, gathers the
//! Subversion log since the previous tag, regenerates the documentation in a
//! staged copy, commits and tags the release, and publishes the source
//! archive, documentation and platform package to the download area.
//!
//! ## Usage
//!
//! ```bash
//! epicsqt_release              # Release trunk
//! epicsqt_release TAG=3.1.0    # Release (or create) tags/3.1.0
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod cli;
pub mod config;
pub mod docs;
pub mod error;
pub mod notes;
pub mod package;
pub mod pipeline;
pub mod publish;
pub mod stage;
pub mod svn;
pub mod tools;
pub mod version;

// Re-export main types for public API
pub use cli::{Args, OutputManager, Prompter};
pub use config::ReleaseConfig;
pub use error::{ReleaseError, Result};
pub use pipeline::{Orchestrator, Outcome, ReleaseMode, Step};
pub use tools::{CommandRunner, SystemRunner, ToolCommand, ToolOutput};
