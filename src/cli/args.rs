//! Command line argument parsing and validation.
//!
//! The tool takes no options beyond an optional `TAG=<name>`: without it the
//! release is cut from trunk.

use crate::pipeline::ReleaseMode;
use clap::Parser;

/// Release tool for the EPICS Qt framework
#[derive(Parser, Debug)]
#[command(
    name = "epicsqt_release",
    version,
    about = "Release a new version of the EPICS Qt framework",
    long_about = "Release a new version of the EPICS Qt framework from its Subversion repository.

Usage:
  epicsqt_release              release trunk with the version reported by 'qegui -v'
  epicsqt_release TAG=3.1.0    release the existing tag tags/3.1.0, or create it"
)]
pub struct Args {
    /// Release (or create) a tag instead of trunk
    #[arg(index = 1, value_name = "TAG=<name>", value_parser = parse_tag_argument)]
    pub tag: Option<String>,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Release mode selected by the arguments
    pub fn mode(&self) -> ReleaseMode {
        match &self.tag {
            Some(name) => ReleaseMode::Tag(name.clone()),
            None => ReleaseMode::Trunk,
        }
    }
}

/// Accept `TAG=<name>` where the name is usable as a repository path component
fn parse_tag_argument(raw: &str) -> Result<String, String> {
    let name = raw
        .strip_prefix("TAG=")
        .ok_or_else(|| format!("expected TAG=<name>, got '{}'", raw))?
        .trim();

    if name.is_empty() {
        return Err("the tag name must not be empty".to_string());
    }
    if name.contains('/') || name.chars().any(char::is_whitespace) {
        return Err(format!("'{}' is not a valid tag name", name));
    }
    Ok(name.to_string())
}
