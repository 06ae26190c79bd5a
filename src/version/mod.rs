//! Release version handling.
//!
//! The new version is read from the output of the freshly built `qegui -v`;
//! the previous one is the greatest tag under a [`TagOrder`].

mod ordering;

pub use ordering::{TagOrder, compare_versions};

use crate::error::ParseError;
use regex::Regex;
use std::sync::LazyLock;

/// Marker preceding the version in `qegui -v` output
pub const FRAMEWORK_VERSION_MARKER: &str = "Framework version:";

static FRAMEWORK_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Framework version:\s*(\S+)").expect("framework version pattern is valid")
});

/// Extract the framework version from a `qegui -v` dump.
///
/// The last line carrying the marker wins; the version is the token right
/// after it, so `"Framework version: 3.1.0 Production"` yields `"3.1.0"`.
pub fn extract_framework_version(output: &str) -> Result<String, ParseError> {
    output
        .lines()
        .rev()
        .find_map(|line| FRAMEWORK_VERSION.captures(line))
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| ParseError::VersionMarkerMissing {
            output: output.to_string(),
        })
}

/// Split a release version into major, minor and release numbers
pub fn parse_release_version(version: &str) -> Result<semver::Version, ParseError> {
    semver::Version::parse(version).map_err(|source| ParseError::InvalidVersion {
        version: version.to_string(),
        source,
    })
}
