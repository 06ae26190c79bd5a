//! Values produced by steps and consumed by later ones.

use crate::error::{ReleaseError, Result};
use crate::publish::RemoteSession;
use crate::stage::TreeLayout;
use std::path::{Path, PathBuf};

/// How a `TAG=<name>` release proceeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagTarget {
    /// The tag exists and is released like trunk
    Existing,
    /// The tag is created from another path and only archived
    Create,
}

/// State accumulated while the plan runs
#[derive(Debug, Default)]
pub struct ReleaseState {
    /// Local checkout root
    pub root: Option<PathBuf>,
    /// Decision for tag mode
    pub tag_target: Option<TagTarget>,
    /// Path copied into a newly created tag
    pub tag_source: Option<String>,
    /// Names in the repository `tags` directory
    pub tags: Vec<String>,
    /// Version being released
    pub new_version: Option<String>,
    /// Previous release tag
    pub last_version: Option<String>,
    /// Revision at which the previous release was tagged
    pub boundary: Option<u64>,
    /// Log since the previous release
    pub change_log: Option<String>,
    /// Lines of the notes buffer
    pub notes: Vec<String>,
    /// Staged copy of the release source
    pub stage: Option<TreeLayout>,
    /// Tag that was exported and archived
    pub release_tag: Option<String>,
    /// Source archive
    pub archive: Option<PathBuf>,
    /// Remote shell shared by all uploads
    pub session: RemoteSession,
}

fn required<'a, T: ?Sized>(value: Option<&'a T>, what: &'static str) -> Result<&'a T> {
    value.ok_or(ReleaseError::MissingState { what })
}

impl ReleaseState {
    /// Fresh state; `remote_user` seeds the upload session
    pub fn new(remote_user: Option<String>) -> Self {
        Self {
            session: RemoteSession::new(remote_user),
            ..Self::default()
        }
    }

    /// Checkout root
    pub fn root(&self) -> Result<&Path> {
        required(self.root.as_deref(), "the repository root")
    }

    /// Version being released
    pub fn new_version(&self) -> Result<&str> {
        required(self.new_version.as_deref(), "the new release version")
    }

    /// Previous release tag
    pub fn last_version(&self) -> Result<&str> {
        required(self.last_version.as_deref(), "the last release version")
    }

    /// Staged tree
    pub fn stage(&self) -> Result<&TreeLayout> {
        required(self.stage.as_ref(), "the staged tree")
    }

    /// Source archive
    pub fn archive(&self) -> Result<&Path> {
        required(self.archive.as_deref(), "the source archive")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_values_are_typed_errors() {
        let state = ReleaseState::new(None);
        assert!(matches!(
            state.new_version(),
            Err(ReleaseError::MissingState { what: "the new release version" })
        ));
        assert!(state.root().is_err());
        assert!(!state.session.is_established());
    }
}
