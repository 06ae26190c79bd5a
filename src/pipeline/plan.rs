//! Ordered release steps.

use super::context::{ReleaseState, TagTarget};

/// What is being released
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseMode {
    /// Release the current trunk
    Trunk,
    /// Release the named tag, creating it first if it does not exist
    Tag(String),
}

impl ReleaseMode {
    /// Repository path the release is built from
    pub fn source_path(&self) -> String {
        match self {
            ReleaseMode::Trunk => "trunk".to_string(),
            ReleaseMode::Tag(name) => format!("tags/{}", name),
        }
    }
}

/// One step of the release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Warn the operator and ask to proceed
    ConfirmIntent,
    /// Find the local checkout root
    LocateRepository,
    /// Decide whether the requested tag is released or created
    ResolveTagTarget,
    /// Ask which path the new tag is copied from
    SelectTagSource,
    /// Copy the chosen source to the new tag
    CreateTag,
    /// Read the new version from `qegui -v`
    ResolveNewVersion,
    /// Find the previous release in the tag listing
    ResolveLastVersion,
    /// Find the revision of the previous release
    ResolveRevisionBoundary,
    /// Fetch and show the log since the previous release
    FetchChangeLog,
    /// Ask for the release summary
    CollectSummary,
    /// Join summary and log into the notes buffer
    MergeChangeLog,
    /// Copy the working tree without version control metadata
    StageWorkingCopy,
    /// Prepend the notes buffer to the release notes
    UpdateReleaseNotes,
    /// Write the version into the Doxygen configuration
    PatchDocVersion,
    /// Generate HTML documentation and the reference manual
    GenerateDocumentation,
    /// Let the operator check the documentation
    VerifyDocumentation,
    /// Commit the release artifacts
    Commit,
    /// Tag the release
    Tag,
    /// Export the tag and build the source archive
    Package,
    /// Upload the source archive
    PublishArchive,
    /// Upload release notes and reference manual
    PublishDocumentation,
    /// Build and upload the platform package
    PublishPackage,
}

const TRUNK_PLAN: &[Step] = &[
    Step::ConfirmIntent,
    Step::LocateRepository,
    Step::ResolveNewVersion,
    Step::ResolveLastVersion,
    Step::ResolveRevisionBoundary,
    Step::FetchChangeLog,
    Step::CollectSummary,
    Step::MergeChangeLog,
    Step::StageWorkingCopy,
    Step::UpdateReleaseNotes,
    Step::PatchDocVersion,
    Step::GenerateDocumentation,
    Step::VerifyDocumentation,
    Step::Commit,
    Step::Tag,
    Step::Package,
    Step::PublishArchive,
    Step::PublishDocumentation,
    Step::PublishPackage,
];

const TAG_PLAN: &[Step] = &[
    Step::ConfirmIntent,
    Step::LocateRepository,
    Step::ResolveTagTarget,
    Step::SelectTagSource,
    Step::CreateTag,
    Step::ResolveNewVersion,
    Step::ResolveLastVersion,
    Step::ResolveRevisionBoundary,
    Step::FetchChangeLog,
    Step::CollectSummary,
    Step::MergeChangeLog,
    Step::StageWorkingCopy,
    Step::UpdateReleaseNotes,
    Step::PatchDocVersion,
    Step::GenerateDocumentation,
    Step::VerifyDocumentation,
    Step::Commit,
    Step::Tag,
    Step::Package,
    Step::PublishArchive,
    Step::PublishDocumentation,
    Step::PublishPackage,
];

/// Steps for `mode`, in execution order
pub fn plan(mode: &ReleaseMode) -> &'static [Step] {
    match mode {
        ReleaseMode::Trunk => TRUNK_PLAN,
        ReleaseMode::Tag(_) => TAG_PLAN,
    }
}

impl Step {
    /// Short name used in logs and error reports
    pub fn name(self) -> &'static str {
        match self {
            Step::ConfirmIntent => "confirm",
            Step::LocateRepository => "locate-repository",
            Step::ResolveTagTarget => "resolve-tag-target",
            Step::SelectTagSource => "select-tag-source",
            Step::CreateTag => "create-tag",
            Step::ResolveNewVersion => "resolve-new-version",
            Step::ResolveLastVersion => "resolve-last-version",
            Step::ResolveRevisionBoundary => "resolve-revision-boundary",
            Step::FetchChangeLog => "fetch-change-log",
            Step::CollectSummary => "collect-summary",
            Step::MergeChangeLog => "merge-change-log",
            Step::StageWorkingCopy => "stage",
            Step::UpdateReleaseNotes => "update-release-notes",
            Step::PatchDocVersion => "patch-doc-version",
            Step::GenerateDocumentation => "generate-documentation",
            Step::VerifyDocumentation => "verify-documentation",
            Step::Commit => "commit",
            Step::Tag => "tag",
            Step::Package => "package",
            Step::PublishArchive => "publish-archive",
            Step::PublishDocumentation => "publish-documentation",
            Step::PublishPackage => "publish-package",
        }
    }

    /// Message reported when the step fails
    pub fn failure_message(self) -> &'static str {
        match self {
            Step::ConfirmIntent => "Error when asking for confirmation",
            Step::LocateRepository => "Error when locating the repository checkout",
            Step::ResolveTagTarget => "Error when listing the tags in the repository",
            Step::SelectTagSource => "Error when reading the source of the new tag",
            Step::CreateTag => "Error when creating the tag in the repository",
            Step::ResolveNewVersion => "Error when retrieving new release version",
            Step::ResolveLastVersion => "Error when retrieving last release version",
            Step::ResolveRevisionBoundary => "Error when retrieving revision of last release",
            Step::FetchChangeLog => "Error when retrieving log entries",
            Step::CollectSummary => "Error when reading the release summary",
            Step::MergeChangeLog => "Error when merging summary and log entries",
            Step::StageWorkingCopy => "Error when copying the working tree",
            Step::UpdateReleaseNotes => "Error when updating the release notes",
            Step::PatchDocVersion => "Error when updating the version of the documentation",
            Step::GenerateDocumentation => "Error when generating the documentation",
            Step::VerifyDocumentation => "Error when asking for confirmation",
            Step::Commit => "Error when committing changes into the repository",
            Step::Tag => "Error when tagging the release",
            Step::Package => "Error when creating the source archive",
            Step::PublishArchive => "Error when uploading the source archive",
            Step::PublishDocumentation => "Error when uploading the documentation",
            Step::PublishPackage => "Error when building or uploading the package",
        }
    }

    /// Whether the step runs given what earlier steps decided
    pub fn applies(self, mode: &ReleaseMode, state: &ReleaseState) -> bool {
        let creating = state.tag_target == Some(TagTarget::Create);
        match self {
            Step::ResolveTagTarget => matches!(mode, ReleaseMode::Tag(_)),
            Step::SelectTagSource | Step::CreateTag => creating,
            Step::ConfirmIntent
            | Step::LocateRepository
            | Step::Package
            | Step::PublishArchive => true,
            Step::Tag => match mode {
                // An existing tag named after the version is already the release tag
                ReleaseMode::Tag(name) => {
                    !creating && state.new_version.as_deref() != Some(name.as_str())
                }
                ReleaseMode::Trunk => true,
            },
            _ => !creating,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trunk_plan_order() {
        let names: Vec<&str> = plan(&ReleaseMode::Trunk).iter().map(|s| s.name()).collect();
        assert_eq!(names.first(), Some(&"confirm"));
        assert_eq!(names.last(), Some(&"publish-package"));
        let commit = names.iter().position(|n| *n == "commit").unwrap();
        let tag = names.iter().position(|n| *n == "tag").unwrap();
        let package = names.iter().position(|n| *n == "package").unwrap();
        assert!(commit < tag && tag < package);
        assert!(!names.contains(&"create-tag"));
    }

    #[test]
    fn test_step_names_are_unique() {
        let steps = plan(&ReleaseMode::Tag("x".to_string()));
        let mut names: Vec<&str> = steps.iter().map(|s| s.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), steps.len());
    }

    #[test]
    fn test_create_mode_skips_release_steps() {
        let mode = ReleaseMode::Tag("3.1.0-rc1".to_string());
        let state = ReleaseState {
            tag_target: Some(TagTarget::Create),
            ..ReleaseState::default()
        };
        let run: Vec<&str> = plan(&mode)
            .iter()
            .filter(|s| s.applies(&mode, &state))
            .map(|s| s.name())
            .collect();
        assert_eq!(
            run,
            [
                "confirm",
                "locate-repository",
                "resolve-tag-target",
                "select-tag-source",
                "create-tag",
                "package",
                "publish-archive"
            ]
        );
    }

    #[test]
    fn test_existing_version_tag_is_not_tagged_again() {
        let mode = ReleaseMode::Tag("3.1.0".to_string());
        let mut state = ReleaseState {
            tag_target: Some(TagTarget::Existing),
            new_version: Some("3.1.0".to_string()),
            ..ReleaseState::default()
        };
        assert!(!Step::Tag.applies(&mode, &state));
        assert!(Step::Commit.applies(&mode, &state));

        state.new_version = Some("3.1.1".to_string());
        assert!(Step::Tag.applies(&mode, &state));
    }

    #[test]
    fn test_source_path() {
        assert_eq!(ReleaseMode::Trunk.source_path(), "trunk");
        assert_eq!(ReleaseMode::Tag("3.1.0".to_string()).source_path(), "tags/3.1.0");
    }
}
