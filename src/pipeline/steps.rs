//! Step implementations.

use super::context::TagTarget;
use super::orchestrator::{Flow, Orchestrator};
use super::plan::{ReleaseMode, Step};
use crate::cli::Prompter;
use crate::config::QEGUI_PATH;
use crate::docs;
use crate::error::{ErrorExt, ParseError, ReleaseError, Result};
use crate::notes;
use crate::package::{self, PlatformPackage};
use crate::stage::{self, TreeLayout};
use crate::svn::{Subversion, revision_of};
use crate::tools::{CommandRunner, ToolCommand};
use crate::version::extract_framework_version;

const INTENT_WARNING: &str = "You are about to release a new version of the EPICS Qt Framework. Please make sure that you have updated
the MAJOR, MINOR, RELEASE and the QE_VERSION_STAGE definitions in file 'QEFrameworkVersion.h' and compiled
the framework successfully (a build is required as 'qegui' is run to dump the version number later in this
process). Please, DO NOT commit this file if you have changed it (it will be automatically commited later
after tagging is complete).";

const FIRST_SUMMARY_PROMPT: &str = "Summary for this new release   : ";
const NEXT_SUMMARY_PROMPT: &str = "(Press ENTER to finish summary): ";

/// Parse the answer naming the source of a new tag; empty means trunk
pub fn parse_tag_source(answer: &str) -> Option<String> {
    let answer = answer.trim().trim_matches('/');
    if answer.is_empty() || answer == "trunk" {
        return Some("trunk".to_string());
    }
    let (kind, name) = answer.split_once('/')?;
    if matches!(kind, "branches" | "tags") && !name.is_empty() && !name.contains('/') {
        Some(answer.to_string())
    } else {
        None
    }
}

/// Staging directory name for a release source
fn stage_name(mode: &ReleaseMode) -> String {
    match mode {
        ReleaseMode::Trunk => "trunk".to_string(),
        // `tags/<version>` under the temp directory is taken by the export
        ReleaseMode::Tag(name) => format!("tag-{}", name),
    }
}

impl<'a, R: CommandRunner, P: Prompter> Orchestrator<'a, R, P> {
    fn svn(&self) -> Subversion<'a, R> {
        Subversion::new(self.runner, &self.config.repository_url)
    }

    fn commit_message(&self) -> Result<String> {
        Ok(format!("Release version {}", self.state.new_version()?))
    }

    pub(super) async fn execute(&mut self, step: Step) -> Result<Flow> {
        match step {
            Step::ConfirmIntent => self.confirm_intent(),
            Step::LocateRepository => self.locate_repository(),
            Step::ResolveTagTarget => self.resolve_tag_target().await,
            Step::SelectTagSource => self.select_tag_source(),
            Step::CreateTag => self.create_tag().await,
            Step::ResolveNewVersion => self.resolve_new_version().await,
            Step::ResolveLastVersion => self.resolve_last_version().await,
            Step::ResolveRevisionBoundary => self.resolve_revision_boundary().await,
            Step::FetchChangeLog => self.fetch_change_log().await,
            Step::CollectSummary => self.collect_summary(),
            Step::MergeChangeLog => self.merge_change_log().await,
            Step::StageWorkingCopy => self.stage_working_copy().await,
            Step::UpdateReleaseNotes => self.update_release_notes().await,
            Step::PatchDocVersion => self.patch_doc_version().await,
            Step::GenerateDocumentation => self.generate_documentation().await,
            Step::VerifyDocumentation => self.verify_documentation(),
            Step::Commit => self.commit().await,
            Step::Tag => self.tag().await,
            Step::Package => self.package().await,
            Step::PublishArchive => self.publish_archive().await,
            Step::PublishDocumentation => self.publish_documentation().await,
            Step::PublishPackage => self.publish_package().await,
        }
    }

    fn confirm_intent(&mut self) -> Result<Flow> {
        self.output.println("");
        if let ReleaseMode::Tag(name) = &self.mode {
            self.output.info(&format!("Releasing from tag '{}'.", name));
        }
        self.output.warn(INTENT_WARNING);
        self.output.println("");
        self.gate()
    }

    fn locate_repository(&mut self) -> Result<Flow> {
        let root = self.config.locate_repository_root()?;
        log::info!("Repository checkout at {}", root.display());
        self.state.root = Some(root);
        Ok(Flow::Continue)
    }

    async fn resolve_tag_target(&mut self) -> Result<Flow> {
        let ReleaseMode::Tag(name) = &self.mode else {
            return Ok(Flow::Continue);
        };
        self.output.progress("Retrieving tags from the repository 'tags' directory...");
        let tags = self.svn().list_tags().await?;

        let target = if tags.iter().any(|tag| tag == name) {
            self.output.info(&format!("Tag '{}' exists and will be released.", name));
            TagTarget::Existing
        } else {
            self.output
                .info(&format!("Tag '{}' does not exist and will be created.", name));
            TagTarget::Create
        };
        self.state.tags = tags;
        self.state.tag_target = Some(target);
        Ok(Flow::Continue)
    }

    fn select_tag_source(&mut self) -> Result<Flow> {
        let prompt = format!(
            "Copy tag '{}' from (trunk, branches/<name> or tags/<name>) [trunk]: ",
            self.mode_tag()
        );
        loop {
            let answer = self.prompter.ask(&prompt)?;
            match parse_tag_source(&answer) {
                Some(source) => {
                    self.state.tag_source = Some(source);
                    return Ok(Flow::Continue);
                }
                None => self
                    .output
                    .warn(&format!("'{}' is not a valid source.", answer.trim())),
            }
        }
    }

    async fn create_tag(&mut self) -> Result<Flow> {
        let name = self.mode_tag().to_string();
        let source = self.state.tag_source.clone().unwrap_or_else(|| "trunk".to_string());
        let svn = self.svn();

        self.output.println(&format!(
            "You are about to create tag '{}' from '{}' in the repository '{}'.",
            svn.url_of(&format!("tags/{}", name)),
            svn.url_of(&source),
            svn.url()
        ));
        self.output.println("");
        if self.gate()? == Flow::Declined {
            return Ok(Flow::Declined);
        }

        self.output.progress(&format!("Copying '{}' into tag '{}'...", source, name));
        svn.copy(&source, &format!("tags/{}", name), &format!("Create tag {}", name))
            .await?;
        self.output.success(&format!("Created tag '{}'.", name));
        self.state.release_tag = Some(name);
        Ok(Flow::Continue)
    }

    fn mode_tag(&self) -> &str {
        match &self.mode {
            ReleaseMode::Tag(name) => name,
            ReleaseMode::Trunk => "trunk",
        }
    }

    async fn resolve_new_version(&mut self) -> Result<Flow> {
        let executable = self.state.root()?.join(QEGUI_PATH);
        self.output.progress(&format!(
            "Retrieving new release version by running '{} -v'...",
            executable.display()
        ));

        let output = self
            .runner
            .run(&ToolCommand::new(executable.display().to_string()).arg("-v").capture())
            .await?;
        let version = extract_framework_version(&output.stdout)?;

        self.output.success(&format!("New release version is '{}'.", version));
        self.state.new_version = Some(version);
        Ok(Flow::Continue)
    }

    async fn resolve_last_version(&mut self) -> Result<Flow> {
        self.output
            .progress("Retrieving last release version from the repository 'tags' directory...");
        if self.state.tags.is_empty() {
            self.state.tags = self.svn().list_tags().await?;
        }

        let new_version = self.state.new_version()?;
        let released = match &self.mode {
            ReleaseMode::Tag(name) => Some(name.as_str()),
            ReleaseMode::Trunk => None,
        };
        let candidates: Vec<&str> = self
            .state
            .tags
            .iter()
            .map(String::as_str)
            .filter(|tag| *tag != new_version && Some(*tag) != released)
            .collect();

        let last = self
            .config
            .tag_order
            .latest(candidates.as_slice())
            .ok_or(ParseError::EmptyTagListing)?
            .to_string();

        self.output.success(&format!("Last release version is '{}'.", last));
        self.state.last_version = Some(last);
        Ok(Flow::Continue)
    }

    async fn resolve_revision_boundary(&mut self) -> Result<Flow> {
        self.output.progress("Retrieving revision number of last release...");
        let entries = self.svn().list_tags_verbose().await?;
        let boundary = revision_of(&entries, self.state.last_version()?)?;
        log::info!("Last release tagged at revision {}", boundary);
        self.state.boundary = Some(boundary);
        Ok(Flow::Continue)
    }

    async fn fetch_change_log(&mut self) -> Result<Flow> {
        let boundary = self.state.boundary.ok_or(ReleaseError::MissingState {
            what: "the revision of the last release",
        })?;
        let log = self.svn().log_since(boundary).await?;

        self.output.section(&format!(
            "Log entries since version '{}'",
            self.state.last_version()?
        ));
        self.output.block(&log);
        self.output.println("");
        self.state.change_log = Some(log);
        Ok(Flow::Continue)
    }

    fn collect_summary(&mut self) -> Result<Flow> {
        let mut summary = Vec::new();
        let mut prompt = FIRST_SUMMARY_PROMPT;
        loop {
            let line = self.prompter.ask(prompt)?;
            if line.is_empty() {
                break;
            }
            summary.push(line);
            prompt = NEXT_SUMMARY_PROMPT;
        }
        self.output.println("");

        self.state.notes = notes::summary_header(
            self.state.new_version()?,
            self.state.last_version()?,
            &summary,
        );
        Ok(Flow::Continue)
    }

    async fn merge_change_log(&mut self) -> Result<Flow> {
        let log = self.state.change_log.as_deref().unwrap_or_default();
        let header = std::mem::take(&mut self.state.notes);
        self.state.notes = notes::merge_change_log(header, log);
        notes::write_notes_file(&self.config.temp_file, &self.state.notes).await?;
        Ok(Flow::Continue)
    }

    async fn stage_working_copy(&mut self) -> Result<Flow> {
        self.config.check_temp_paths()?;
        let source = self.state.root()?.join(self.mode.source_path());
        if stage::clean_build_products(self.runner, &source).await? {
            self.output
                .progress(&format!("Cleaned build products in '{}'.", source.display()));
        }

        self.output.progress(&format!(
            "Copying '{}' into directory '{}'...",
            source.display(),
            self.config.temp_directory.display()
        ));
        let name = stage_name(&self.mode);
        let tree = stage::stage_tree(&source, &self.config.temp_directory, &name).await?;
        self.state.stage = Some(tree);
        Ok(Flow::Continue)
    }

    async fn update_release_notes(&mut self) -> Result<Flow> {
        let release_notes = self.state.stage()?.release_notes();
        self.output.progress(&format!(
            "Inserting log entries in file '{}'...",
            release_notes.display()
        ));
        notes::prepend_release_notes(&self.config.temp_file, &release_notes).await?;
        Ok(Flow::Continue)
    }

    async fn patch_doc_version(&mut self) -> Result<Flow> {
        let tree = self.state.stage()?;
        self.output.progress(&format!(
            "Updating project number in file '{}'...",
            tree.doxyfile().display()
        ));
        docs::update_project_number(tree, self.state.new_version()?).await?;
        Ok(Flow::Continue)
    }

    async fn generate_documentation(&mut self) -> Result<Flow> {
        let tree = self.state.stage()?;
        self.output.progress("Generating Doxygen documentation...");
        docs::generate_doxygen(self.runner, tree).await?;
        self.output.progress("Generating PDF file...");
        docs::build_reference_manual(self.runner, tree).await?;
        Ok(Flow::Continue)
    }

    fn verify_documentation(&mut self) -> Result<Flow> {
        let tree = self.state.stage()?;
        self.output.println(
            "Check that the following documentation was generated correctly before proceeding:",
        );
        self.output.indent(&format!("- {}", tree.release_notes().display()));
        self.output.indent(&format!("- {}", tree.reference_manual().display()));
        self.output.println("");
        self.gate()
    }

    async fn commit(&mut self) -> Result<Flow> {
        let svn = self.svn();
        self.output.println(&format!(
            "You are about to commit changes into the repository '{}'.",
            svn.url()
        ));
        self.output.println("");
        if self.gate()? == Flow::Declined {
            return Ok(Flow::Declined);
        }

        let checkout = TreeLayout::new(self.state.root()?.join(self.mode.source_path()));
        stage::promote_artifacts(self.state.stage()?, &checkout).await?;
        svn.add(&checkout.reference_manual()).await?;

        self.output
            .progress(&format!("Committing changes into the repository '{}'...", svn.url()));
        svn.commit(checkout.root(), &self.commit_message()?).await?;
        self.output.success("Changes committed.");
        Ok(Flow::Continue)
    }

    async fn tag(&mut self) -> Result<Flow> {
        let version = self.state.new_version()?.to_string();
        let source = self.mode.source_path();
        let svn = self.svn();

        self.output.progress(&format!(
            "Copying '{}' into tag '{}'...",
            svn.url_of(&source),
            svn.url_of(&format!("tags/{}", version))
        ));
        svn.copy(&source, &format!("tags/{}", version), &self.commit_message()?)
            .await?;
        self.output.success(&format!("Tagged version '{}'.", version));
        Ok(Flow::Continue)
    }

    async fn package(&mut self) -> Result<Flow> {
        let tag = match &self.state.release_tag {
            Some(tag) => tag.clone(),
            None => self.state.new_version()?.to_string(),
        };
        let export_dir = self.config.temp_directory.join("tags").join(&tag);
        if export_dir.exists() {
            tokio::fs::remove_dir_all(&export_dir)
                .await
                .fs_context("removing previous export", &export_dir)?;
        }
        if let Some(parent) = export_dir.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .fs_context("creating export directory", parent)?;
        }

        self.output.progress(&format!(
            "Retrieving version '{}' from the repository 'tags' directory...",
            tag
        ));
        self.svn().export(&format!("tags/{}", tag), &export_dir).await?;

        let archive = self
            .config
            .temp_directory
            .join(package::archive_name(&self.config.product, &tag));
        self.output
            .progress(&format!("Creating TAR file '{}'...", archive.display()));
        package::create_source_archive(&export_dir, &archive).await?;

        self.state.release_tag = Some(tag);
        self.state.archive = Some(archive);
        Ok(Flow::Continue)
    }

    /// Optional upload gate; no skips the upload only
    fn offer(&mut self, message: &str) -> Result<bool> {
        self.output.println(message);
        self.output.println("");
        let accepted = self.prompter.confirm(crate::cli::PROCEED_PROMPT)?;
        if !accepted {
            self.output.info("Skipped.");
        }
        self.output.println("");
        Ok(accepted)
    }

    async fn ensure_session(&mut self) -> Result<()> {
        self.state
            .session
            .ensure(self.runner, &mut *self.prompter, self.config)
            .await
    }

    async fn publish_archive(&mut self) -> Result<Flow> {
        let archive = self.state.archive()?.to_path_buf();
        let offered = format!(
            "You are about to upload the TAR file '{}' into the download area.",
            archive.display()
        );
        if !self.offer(&offered)? {
            return Ok(Flow::Continue);
        }

        self.ensure_session().await?;
        self.output.progress("Uploading TAR file into the download area...");
        self.state
            .session
            .upload(self.runner, self.config, &[archive], None)
            .await?;
        self.output.success("Source archive uploaded.");
        Ok(Flow::Continue)
    }

    async fn publish_documentation(&mut self) -> Result<Flow> {
        if !self.offer("You are about to upload the documentation into the download area.")? {
            return Ok(Flow::Continue);
        }

        let tree = self.state.stage()?;
        let files = [tree.release_notes(), tree.reference_manual()];
        self.ensure_session().await?;
        self.output.progress("Uploading documentation into the download area...");
        self.state
            .session
            .upload(self.runner, self.config, &files, Some("documentation"))
            .await?;
        self.output.success("Documentation uploaded.");
        Ok(Flow::Continue)
    }

    async fn publish_package(&mut self) -> Result<Flow> {
        let tree = self.state.stage()?.clone();
        let rpm = PlatformPackage::rpm(
            &tree,
            &self.config.package_name,
            self.state.new_version()?,
            &self.config.package_arch,
        )?;

        let offered = format!(
            "You are about to build the package '{}' and upload it into the download area.",
            rpm.file_name
        );
        if !self.offer(&offered)? {
            return Ok(Flow::Continue);
        }

        self.output
            .progress(&format!("Creating RPM file '{}'...", rpm.path.display()));
        rpm.build(self.runner, &tree).await?;

        self.ensure_session().await?;
        self.output.progress("Uploading RPM file into the download area...");
        self.state
            .session
            .upload(self.runner, self.config, std::slice::from_ref(&rpm.path), Some("RPM"))
            .await?;
        self.output.success("Package uploaded.");
        Ok(Flow::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tag_source() {
        assert_eq!(parse_tag_source("").as_deref(), Some("trunk"));
        assert_eq!(parse_tag_source(" trunk ").as_deref(), Some("trunk"));
        assert_eq!(parse_tag_source("branches/3.1").as_deref(), Some("branches/3.1"));
        assert_eq!(parse_tag_source("tags/3.0.2/").as_deref(), Some("tags/3.0.2"));
        assert_eq!(parse_tag_source("tags/"), None);
        assert_eq!(parse_tag_source("vendor/x"), None);
        assert_eq!(parse_tag_source("branches/a/b"), None);
    }

    #[test]
    fn test_stage_name_avoids_export_directory() {
        assert_eq!(stage_name(&ReleaseMode::Trunk), "trunk");
        assert_eq!(stage_name(&ReleaseMode::Tag("3.1.0".to_string())), "tag-3.1.0");
    }
}
