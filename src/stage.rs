//! Staged working copy.
//!
//! The release is prepared in a copy of the source tree under the temporary
//! directory, with Subversion metadata stripped. Files the release modifies
//! are promoted back into the checkout before committing.

use crate::error::{ErrorExt, ReleaseError, Result};
use crate::tools::{CommandRunner, ToolCommand};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Name of the Subversion metadata directory
pub const SVN_METADATA_DIR: &str = ".svn";

/// Paths inside a framework source tree (trunk or a tag)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeLayout {
    root: PathBuf,
}

impl TreeLayout {
    /// Layout rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root of the tree
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `releasenotes.txt`
    pub fn release_notes(&self) -> PathBuf {
        self.root.join("releasenotes.txt")
    }

    /// Directory holding the Doxygen configuration
    pub fn doc_source_dir(&self) -> PathBuf {
        self.root.join("documentation").join("source")
    }

    /// Doxygen configuration file
    pub fn doxyfile(&self) -> PathBuf {
        self.doc_source_dir().join("Doxyfile")
    }

    /// LaTeX output of Doxygen
    pub fn latex_dir(&self) -> PathBuf {
        self.root.join("documentation").join("latex")
    }

    /// PDF produced by `make pdf`
    pub fn refman_pdf(&self) -> PathBuf {
        self.latex_dir().join("refman.pdf")
    }

    /// Published reference manual
    pub fn reference_manual(&self) -> PathBuf {
        self.root.join("documentation").join("QE_ReferenceManual.pdf")
    }

    /// Directory with the platform package makefile
    pub fn resources_dir(&self) -> PathBuf {
        self.root.join("resources")
    }

    /// Files a release modifies, relative to the tree root
    pub fn release_artifacts() -> [PathBuf; 3] {
        [
            PathBuf::from("releasenotes.txt"),
            Path::new("documentation").join("source").join("Doxyfile"),
            Path::new("documentation").join("QE_ReferenceManual.pdf"),
        ]
    }
}

/// Run `make clean` in `source` so build products are not staged.
///
/// Returns false when the tree has no top-level makefile.
pub async fn clean_build_products<R: CommandRunner>(runner: &R, source: &Path) -> Result<bool> {
    if !source.join("Makefile").is_file() {
        log::debug!("No Makefile in {}, nothing to clean", source.display());
        return Ok(false);
    }
    runner
        .run(
            &ToolCommand::new("make")
                .arg("clean")
                .current_dir(source)
                .discard(),
        )
        .await?;
    Ok(true)
}

/// Copy `source` to `<stage_dir>/<name>` without `.svn` directories.
///
/// `stage_dir` is wiped first.
pub async fn stage_tree(source: &Path, stage_dir: &Path, name: &str) -> Result<TreeLayout> {
    if !source.is_dir() {
        return Err(ReleaseError::Fs {
            context: "staging",
            path: source.to_path_buf(),
            error: std::io::Error::new(std::io::ErrorKind::NotFound, "source tree does not exist"),
        });
    }

    if stage_dir.exists() {
        fs::remove_dir_all(stage_dir)
            .await
            .fs_context("removing stage directory", stage_dir)?;
    }
    fs::create_dir_all(stage_dir)
        .await
        .fs_context("creating stage directory", stage_dir)?;

    let destination = stage_dir.join(name);
    copy_dir_without_metadata(source, &destination).await?;
    log::info!("Staged {} into {}", source.display(), destination.display());

    Ok(TreeLayout::new(destination))
}

/// Recursively copy `from` into `to`, skipping `.svn` directories.
///
/// Symlinks are recreated rather than followed.
async fn copy_dir_without_metadata(from: &Path, to: &Path) -> Result<()> {
    let walker = walkdir::WalkDir::new(from)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| entry.file_name() != SVN_METADATA_DIR);

    for entry in walker {
        let entry = entry.map_err(|e| ReleaseError::Fs {
            context: "walking",
            path: e.path().map(Path::to_path_buf).unwrap_or_else(|| from.to_path_buf()),
            error: e.into(),
        })?;
        let rel_path = entry
            .path()
            .strip_prefix(from)
            .map_err(|e| {
                anyhow::anyhow!("{} escaped {}: {}", entry.path().display(), from.display(), e)
            })?;
        let dest_path = to.join(rel_path);

        if entry.file_type().is_symlink() {
            let target = fs::read_link(entry.path())
                .await
                .fs_context("reading link", entry.path())?;
            symlink(&target, &dest_path).fs_context("creating link", &dest_path)?;
        } else if entry.file_type().is_dir() {
            fs::create_dir_all(&dest_path)
                .await
                .fs_context("creating directory", &dest_path)?;
        } else {
            fs::copy(entry.path(), &dest_path)
                .await
                .fs_context("copying", entry.path())?;
        }
    }

    Ok(())
}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    if target.is_dir() {
        std::os::windows::fs::symlink_dir(target, link)
    } else {
        std::os::windows::fs::symlink_file(target, link)
    }
}

/// Copy the release artifacts from the staged tree into the checkout tree.
///
/// Returns the checkout paths that were written.
pub async fn promote_artifacts(stage: &TreeLayout, checkout: &TreeLayout) -> Result<Vec<PathBuf>> {
    let mut promoted = Vec::new();
    for relative in TreeLayout::release_artifacts() {
        let from = stage.root().join(&relative);
        let to = checkout.root().join(&relative);
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent)
                .await
                .fs_context("creating directory", parent)?;
        }
        fs::copy(&from, &to).await.fs_context("promoting", &from)?;
        log::debug!("Promoted {} -> {}", from.display(), to.display());
        promoted.push(to);
    }
    Ok(promoted)
}
