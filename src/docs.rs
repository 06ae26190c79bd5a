//! Documentation generation for a staged tree.

use crate::error::{ErrorExt, ParseError, Result};
use crate::stage::TreeLayout;
use crate::tools::{CommandRunner, ToolCommand};
use regex::Regex;
use std::sync::LazyLock;

static PROJECT_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^PROJECT_NUMBER[ \t]*=.*$").expect("PROJECT_NUMBER pattern is valid")
});

/// Replace every `PROJECT_NUMBER` line of a Doxyfile with `version`.
///
/// Returns `None` when the configuration has no such line.
pub fn patch_project_number(doxyfile: &str, version: &str) -> Option<String> {
    if !PROJECT_NUMBER.is_match(doxyfile) {
        return None;
    }
    let line = format!("PROJECT_NUMBER         = {version}");
    Some(
        PROJECT_NUMBER
            .replace_all(doxyfile, regex::NoExpand(&line))
            .into_owned(),
    )
}

/// Rewrite the staged Doxyfile for `version`
pub async fn update_project_number(tree: &TreeLayout, version: &str) -> Result<()> {
    let path = tree.doxyfile();
    let content = tokio::fs::read_to_string(&path)
        .await
        .fs_context("reading", &path)?;

    let patched = patch_project_number(&content, version)
        .ok_or_else(|| ParseError::ProjectNumberMissing { path: path.clone() })?;

    tokio::fs::write(&path, patched)
        .await
        .fs_context("writing", &path)?;
    log::info!("PROJECT_NUMBER set to {} in {}", version, path.display());
    Ok(())
}

/// Run Doxygen on the staged tree
pub async fn generate_doxygen<R: CommandRunner>(runner: &R, tree: &TreeLayout) -> Result<()> {
    runner
        .run(
            &ToolCommand::new("doxygen")
                .arg("Doxyfile")
                .current_dir(tree.doc_source_dir())
                .discard(),
        )
        .await?;
    Ok(())
}

/// Build the reference manual PDF and copy it to its published location
pub async fn build_reference_manual<R: CommandRunner>(runner: &R, tree: &TreeLayout) -> Result<()> {
    runner
        .run(
            &ToolCommand::new("make")
                .arg("pdf")
                .current_dir(tree.latex_dir())
                .discard(),
        )
        .await?;

    let from = tree.refman_pdf();
    let to = tree.reference_manual();
    tokio::fs::copy(&from, &to)
        .await
        .fs_context("copying reference manual", &from)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const DOXYFILE: &str = "PROJECT_NAME           = \"EPICS Qt Framework\"\n\
PROJECT_NUMBER         = 3.0.2\n\
PROJECT_BRIEF          =\n";

    #[test]
    fn test_patch_project_number() {
        let patched = patch_project_number(DOXYFILE, "3.1.0").unwrap();
        assert!(patched.contains("PROJECT_NUMBER         = 3.1.0\n"));
        assert!(!patched.contains("3.0.2"));
        assert!(patched.starts_with("PROJECT_NAME"));
        assert!(patched.ends_with("PROJECT_BRIEF          =\n"));
    }

    #[test]
    fn test_patch_without_project_number() {
        assert_eq!(patch_project_number("PROJECT_NAME = x\n", "3.1.0"), None);
    }

    #[test]
    fn test_patch_leaves_dollar_signs_alone() {
        let patched = patch_project_number("PROJECT_NUMBER =\n", "$1").unwrap();
        assert_eq!(patched, "PROJECT_NUMBER         = $1\n");
    }

    #[tokio::test]
    async fn test_update_project_number_in_tree() {
        let dir = TempDir::new().unwrap();
        let tree = TreeLayout::new(dir.path());
        std::fs::create_dir_all(tree.doc_source_dir()).unwrap();
        std::fs::write(tree.doxyfile(), DOXYFILE).unwrap();

        update_project_number(&tree, "3.1.0").await.unwrap();

        let content = std::fs::read_to_string(tree.doxyfile()).unwrap();
        assert!(content.contains("PROJECT_NUMBER         = 3.1.0"));
    }
}
