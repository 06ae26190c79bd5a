//! Release notes assembly.
//!
//! The notes block for a release is a fixed header, the operator's summary,
//! and the raw `svn log` text. It is written to the temporary notes file and
//! then prepended to `releasenotes.txt` in the staged copy.

use crate::error::{ErrorExt, Result};
use std::path::Path;

/// Separator line opening every release block
pub const SEPARATOR: &str =
    "==================================================================================================";

/// Header lines for a release: separator, title, summary and the `DETAIL:` marker
pub fn summary_header<S: AsRef<str>>(
    new_version: &str,
    last_version: &str,
    summary: &[S],
) -> Vec<String> {
    let mut lines = vec![
        SEPARATOR.to_string(),
        format!("Changes between {} and {}", new_version, last_version),
        String::new(),
        "SUMMARY:".to_string(),
    ];
    lines.extend(summary.iter().map(|line| line.as_ref().to_string()));
    lines.push(String::new());
    lines.push("DETAIL:".to_string());
    lines
}

/// Append the fetched log text, line by line, after the header
pub fn merge_change_log(mut header: Vec<String>, change_log: &str) -> Vec<String> {
    header.extend(change_log.lines().map(str::to_string));
    header
}

/// Render lines as file content, each terminated by a newline
pub fn render(lines: &[String]) -> String {
    let mut content = String::with_capacity(lines.iter().map(|l| l.len() + 1).sum());
    for line in lines {
        content.push_str(line);
        content.push('\n');
    }
    content
}

/// Persist the notes buffer, replacing any previous content
pub async fn write_notes_file(path: &Path, lines: &[String]) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .fs_context("creating directory for", parent)?;
    }
    tokio::fs::write(path, render(lines))
        .await
        .fs_context("writing notes file", path)?;
    Ok(())
}

/// Prepend the notes file to the release notes, creating them if absent
pub async fn prepend_release_notes(notes_file: &Path, release_notes: &Path) -> Result<()> {
    let notes = tokio::fs::read_to_string(notes_file)
        .await
        .fs_context("reading notes file", notes_file)?;

    let existing = match tokio::fs::read_to_string(release_notes).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::warn!("{} does not exist yet, creating it", release_notes.display());
            String::new()
        }
        Err(e) => {
            return Err(crate::error::ReleaseError::Fs {
                context: "reading release notes",
                path: release_notes.to_path_buf(),
                error: e,
            });
        }
    };

    tokio::fs::write(release_notes, format!("{notes}{existing}"))
        .await
        .fs_context("writing release notes", release_notes)?;
    Ok(())
}
