//! Subversion client operations used by the release.
//!
//! Thin wrapper over the `svn` command line client. Output parsing lives in
//! [`listing`] so it can be tested without a repository.

pub mod listing;

pub use listing::{TagEntry, log_range, parse_tag_listing, parse_verbose_listing, revision_of};

use crate::error::Result;
use crate::tools::{CommandRunner, ToolCommand};
use std::path::Path;

/// Subversion operations against one repository URL
#[derive(Debug)]
pub struct Subversion<'a, R> {
    runner: &'a R,
    url: &'a str,
}

impl<'a, R: CommandRunner> Subversion<'a, R> {
    /// Bind the client to a repository URL
    pub fn new(runner: &'a R, url: &'a str) -> Self {
        Self { runner, url }
    }

    /// Repository URL
    pub fn url(&self) -> &str {
        self.url
    }

    /// URL of a path inside the repository (e.g. `trunk`, `tags/3.1.0`)
    pub fn url_of(&self, path: &str) -> String {
        format!("{}/{}", self.url.trim_end_matches('/'), path.trim_start_matches('/'))
    }

    /// Names in the `tags` directory
    pub async fn list_tags(&self) -> Result<Vec<String>> {
        let output = self
            .runner
            .run(&ToolCommand::new("svn").arg("list").arg(self.url_of("tags")).capture())
            .await?;
        Ok(parse_tag_listing(&output.stdout))
    }

    /// Entries of the `tags` directory with their revisions
    pub async fn list_tags_verbose(&self) -> Result<Vec<TagEntry>> {
        let output = self
            .runner
            .run(
                &ToolCommand::new("svn")
                    .args(["list", "--verbose"])
                    .arg(self.url_of("tags"))
                    .capture(),
            )
            .await?;
        Ok(parse_verbose_listing(&output.stdout)?)
    }

    /// Log entries committed after `boundary`, up to HEAD
    pub async fn log_since(&self, boundary: u64) -> Result<String> {
        let output = self
            .runner
            .run(
                &ToolCommand::new("svn")
                    .args(["log", "-r"])
                    .arg(log_range(boundary)?)
                    .arg(self.url)
                    .capture(),
            )
            .await?;
        Ok(output.stdout)
    }

    /// Schedule a working copy file for addition; already versioned files are ignored
    pub async fn add(&self, path: &Path) -> Result<()> {
        self.runner
            .run(
                &ToolCommand::new("svn")
                    .args(["add", "--force", "--parents"])
                    .arg(path.display().to_string())
                    .discard(),
            )
            .await?;
        Ok(())
    }

    /// Commit a working copy path
    pub async fn commit(&self, path: &Path, message: &str) -> Result<()> {
        self.runner
            .run(
                &ToolCommand::new("svn")
                    .arg("commit")
                    .arg(path.display().to_string())
                    .arg("-m")
                    .arg(message),
            )
            .await?;
        Ok(())
    }

    /// Server-side copy of `from` to `to`, creating intermediate directories
    pub async fn copy(&self, from: &str, to: &str, message: &str) -> Result<()> {
        self.runner
            .run(
                &ToolCommand::new("svn")
                    .args(["copy", "--parents"])
                    .arg(self.url_of(from))
                    .arg(self.url_of(to))
                    .arg("-m")
                    .arg(message),
            )
            .await?;
        Ok(())
    }

    /// Export a repository path into a local directory
    pub async fn export(&self, path: &str, destination: &Path) -> Result<()> {
        self.runner
            .run(
                &ToolCommand::new("svn")
                    .arg("export")
                    .arg(self.url_of(path))
                    .arg(destination.display().to_string())
                    .discard(),
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::SystemRunner;

    #[test]
    fn test_url_of_joins_paths() {
        let runner = SystemRunner::new();
        let svn = Subversion::new(&runner, "https://svn.code.sf.net/p/epicsqt/code/");
        assert_eq!(
            svn.url_of("tags/3.1.0"),
            "https://svn.code.sf.net/p/epicsqt/code/tags/3.1.0"
        );
        assert_eq!(svn.url_of("/trunk"), "https://svn.code.sf.net/p/epicsqt/code/trunk");
    }
}
