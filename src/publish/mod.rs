//! Uploads to the distribution host.
//!
//! Files are copied with `scp` into the project's file release area. The
//! host needs an interactive shell session, created on first use with
//! `ssh <user>,<project>@<host> create` and reused for later uploads.

use crate::cli::Prompter;
use crate::config::ReleaseConfig;
use crate::error::Result;
use crate::tools::{CommandRunner, ToolCommand};
use std::path::PathBuf;

/// Remote shell session, established lazily
#[derive(Debug, Clone, Default)]
pub struct RemoteSession {
    user: Option<String>,
    established: bool,
}

impl RemoteSession {
    /// Session with an optional pre-configured user name
    pub fn new(user: Option<String>) -> Self {
        Self {
            user,
            established: false,
        }
    }

    /// Whether `ssh ... create` has already run in this release
    pub fn is_established(&self) -> bool {
        self.established
    }

    /// Ask for the user name if needed and create the remote shell once
    pub async fn ensure<R, P>(
        &mut self,
        runner: &R,
        prompter: &mut P,
        config: &ReleaseConfig,
    ) -> Result<()>
    where
        R: CommandRunner,
        P: Prompter,
    {
        if self.established {
            return Ok(());
        }

        let user = match self.user.take() {
            Some(user) => user,
            None => prompter.ask("Please, provide the user name in SourceForge: ")?,
        };

        log::info!("Creating remote shell for user '{}'", user);
        runner
            .run(
                &ToolCommand::new("ssh")
                    .arg(login(&user, config))
                    .arg("create"),
            )
            .await?;

        self.user = Some(user);
        self.established = true;
        Ok(())
    }

    /// Copy `files` into `<remote_directory>/<subdirectory>/`
    pub async fn upload<R: CommandRunner>(
        &self,
        runner: &R,
        config: &ReleaseConfig,
        files: &[PathBuf],
        subdirectory: Option<&str>,
    ) -> Result<()> {
        let user = self.user.as_deref().ok_or(crate::error::ReleaseError::MissingState {
            what: "a remote user name",
        })?;

        runner
            .run(
                &ToolCommand::new("scp")
                    .args(files.iter().map(|f| f.display().to_string()))
                    .arg(destination(user, config, subdirectory))
                    .discard(),
            )
            .await?;
        Ok(())
    }
}

fn login(user: &str, config: &ReleaseConfig) -> String {
    format!("{},{}@{}", user, config.remote_project, config.remote_host)
}

/// `scp` destination for a subdirectory of the release area
pub fn destination(user: &str, config: &ReleaseConfig, subdirectory: Option<&str>) -> String {
    let base = config.remote_directory.trim_end_matches('/');
    match subdirectory {
        Some(sub) => format!("{}:{}/{}/", login(user, config), base, sub),
        None => format!("{}:{}/", login(user, config), base),
    }
}
