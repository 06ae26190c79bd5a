//! Error types for epicsqt_release operations.
//!
//! Every step of a release returns one of these errors on failure. The runner
//! wraps them with the step that produced them, so the operator sees both the
//! step-specific message and the categorized cause.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for epicsqt_release operations
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// Exit status reported for any failed step
pub const FAILURE_EXIT_CODE: i32 = -1;

/// Main error type for all release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// External tool errors
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// Errors while parsing tool output or staged files
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors without a known path
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File system error with path context
    #[error("{context} {path}: {error}")]
    Fs {
        /// Operation that failed (e.g. "reading release notes")
        context: &'static str,
        /// Path that was being accessed
        path: PathBuf,
        /// The underlying I/O error
        error: std::io::Error,
    },

    /// A step ran before the value it depends on was produced
    #[error("Release state is missing {what}")]
    MissingState {
        /// Name of the missing value
        what: &'static str,
    },

    /// A failed release step
    #[error("{message} ({source})")]
    Step {
        /// Name of the step that failed
        step: &'static str,
        /// Step-specific failure message
        message: &'static str,
        /// Underlying cause
        #[source]
        source: Box<ReleaseError>,
    },

    /// The operator interrupted the release at a prompt
    #[error("Release process interrupted by the user.")]
    Interrupted,

    /// Generic errors from anyhow
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Errors raised while invoking external tools
#[derive(Error, Debug)]
pub enum ToolError {
    /// Program is not installed or not on PATH
    #[error("'{program}' was not found. Is it installed and on PATH?")]
    NotFound {
        /// Program name or path
        program: String,
    },

    /// Program could not be started
    #[error("Failed to start '{command}': {source}")]
    SpawnFailed {
        /// Full command line
        command: String,
        /// Spawn error
        #[source]
        source: std::io::Error,
    },

    /// Program ran but exited unsuccessfully
    #[error("'{command}' exited with {status}{}", format_stderr(.stderr))]
    ExitStatus {
        /// Full command line
        command: String,
        /// Exit status description
        status: String,
        /// Captured standard error, if any
        stderr: String,
    },
}

fn format_stderr(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}

/// Errors while interpreting tool output or staged files
#[derive(Error, Debug)]
pub enum ParseError {
    /// The version dump did not contain the framework version marker
    #[error("No 'Framework version:' line in output: {output:?}")]
    VersionMarkerMissing {
        /// Raw output that was searched
        output: String,
    },

    /// The tags directory listing was empty
    #[error("The repository 'tags' directory does not contain any release")]
    EmptyTagListing,

    /// A verbose listing line did not start with a revision number
    #[error("Cannot read a revision number from listing line {line:?}")]
    InvalidRevision {
        /// Offending line
        line: String,
    },

    /// No revision can follow the last release
    #[error("Revision {revision} has no successor")]
    RevisionOutOfRange {
        /// Revision of the last release
        revision: u64,
    },

    /// The tag was absent from the verbose listing
    #[error("Tag '{tag}' does not appear in the verbose tag listing")]
    RevisionNotFound {
        /// Tag name
        tag: String,
    },

    /// Version is not of the form major.minor.release
    #[error("Invalid release version '{version}': {source}")]
    InvalidVersion {
        /// Version string
        version: String,
        /// Parsing error
        #[source]
        source: semver::Error,
    },

    /// Doxygen configuration has no PROJECT_NUMBER line
    #[error("No PROJECT_NUMBER entry in {path}")]
    ProjectNumberMissing {
        /// Doxyfile path
        path: PathBuf,
    },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read
    #[error("Failed to read configuration file {path}: {source}")]
    Read {
        /// Configuration file path
        path: PathBuf,
        /// IO error
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid TOML for this tool
    #[error("Failed to parse configuration file {path}: {source}")]
    Parse {
        /// Configuration file path
        path: PathBuf,
        /// TOML error
        #[source]
        source: toml::de::Error,
    },

    /// Repository URL is malformed
    #[error("Invalid repository URL '{url}': {source}")]
    InvalidUrl {
        /// URL as configured
        url: String,
        /// URL parse error
        #[source]
        source: url::ParseError,
    },

    /// Staging wipes the temporary directory, so the notes file must live elsewhere
    #[error("Temporary file {file} must not be inside the temporary directory {directory}")]
    TempFileInsideTempDirectory {
        /// Configured notes file
        file: PathBuf,
        /// Configured temporary directory
        directory: PathBuf,
    },

    /// No checkout containing a 'trunk' directory was found
    #[error("Could not find the repository checkout (a directory containing 'trunk') above {searched:?}")]
    RepositoryRootNotFound {
        /// Starting points that were searched
        searched: Vec<PathBuf>,
    },
}

impl ReleaseError {
    /// Wrap an error with the step that produced it
    pub fn in_step(self, step: &'static str, message: &'static str) -> Self {
        match self {
            // User aborts are not step failures
            ReleaseError::Interrupted => ReleaseError::Interrupted,
            other => ReleaseError::Step {
                step,
                message,
                source: Box::new(other),
            },
        }
    }

    /// Whether the run ended because the operator stopped it
    pub fn is_user_abort(&self) -> bool {
        match self {
            ReleaseError::Interrupted => true,
            ReleaseError::Step { source, .. } => source.is_user_abort(),
            _ => false,
        }
    }

    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        if self.is_user_abort() {
            0
        } else {
            FAILURE_EXIT_CODE
        }
    }

    /// Name of the failed step, if the error came out of the pipeline
    pub fn step(&self) -> Option<&'static str> {
        match self {
            ReleaseError::Step { step, .. } => Some(*step),
            _ => None,
        }
    }

    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            ReleaseError::Step { step, source, .. } => {
                let mut suggestions = source.recovery_suggestions();
                match *step {
                    "tag" => suggestions.push(
                        "The release commit is already in the repository; create the tag by hand with 'svn copy' or rerun with TAG=<version>".to_string(),
                    ),
                    "package" | "publish-archive" | "publish-documentation"
                    | "publish-package" => suggestions.push(
                        "The release is committed and tagged; remove a half-created tag with 'svn delete' before releasing again".to_string(),
                    ),
                    _ => {}
                }
                suggestions
            }
            ReleaseError::Tool(ToolError::NotFound { program }) => vec![
                format!("Install '{}' or add it to PATH", program),
            ],
            ReleaseError::Parse(ParseError::VersionMarkerMissing { .. }) => vec![
                "Build the framework so that 'qegui -v' reports the new version".to_string(),
            ],
            ReleaseError::Parse(ParseError::InvalidVersion { .. }) => vec![
                "Check the MAJOR, MINOR and RELEASE definitions in 'QEFrameworkVersion.h'".to_string(),
            ],
            ReleaseError::Config(ConfigError::RepositoryRootNotFound { .. }) => vec![
                "Run from inside the repository checkout or set EPICSQT_ROOT".to_string(),
            ],
            ReleaseError::Config(ConfigError::TempFileInsideTempDirectory { .. }) => vec![
                "Set temp_file to a path outside temp_directory in the configuration file".to_string(),
            ],
            _ => vec![],
        }
    }
}

/// Extension trait for filesystem operations with automatic path context.
pub trait ErrorExt<T> {
    /// Add filesystem context to an I/O error.
    ///
    /// The `context` should be a present-tense verb phrase describing the operation,
    /// e.g., "reading file", "creating directory".
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|error| ReleaseError::Fs {
            context,
            path: path.into(),
            error,
        })
    }
}
