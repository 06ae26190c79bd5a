//! Release configuration.
//!
//! Built once at startup and passed by reference to every step. Values come
//! from the built-in defaults, then an optional TOML file, then environment
//! variables.

use crate::error::{ConfigError, Result};
use crate::version::TagOrder;
use path_absolutize::Absolutize;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit configuration file
pub const CONFIG_FILE_ENV: &str = "EPICSQT_RELEASE_CONFIG";
/// Environment override for the repository URL
pub const SVN_URL_ENV: &str = "EPICSQT_SVN_URL";
/// Environment override for the remote user name
pub const REMOTE_USER_ENV: &str = "EPICSQT_REMOTE_USER";
/// Environment override for the checkout root
pub const ROOT_ENV: &str = "EPICSQT_ROOT";

/// Path of the version dump executable inside the checkout
pub const QEGUI_PATH: &str = "trunk/applications/QEGuiApp/qegui";

/// Configuration for release operations
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReleaseConfig {
    /// Subversion repository URL (parent of trunk, tags and branches)
    pub repository_url: String,
    /// Product name used for the source archive
    pub product: String,
    /// Platform package name
    pub package_name: String,
    /// Platform package architecture
    pub package_arch: String,
    /// Host of the file release area
    pub remote_host: String,
    /// Project name on the remote host
    pub remote_project: String,
    /// File release directory on the remote host
    pub remote_directory: String,
    /// Remote user; asked for on first upload when unset
    pub remote_user: Option<String>,
    /// Notes buffer passed between steps
    pub temp_file: PathBuf,
    /// Directory holding the staged copy, export and archive
    pub temp_directory: PathBuf,
    /// Ordering used to find the last release
    pub tag_order: TagOrder,
    /// Local checkout root; discovered when unset
    pub repository_root: Option<PathBuf>,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        let temp = std::env::temp_dir();
        Self {
            repository_url: "https://svn.code.sf.net/p/epicsqt/code".to_string(),
            product: "epicsqt".to_string(),
            package_name: "epics_qt_framework".to_string(),
            package_arch: "i386".to_string(),
            remote_host: "shell.sourceforge.net".to_string(),
            remote_project: "epicsqt".to_string(),
            remote_directory: "/home/frs/project/epicsqt".to_string(),
            remote_user: None,
            temp_file: temp.join("release.tmp"),
            temp_directory: temp.join("epicsqt"),
            tag_order: TagOrder::default(),
            repository_root: None,
        }
    }
}

impl ReleaseConfig {
    /// Load configuration from the file and environment of this process
    pub fn load() -> Result<Self> {
        let config = match config_file_path() {
            Some(path) => {
                log::debug!("Loading configuration from {}", path.display());
                Self::from_file(&path)?
            }
            None => Self::default(),
        };
        let config = config.with_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(config)
    }

    /// Apply environment-style overrides; `lookup` returns the value of a variable
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(url) = non_empty(SVN_URL_ENV) {
            self.repository_url = url;
        }
        if let Some(user) = non_empty(REMOTE_USER_ENV) {
            self.remote_user = Some(user);
        }
        if let Some(root) = non_empty(ROOT_ENV) {
            self.repository_root = Some(PathBuf::from(root));
        }
        self
    }

    /// Check values that would only fail late in the release
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.repository_url).map_err(|source| ConfigError::InvalidUrl {
            url: self.repository_url.clone(),
            source,
        })?;
        self.check_temp_paths()
    }

    /// Reject a notes file that staging would delete
    pub fn check_temp_paths(&self) -> Result<()> {
        let file = self.temp_file.absolutize()?;
        let directory = self.temp_directory.absolutize()?;
        if file.starts_with(&directory) {
            return Err(ConfigError::TempFileInsideTempDirectory {
                file: file.to_path_buf(),
                directory: directory.to_path_buf(),
            }
            .into());
        }
        Ok(())
    }

    /// Locate the checkout root: the configured one, else the first directory
    /// holding `trunk/` above the working directory or the executable.
    pub fn locate_repository_root(&self) -> Result<PathBuf> {
        if let Some(root) = &self.repository_root {
            let absolute = root.absolutize()?.to_path_buf();
            if absolute.join("trunk").is_dir() {
                return Ok(absolute);
            }
            return Err(ConfigError::RepositoryRootNotFound {
                searched: vec![absolute],
            }
            .into());
        }

        let mut searched = Vec::new();
        if let Ok(cwd) = std::env::current_dir() {
            searched.push(cwd);
        }
        if let Some(exe_dir) = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
        {
            searched.push(exe_dir);
        }

        let found = searched.iter().find_map(|start| find_checkout_root(start));
        match found {
            Some(root) => Ok(root),
            None => Err(ConfigError::RepositoryRootNotFound { searched }.into()),
        }
    }
}

/// First ancestor of `start` (inclusive) that contains a `trunk` directory
pub fn find_checkout_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join("trunk").is_dir())
        .map(Path::to_path_buf)
}

fn config_file_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_FILE_ENV) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir()
        .map(|dir| dir.join("epicsqt-release").join("release.toml"))
        .filter(|path| path.is_file())
}
