//! Source archive and platform package artifacts.

use crate::error::{ErrorExt, ReleaseError, Result};
use crate::stage::TreeLayout;
use crate::tools::{CommandRunner, ToolCommand};
use crate::version::parse_release_version;
use flate2::{Compression, write::GzEncoder};
use std::io::Write;
use std::path::{Path, PathBuf};

/// File name of the source archive, `<product>-<version>-src.tar.gz`
pub fn archive_name(product: &str, version: &str) -> String {
    format!("{product}-{version}-src.tar.gz")
}

/// Create a gzip-compressed tar of `src_dir`, rooted at `.`.
///
/// An existing archive at `dest_path` is replaced.
pub async fn create_source_archive(src_dir: &Path, dest_path: &Path) -> Result<()> {
    if dest_path.exists() {
        tokio::fs::remove_file(dest_path)
            .await
            .fs_context("removing previous archive", dest_path)?;
    }
    let tar_gz = tokio::fs::File::create(dest_path)
        .await
        .fs_context("creating archive", dest_path)?;
    let std_file = tar_gz.into_std().await;

    let src_dir = src_dir.to_path_buf();
    let dest = dest_path.to_path_buf();
    tokio::task::spawn_blocking(move || -> Result<()> {
        let enc = GzEncoder::new(std_file, Compression::default());
        let mut tar = tar::Builder::new(enc);
        tar.follow_symlinks(false);
        tar.append_dir_all(".", &src_dir)
            .fs_context("archiving", &src_dir)?;

        let enc = tar.into_inner().fs_context("finishing archive", &dest)?;
        let mut finished = enc.finish().fs_context("compressing archive", &dest)?;
        finished.flush().fs_context("flushing archive", &dest)?;
        Ok(())
    })
    .await
    .map_err(|e| ReleaseError::Anyhow(anyhow::anyhow!("Archive task failed: {}", e)))??;

    log::info!("Created {}", dest_path.display());
    Ok(())
}

/// RPM built from a staged tree by `make rpm`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformPackage {
    /// Package file name
    pub file_name: String,
    /// Location of the built package inside the staged tree
    pub path: PathBuf,
}

impl PlatformPackage {
    /// Expected package for `version`:
    /// `<package>-<major>.<minor>-<release>.<arch>.rpm` under `resources/rpmbuild/RPMS/<arch>`
    pub fn rpm(tree: &TreeLayout, package: &str, version: &str, arch: &str) -> Result<Self> {
        let parsed = parse_release_version(version)?;
        let file_name = format!(
            "{}-{}.{}-{}.{}.rpm",
            package, parsed.major, parsed.minor, parsed.patch, arch
        );
        let path = tree
            .resources_dir()
            .join("rpmbuild")
            .join("RPMS")
            .join(arch)
            .join(&file_name);
        Ok(Self { file_name, path })
    }

    /// Run `make rpm` in the staged resources directory
    pub async fn build<R: CommandRunner>(&self, runner: &R, tree: &TreeLayout) -> Result<()> {
        runner
            .run(
                &ToolCommand::new("make")
                    .arg("rpm")
                    .current_dir(tree.resources_dir())
                    .discard(),
            )
            .await?;

        if !self.path.is_file() {
            return Err(ReleaseError::Fs {
                context: "locating built package",
                path: self.path.clone(),
                error: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "'make rpm' did not produce the expected package",
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use tempfile::TempDir;

    #[test]
    fn test_archive_name() {
        assert_eq!(archive_name("epicsqt", "3.1.0"), "epicsqt-3.1.0-src.tar.gz");
    }

    #[test]
    fn test_rpm_naming() {
        let tree = TreeLayout::new("/tmp/epicsqt/trunk");
        let package = PlatformPackage::rpm(&tree, "epics_qt_framework", "3.1.2", "i386").unwrap();
        assert_eq!(package.file_name, "epics_qt_framework-3.1-2.i386.rpm");
        assert_eq!(
            package.path,
            PathBuf::from(
                "/tmp/epicsqt/trunk/resources/rpmbuild/RPMS/i386/epics_qt_framework-3.1-2.i386.rpm"
            )
        );
    }

    #[test]
    fn test_rpm_rejects_short_version() {
        let tree = TreeLayout::new("/tmp/epicsqt/trunk");
        assert!(PlatformPackage::rpm(&tree, "epics_qt_framework", "3.1", "i386").is_err());
    }

    #[tokio::test]
    async fn test_source_archive_contents() {
        let dir = TempDir::new().unwrap();
        let export = dir.path().join("tags").join("3.1.0");
        std::fs::create_dir_all(export.join("framework")).unwrap();
        std::fs::write(export.join("releasenotes.txt"), "notes").unwrap();
        std::fs::write(export.join("framework").join("QEFrameworkVersion.h"), "#define").unwrap();

        let archive = dir.path().join(archive_name("epicsqt", "3.1.0"));
        std::fs::write(&archive, "stale").unwrap();
        create_source_archive(&export, &archive).await.unwrap();

        let file = std::fs::File::open(&archive).unwrap();
        let mut tar = tar::Archive::new(GzDecoder::new(file));
        let names: Vec<String> = tar
            .entries()
            .unwrap()
            .map(|entry| entry.unwrap().path().unwrap().display().to_string())
            .collect();

        assert!(names.iter().any(|n| n.ends_with("releasenotes.txt")));
        assert!(names.iter().any(|n| n.ends_with("framework/QEFrameworkVersion.h")));
    }
}
