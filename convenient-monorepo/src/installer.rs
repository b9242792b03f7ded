//! Artifact distribution between library builds and their dependents
//!
//! After a library builds successfully its installers are published to a
//! shared location. Before any project builds, the shared installers are
//! staged into the project so its build script can install them.

use crate::config::Configuration;
use crate::error::{MonorepoError, Result};
use crate::project::Project;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info};

/// Shared location for built library artifacts.
pub trait ArtifactStore: Send + Sync {
    /// Make sure the shared location exists
    fn prepare(&self) -> Result<()>;

    /// Copy shared artifacts into the project before it builds
    fn stage(&self, project: &Project) -> Result<()>;

    /// Copy the project's built artifacts to the shared location.
    ///
    /// Returns the number of artifacts published.
    fn publish(&self, project: &Project) -> Result<usize>;
}

/// Artifact store backed by a local (or mounted) folder.
///
/// Staging and publishing hold one lock, so parallel builds never copy a
/// half-written installer out of the shared folder.
#[derive(Debug)]
pub struct FolderArtifactStore {
    folder: PathBuf,
    distributable_folder: String,
    transfer: Mutex<()>,
}

impl FolderArtifactStore {
    /// Create a store over `folder`; artifacts are read from
    /// `<project>/<distributable_folder>`.
    pub fn new(folder: impl Into<PathBuf>, distributable_folder: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            distributable_folder: distributable_folder.into(),
            transfer: Mutex::new(()),
        }
    }

    /// Store configured by `installerFolder`, if any.
    pub fn from_config(config: &Configuration) -> Option<Self> {
        config
            .installer_folder
            .as_ref()
            .map(|folder| Self::new(folder, config.distributable_folder.clone()))
    }

    /// The shared folder
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Where shared artifacts land inside a project.
    pub fn staging_dir(&self, project: &Project) -> PathBuf {
        project.path.join(staging_folder_name(&self.folder))
    }
}

/// Name of the folder inside each project that receives shared installers.
///
/// Mirrors the shared folder's own name; never fingerprinted.
pub fn staging_folder_name(shared_folder: &Path) -> &OsStr {
    shared_folder
        .file_name()
        .unwrap_or_else(|| OsStr::new("installers"))
}

impl ArtifactStore for FolderArtifactStore {
    fn prepare(&self) -> Result<()> {
        std::fs::create_dir_all(&self.folder).map_err(|e| MonorepoError::io(&self.folder, e))
    }

    fn stage(&self, project: &Project) -> Result<()> {
        let target = self.staging_dir(project);
        let _transfer = self.transfer.lock().unwrap_or_else(PoisonError::into_inner);
        let copied = copy_files(&self.folder, &target).map_err(|message| {
            MonorepoError::Distribution {
                project: project.name(),
                message,
            }
        })?;
        debug!("Staged {} installers into {}", copied, target.display());
        Ok(())
    }

    fn publish(&self, project: &Project) -> Result<usize> {
        let source = project.path.join(&self.distributable_folder);
        if !source.is_dir() {
            debug!("{} has no {} folder", project.name(), self.distributable_folder);
            return Ok(0);
        }

        let _transfer = self.transfer.lock().unwrap_or_else(PoisonError::into_inner);
        let copied = copy_files(&source, &self.folder).map_err(|message| {
            MonorepoError::Distribution {
                project: project.name(),
                message,
            }
        })?;
        info!(
            "Published {} installers from {} to {}",
            copied,
            project.name(),
            self.folder.display()
        );
        Ok(copied)
    }
}

/// Copy the regular files directly inside `from` into `to`.
fn copy_files(from: &Path, to: &Path) -> std::result::Result<usize, String> {
    if !from.is_dir() {
        return Ok(0);
    }
    std::fs::create_dir_all(to).map_err(|e| format!("{}: {}", to.display(), e))?;

    let mut copied = 0;
    let entries = std::fs::read_dir(from).map_err(|e| format!("{}: {}", from.display(), e))?;
    for entry in entries {
        let entry = entry.map_err(|e| format!("{}: {}", from.display(), e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let destination = to.join(entry.file_name());
        let _ = std::fs::copy(&path, &destination)
            .map_err(|e| format!("{} -> {}: {}", path.display(), destination.display(), e))?;
        copied += 1;
    }
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn library(root: &Path) -> Project {
        let dir = root.join("libraries/auth");
        fs::create_dir_all(&dir).unwrap();
        Project::new(dir, vec![], "libraries")
    }

    #[test]
    fn test_publish_copies_distributables() {
        let tmp = TempDir::new().unwrap();
        let project = library(tmp.path());
        fs::create_dir_all(project.path.join("dist")).unwrap();
        fs::write(project.path.join("dist/auth-1.0.whl"), b"wheel").unwrap();

        let store = FolderArtifactStore::new(tmp.path().join("installers"), "dist");
        store.prepare().unwrap();
        let published = store.publish(&project).unwrap();

        assert_eq!(published, 1);
        assert!(tmp.path().join("installers/auth-1.0.whl").exists());
    }

    #[test]
    fn test_publish_without_dist_folder() {
        let tmp = TempDir::new().unwrap();
        let project = library(tmp.path());

        let store = FolderArtifactStore::new(tmp.path().join("installers"), "dist");

        assert_eq!(store.publish(&project).unwrap(), 0);
    }

    #[test]
    fn test_stage_copies_shared_installers() {
        let tmp = TempDir::new().unwrap();
        let shared = tmp.path().join("installers");
        fs::create_dir_all(&shared).unwrap();
        fs::write(shared.join("db-2.0.tgz"), b"tarball").unwrap();
        let project = library(tmp.path());

        let store = FolderArtifactStore::new(&shared, "dist");
        store.stage(&project).unwrap();

        assert!(project.path.join("installers/db-2.0.tgz").exists());
    }

    #[test]
    fn test_from_config() {
        assert!(FolderArtifactStore::from_config(&Configuration::default()).is_none());

        let config = Configuration {
            installer_folder: Some(PathBuf::from("/srv/installers")),
            ..Default::default()
        };
        let store = FolderArtifactStore::from_config(&config).unwrap();
        assert_eq!(store.folder(), Path::new("/srv/installers"));
    }

    #[test]
    fn test_concurrent_publish_and_stage_copy_whole_files() {
        let tmp = TempDir::new().unwrap();
        let shared = tmp.path().join("installers");
        let payload = vec![7u8; 256 * 1024];
        let libraries: Vec<Project> = (0..4)
            .map(|i| {
                let dir = tmp.path().join(format!("libraries/lib{}", i));
                fs::create_dir_all(dir.join("dist")).unwrap();
                fs::write(dir.join(format!("dist/lib{}-1.0.whl", i)), &payload).unwrap();
                Project::new(dir, vec![], "libraries")
            })
            .collect();
        let consumer = library(tmp.path());

        let store = FolderArtifactStore::new(&shared, "dist");
        store.prepare().unwrap();
        std::thread::scope(|scope| {
            for project in &libraries {
                let store = &store;
                let _ = scope.spawn(move || store.publish(project).unwrap());
            }
            let _ = scope.spawn(|| store.stage(&consumer).unwrap());
        });

        for entry in fs::read_dir(store.staging_dir(&consumer)).unwrap() {
            let staged = fs::read(entry.unwrap().path()).unwrap();
            assert_eq!(staged.len(), payload.len());
        }
        assert_eq!(fs::read_dir(&shared).unwrap().count(), 4);
    }
}
