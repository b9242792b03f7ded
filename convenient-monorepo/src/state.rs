//! Project list snapshot from the last successful run
//!
//! Stored as a JSON document with a schema number so that an older or newer
//! snapshot is rejected instead of being misread.

use crate::error::{MonorepoError, Result};
use crate::project::ProjectSet;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Schema of the project list document
pub const PROJECT_LIST_SCHEMA: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct ProjectListSnapshot {
    schema: u32,
    saved_at: DateTime<Utc>,
    projects: ProjectSet,
}

/// Loads and saves the project list snapshot.
#[derive(Debug, Clone)]
pub struct ProjectListStore {
    path: PathBuf,
}

impl ProjectListStore {
    /// Store backed by `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Snapshot file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Projects from the last successful run; empty when there is none.
    pub fn load(&self) -> Result<ProjectSet> {
        let Some(snapshot) = read_snapshot::<ProjectListSnapshot>(&self.path)? else {
            info!("No previous project list at {}", self.path.display());
            return Ok(ProjectSet::new());
        };
        check_schema(&self.path, snapshot.schema, PROJECT_LIST_SCHEMA)?;

        debug!(
            "Loaded {} projects saved at {}",
            snapshot.projects.len(),
            snapshot.saved_at
        );
        Ok(snapshot.projects)
    }

    /// Replace the snapshot with `projects`.
    pub fn save(&self, projects: &ProjectSet) -> Result<()> {
        self.stage(projects)?.commit()?;
        info!(
            "Saved {} projects to {}",
            projects.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Write `projects` next to the snapshot without replacing it yet.
    pub(crate) fn stage(&self, projects: &ProjectSet) -> Result<StagedSnapshot> {
        let snapshot = ProjectListSnapshot {
            schema: PROJECT_LIST_SCHEMA,
            saved_at: Utc::now(),
            projects: projects.clone(),
        };
        stage_snapshot(&self.path, &snapshot)
    }
}

/// Read a JSON snapshot, `None` when the file does not exist.
pub(crate) fn read_snapshot<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|e| MonorepoError::io(path, e))?;
    Ok(Some(serde_json::from_str(&content)?))
}

/// A snapshot fully written to a temporary file beside its target.
///
/// Readers keep seeing the previous snapshot until `commit`. Dropping an
/// uncommitted snapshot removes the temporary file.
#[must_use]
#[derive(Debug)]
pub(crate) struct StagedSnapshot {
    temp_path: PathBuf,
    path: PathBuf,
    committed: bool,
}

impl StagedSnapshot {
    /// Atomically replace the target with the staged content.
    pub(crate) fn commit(mut self) -> Result<()> {
        fs::rename(&self.temp_path, &self.path).map_err(|e| MonorepoError::io(&self.path, e))?;
        self.committed = true;
        debug!("Committed snapshot {}", self.path.display());
        Ok(())
    }
}

impl Drop for StagedSnapshot {
    fn drop(&mut self) {
        if !self.committed {
            let _ = fs::remove_file(&self.temp_path);
        }
    }
}

/// Serialize `value` and write it to `<path>.tmp`, synced to disk.
pub(crate) fn stage_snapshot<T: Serialize>(path: &Path, value: &T) -> Result<StagedSnapshot> {
    let json = serde_json::to_string_pretty(value)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| MonorepoError::io(parent, e))?;
    }

    let mut temp_name = path.as_os_str().to_os_string();
    temp_name.push(".tmp");
    let staged = StagedSnapshot {
        temp_path: PathBuf::from(temp_name),
        path: path.to_path_buf(),
        committed: false,
    };

    let mut file =
        File::create(&staged.temp_path).map_err(|e| MonorepoError::io(&staged.temp_path, e))?;
    file.write_all(json.as_bytes())
        .map_err(|e| MonorepoError::io(&staged.temp_path, e))?;
    // data must be durable before the rename makes it visible
    file.sync_all()
        .map_err(|e| MonorepoError::io(&staged.temp_path, e))?;

    Ok(staged)
}

pub(crate) fn check_schema(path: &Path, found: u32, expected: u32) -> Result<()> {
    if found == expected {
        Ok(())
    } else {
        Err(MonorepoError::UnsupportedSnapshotSchema {
            path: path.to_path_buf(),
            found,
            expected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::FileFingerprint;
    use crate::project::Project;
    use tempfile::TempDir;

    fn sample_projects() -> ProjectSet {
        vec![
            Project::new(
                "/repo/libraries/auth",
                vec![
                    FileFingerprint::new("/repo/libraries/auth/setup.py", 10),
                    FileFingerprint::new("/repo/libraries/auth/auth/__init__.py", 11),
                ],
                "libraries",
            ),
            Project::new(
                "/repo/web/site",
                vec![FileFingerprint::new("/repo/web/site/package.json", 12)],
                "libraries",
            ),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_load_when_file_does_not_exist() {
        let tmp = TempDir::new().unwrap();
        let store = ProjectListStore::new(tmp.path().join(".projectlist"));

        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_and_reload() {
        let tmp = TempDir::new().unwrap();
        let store = ProjectListStore::new(tmp.path().join(".projectlist"));
        let mut projects = sample_projects();
        for project in projects.iter_mut() {
            project.needs_build = true;
        }

        store.save(&projects).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded.len(), 2);
        for (saved, reloaded) in projects.iter().zip(loaded.iter()) {
            assert_eq!(saved.path, reloaded.path);
            assert_eq!(saved.fingerprints, reloaded.fingerprints);
            assert_eq!(saved.project_type, reloaded.project_type);
            // the flag is per-run state
            assert!(!reloaded.needs_build);
        }
    }

    #[test]
    fn test_rejects_other_schema() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(".projectlist");
        std::fs::write(
            &path,
            r#"{ "schema": 99, "saved_at": "2024-01-01T00:00:00Z", "projects": [] }"#,
        )
        .unwrap();

        let result = ProjectListStore::new(&path).load();

        assert!(matches!(
            result,
            Err(MonorepoError::UnsupportedSnapshotSchema { found: 99, .. })
        ));
    }

    #[test]
    fn test_corrupt_snapshot_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(".projectlist");
        std::fs::write(&path, b"\x80\x04pickle").unwrap();

        assert!(ProjectListStore::new(&path).load().is_err());
    }

    #[test]
    fn test_staged_snapshot_is_invisible_until_commit() {
        let tmp = TempDir::new().unwrap();
        let store = ProjectListStore::new(tmp.path().join(".projectlist"));
        store.save(&ProjectSet::new()).unwrap();

        let staged = store.stage(&sample_projects()).unwrap();
        assert!(store.load().unwrap().is_empty());

        staged.commit().unwrap();
        assert_eq!(store.load().unwrap().len(), 2);
        assert!(!tmp.path().join(".projectlist.tmp").exists());
    }

    #[test]
    fn test_dropped_snapshot_leaves_previous_file() {
        let tmp = TempDir::new().unwrap();
        let store = ProjectListStore::new(tmp.path().join(".projectlist"));
        store.save(&ProjectSet::new()).unwrap();

        drop(store.stage(&sample_projects()).unwrap());

        assert!(store.load().unwrap().is_empty());
        assert!(!tmp.path().join(".projectlist.tmp").exists());
    }
}
