//! Released version per project
//!
//! Rebuilt projects take the version label of the current run; untouched
//! projects keep the version they were last released with.

use crate::error::Result;
use crate::project::{Project, ProjectSet};
use crate::state::{StagedSnapshot, check_schema, read_snapshot, stage_snapshot};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Schema of the version record document
pub const VERSION_RECORD_SCHEMA: u32 = 1;

/// Mapping of project path to released version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionRecord {
    versions: BTreeMap<PathBuf, String>,
}

impl VersionRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Version recorded for `project`, if any
    pub fn get_version(&self, project: &Project) -> Option<&str> {
        self.versions.get(&project.path).map(String::as_str)
    }

    /// Record `version` for `project`
    pub fn add_project(&mut self, project: &Project, version: impl Into<String>) {
        let _ = self.versions.insert(project.path.clone(), version.into());
    }

    /// Number of recorded projects
    pub fn len(&self) -> usize {
        self.versions.len()
    }

    /// Whether nothing is recorded
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Iterate `(path, version)` sorted by path
    pub fn iter(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.versions
            .iter()
            .map(|(path, version)| (path.as_path(), version.as_str()))
    }
}

/// Versions for every current project after a successful run.
pub fn build_version_record(
    projects: &ProjectSet,
    current_version: &str,
    previous: &VersionRecord,
) -> VersionRecord {
    let mut record = VersionRecord::new();
    for project in projects {
        let version = if project.needs_build {
            current_version
        } else {
            previous.get_version(project).unwrap_or(current_version)
        };
        debug!("{} -> {}", project.name(), version);
        record.add_project(project, version);
    }
    record
}

#[derive(Debug, Serialize, Deserialize)]
struct VersionRecordSnapshot {
    schema: u32,
    versions: VersionRecord,
}

/// Loads and saves the version record snapshot.
#[derive(Debug, Clone)]
pub struct VersionStore {
    path: PathBuf,
}

impl VersionStore {
    /// Store backed by `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Snapshot file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record from the last successful run; empty when there is none.
    pub fn load(&self) -> Result<VersionRecord> {
        let Some(snapshot) = read_snapshot::<VersionRecordSnapshot>(&self.path)? else {
            return Ok(VersionRecord::new());
        };
        check_schema(&self.path, snapshot.schema, VERSION_RECORD_SCHEMA)?;
        Ok(snapshot.versions)
    }

    /// Replace the snapshot with `record`.
    pub fn save(&self, record: &VersionRecord) -> Result<()> {
        self.stage(record)?.commit()?;
        info!(
            "Saved {} project versions to {}",
            record.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Write `record` next to the snapshot without replacing it yet.
    pub(crate) fn stage(&self, record: &VersionRecord) -> Result<StagedSnapshot> {
        let snapshot = VersionRecordSnapshot {
            schema: VERSION_RECORD_SCHEMA,
            versions: record.clone(),
        };
        stage_snapshot(&self.path, &snapshot)
    }
}
