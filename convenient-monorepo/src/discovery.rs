//! Project discovery
//!
//! Library projects are found by descending the library folder until a
//! directory holding a manifest is reached; that directory becomes a project
//! and is not descended further. Standard projects are the immediate child
//! directories of each standard folder. Missing folders yield no projects.

use crate::config::Configuration;
use crate::error::Result;
use crate::fingerprint::FileFingerprint;
use crate::project::{Project, ProjectSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

/// Python-style dependency list
pub const REQUIREMENTS_FILE: &str = "requirements.txt";

/// Node-style package descriptor
pub const PACKAGE_FILE: &str = "package.json";

/// Files marking a directory as a project, in probe order.
pub const MANIFEST_FILES: &[&str] = &[REQUIREMENTS_FILE, PACKAGE_FILE];

/// Whether `dir` directly contains a recognized manifest.
pub fn is_project_dir(dir: &Path) -> bool {
    MANIFEST_FILES.iter().any(|m| dir.join(m).is_file())
}

/// Decides which entries of a project are fingerprinted.
#[derive(Debug, Clone)]
pub struct FileFilter<'a> {
    config: &'a Configuration,
}

impl<'a> FileFilter<'a> {
    /// Create a filter from the skip settings
    pub fn new(config: &'a Configuration) -> Self {
        Self { config }
    }

    /// Whether an entry is excluded.
    ///
    /// Checked in order: name skip-list (plus the installer staging folder),
    /// hidden folder/file, extension skip-list.
    pub fn excludes(&self, name: &str, is_dir: bool) -> bool {
        if self.config.filenames_to_skip.iter().any(|n| n == name) {
            return true;
        }
        if is_dir && self.config.staging_folder_name().is_some_and(|n| n == name) {
            return true;
        }
        let hidden = name.starts_with('.');
        if hidden && is_dir && self.config.skip_hidden_folders {
            return true;
        }
        if hidden && !is_dir && self.config.skip_hidden_files {
            return true;
        }
        Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| self.config.skips_extension(e))
    }

    fn includes(&self, entry: &DirEntry) -> bool {
        // the project root itself is never filtered
        if entry.depth() == 0 {
            return true;
        }
        let name = entry.file_name().to_string_lossy();
        !self.excludes(&name, entry.file_type().is_dir())
    }
}

/// Walks the configured folders and builds the current project set.
pub struct ProjectDiscovery<'a> {
    config: &'a Configuration,
}

impl<'a> ProjectDiscovery<'a> {
    /// Create a discovery pass over the configured monorepo
    pub fn new(config: &'a Configuration) -> Self {
        Self { config }
    }

    /// Discover library projects then standard projects, with fingerprints.
    pub fn discover(&self) -> Result<ProjectSet> {
        let mut projects = ProjectSet::new();

        let library_root = self.config.library_root();
        let library_dirs = library_project_dirs(&library_root, &FileFilter::new(self.config))?;
        debug!(
            "Found {} library projects under {}",
            library_dirs.len(),
            library_root.display()
        );
        for dir in library_dirs {
            projects.push(self.build_project(dir)?);
        }

        for standard_root in self.config.standard_roots() {
            let standard_dirs = child_dirs(&standard_root)?;
            debug!(
                "Found {} standard projects under {}",
                standard_dirs.len(),
                standard_root.display()
            );
            for dir in standard_dirs {
                projects.push(self.build_project(dir)?);
            }
        }

        info!(
            "Discovered {} projects ({} libraries)",
            projects.len(),
            projects.library_projects().count()
        );
        Ok(projects)
    }

    /// Create a project for `dir` with its current fingerprints.
    pub fn build_project(&self, dir: PathBuf) -> Result<Project> {
        let fingerprints = self.fingerprint_project(&dir)?;
        Ok(Project::new(
            dir,
            fingerprints,
            &self.config.library_folder_name,
        ))
    }

    /// Fingerprint every tracked file below `dir`.
    pub fn fingerprint_project(&self, dir: &Path) -> Result<Vec<FileFingerprint>> {
        let filter = FileFilter::new(self.config);
        let mut fingerprints = Vec::new();

        let walker = WalkDir::new(dir)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| filter.includes(e));

        for entry in walker {
            let entry = entry?;
            if entry.file_type().is_dir() {
                continue;
            }
            // symlinks count when they resolve to a regular file
            if entry.path().is_file() {
                fingerprints.push(FileFingerprint::from_file(entry.path())?);
            }
        }

        Ok(fingerprints)
    }
}

/// Library project directories below `root`, first manifest wins.
///
/// Folders the filter excludes (vendored packages, hidden folders) are
/// never searched.
pub fn library_project_dirs(root: &Path, filter: &FileFilter<'_>) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for dir in child_dirs(root)? {
        let excluded = dir
            .file_name()
            .is_some_and(|name| filter.excludes(&name.to_string_lossy(), true));
        if excluded {
            debug!("Not searching {} for libraries", dir.display());
            continue;
        }
        if is_project_dir(&dir) {
            found.push(dir);
        } else {
            found.extend(library_project_dirs(&dir, filter)?);
        }
    }
    Ok(found)
}

/// Immediate child directories of `folder`, sorted by name.
///
/// A missing folder has no children.
pub fn child_dirs(folder: &Path) -> Result<Vec<PathBuf>> {
    if !folder.is_dir() {
        return Ok(Vec::new());
    }

    let mut dirs = Vec::new();
    for entry in WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        if entry.path().is_dir() {
            dirs.push(entry.into_path());
        }
    }
    Ok(dirs)
}
