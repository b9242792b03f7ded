//! Change detection between the current run and the last successful run
//!
//! Detection runs in two steps. First every project is compared against its
//! namesake from the previous run. Then every standard project whose
//! dependency manifest mentions a changed library is forced to rebuild.
//!
//! The library reference check is a plain substring search over the manifest
//! text: a library named `thing` also matches a dependency on `something`.

use crate::discovery::{PACKAGE_FILE, REQUIREMENTS_FILE};
use crate::error::{MonorepoError, Result};
use crate::fingerprint::sort_by_path;
use crate::project::{Project, ProjectSet, ProjectType};
use std::path::Path;
use tracing::{debug, info};

/// Outcome of a detection pass, for reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSummary {
    /// Projects with no counterpart in the previous run
    pub new_projects: Vec<String>,

    /// Projects whose own files changed
    pub changed_projects: Vec<String>,

    /// Standard projects forced to rebuild by a changed library
    pub library_dependents: Vec<String>,
}

impl ChangeSummary {
    /// Total number of projects that need a build
    pub fn total(&self) -> usize {
        self.new_projects.len() + self.changed_projects.len() + self.library_dependents.len()
    }
}

/// Whether `current` differs from its previous-run counterpart.
///
/// A missing counterpart, a different file count, or any path or timestamp
/// mismatch after sorting both sides by path means the project changed.
pub fn has_file_changes(current: &Project, previous: Option<&Project>) -> bool {
    let Some(previous) = previous else {
        return true;
    };
    if current.fingerprints.len() != previous.fingerprints.len() {
        return true;
    }

    let mut now = current.fingerprints.clone();
    let mut before = previous.fingerprints.clone();
    sort_by_path(&mut now);
    sort_by_path(&mut before);

    now.iter().zip(before.iter()).any(|(a, b)| a != b)
}

/// Raw text of a project's dependency manifest.
///
/// `requirements.txt` is preferred over `package.json`.
pub fn read_dependency_manifest(project_dir: &Path) -> Result<String> {
    for candidate in [REQUIREMENTS_FILE, PACKAGE_FILE] {
        let path = project_dir.join(candidate);
        if path.is_file() {
            return std::fs::read_to_string(&path).map_err(|e| MonorepoError::io(&path, e));
        }
    }
    Err(MonorepoError::RequirementsFileNotFound(
        project_dir.to_path_buf(),
    ))
}

/// Names of `libraries` found anywhere in `manifest`.
pub fn referenced_libraries<'a>(manifest: &str, libraries: &'a [String]) -> Vec<&'a str> {
    libraries
        .iter()
        .filter(|name| manifest.contains(name.as_str()))
        .map(String::as_str)
        .collect()
}

/// Sets `needs_build` on every current project.
pub struct ChangeDetector<'a> {
    previous: &'a ProjectSet,
}

impl<'a> ChangeDetector<'a> {
    /// Compare against the project set of the last successful run
    pub fn new(previous: &'a ProjectSet) -> Self {
        Self { previous }
    }

    /// Run both detection steps over `projects`.
    ///
    /// Fails with `RequirementsFileNotFound` when a standard project has no
    /// manifest to check library references against.
    pub fn mark_projects(&self, projects: &mut ProjectSet) -> Result<ChangeSummary> {
        let mut summary = ChangeSummary::default();
        self.mark_file_changes(projects, &mut summary);
        self.mark_library_dependents(projects, &mut summary)?;

        info!(
            "{} of {} projects need a build",
            projects.needing_build().count(),
            projects.len()
        );
        Ok(summary)
    }

    fn mark_file_changes(&self, projects: &mut ProjectSet, summary: &mut ChangeSummary) {
        for project in projects.iter_mut() {
            let name = project.name();
            let previous = self.previous.find_by_name(&name);
            project.needs_build = has_file_changes(project, previous);

            match (previous, project.needs_build) {
                (None, _) => {
                    debug!("{} is new", name);
                    summary.new_projects.push(name);
                }
                (Some(_), true) => {
                    debug!("{} has changed files", name);
                    summary.changed_projects.push(name);
                }
                (Some(_), false) => debug!("{} is unchanged", name),
            }
        }
    }

    // Must run after file changes are known for every library.
    fn mark_library_dependents(
        &self,
        projects: &mut ProjectSet,
        summary: &mut ChangeSummary,
    ) -> Result<()> {
        let changed_libraries: Vec<String> = projects
            .library_projects()
            .filter(|p| p.needs_build)
            .map(Project::name)
            .collect();

        for project in projects
            .iter_mut()
            .filter(|p| p.project_type == ProjectType::Standard)
        {
            let manifest = read_dependency_manifest(&project.path)?;
            let references = referenced_libraries(&manifest, &changed_libraries);
            if references.is_empty() {
                continue;
            }

            debug!(
                "{} references changed libraries: {}",
                project.name(),
                references.join(", ")
            );
            if !project.needs_build {
                project.needs_build = true;
                summary.library_dependents.push(project.name());
            }
        }

        Ok(())
    }
}
