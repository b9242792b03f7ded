//! Project model

use crate::fingerprint::FileFingerprint;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Kind of project, derived from where it lives in the monorepo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectType {
    /// Lives under the library folder; built in the first phase
    Library,

    /// Everything else; built after all libraries succeeded
    Standard,
}

impl ProjectType {
    /// Library iff `library_folder_name` is an exact component of `path`.
    pub fn classify(path: &Path, library_folder_name: &str) -> Self {
        if path
            .components()
            .any(|c| c.as_os_str() == library_folder_name)
        {
            ProjectType::Library
        } else {
            ProjectType::Standard
        }
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Library => write!(f, "library"),
            Self::Standard => write!(f, "standard"),
        }
    }
}

/// A buildable directory in the monorepo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Project directory
    pub path: PathBuf,

    /// Fingerprints of every tracked file, unique by path
    pub fingerprints: Vec<FileFingerprint>,

    /// Derived project type
    pub project_type: ProjectType,

    /// Set by change detection; never persisted
    #[serde(skip)]
    pub needs_build: bool,
}

impl Project {
    /// Create a project, classifying it against the library folder name.
    pub fn new(
        path: impl Into<PathBuf>,
        fingerprints: Vec<FileFingerprint>,
        library_folder_name: &str,
    ) -> Self {
        let path = path.into();
        let project_type = ProjectType::classify(&path, library_folder_name);
        Self {
            path,
            fingerprints,
            project_type,
            needs_build: false,
        }
    }

    /// Name used to match projects across runs and in manifests.
    ///
    /// The last path segment with underscores normalized to hyphens.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().replace('_', "-"))
            .unwrap_or_default()
    }

    /// Whether this is a library project
    pub fn is_library(&self) -> bool {
        self.project_type == ProjectType::Library
    }
}

/// Ordered collection of projects for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectSet {
    projects: Vec<Project>,
}

impl ProjectSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a project
    pub fn push(&mut self, project: Project) {
        self.projects.push(project);
    }

    /// Number of projects
    pub fn len(&self) -> usize {
        self.projects.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Iterate in discovery order
    pub fn iter(&self) -> impl Iterator<Item = &Project> {
        self.projects.iter()
    }

    /// Iterate mutably in discovery order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Project> {
        self.projects.iter_mut()
    }

    /// Library projects, in discovery order
    pub fn library_projects(&self) -> impl Iterator<Item = &Project> {
        self.iter().filter(|p| p.project_type == ProjectType::Library)
    }

    /// Standard projects, in discovery order
    pub fn standard_projects(&self) -> impl Iterator<Item = &Project> {
        self.iter().filter(|p| p.project_type == ProjectType::Standard)
    }

    /// First project with the given name
    pub fn find_by_name(&self, name: &str) -> Option<&Project> {
        self.iter().find(|p| p.name() == name)
    }

    /// Projects whose `needs_build` flag is set
    pub fn needing_build(&self) -> impl Iterator<Item = &Project> {
        self.iter().filter(|p| p.needs_build)
    }
}

impl FromIterator<Project> for ProjectSet {
    fn from_iter<I: IntoIterator<Item = Project>>(iter: I) -> Self {
        Self {
            projects: iter.into_iter().collect(),
        }
    }
}

impl Extend<Project> for ProjectSet {
    fn extend<I: IntoIterator<Item = Project>>(&mut self, iter: I) {
        self.projects.extend(iter);
    }
}

impl IntoIterator for ProjectSet {
    type Item = Project;
    type IntoIter = std::vec::IntoIter<Project>;

    fn into_iter(self) -> Self::IntoIter {
        self.projects.into_iter()
    }
}

impl<'a> IntoIterator for &'a ProjectSet {
    type Item = &'a Project;
    type IntoIter = std::slice::Iter<'a, Project>;

    fn into_iter(self) -> Self::IntoIter {
        self.projects.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_library_project() {
        let project = Project::new("something/lib/project", vec![], "lib");
        assert_eq!(project.project_type, ProjectType::Library);
    }

    #[test]
    fn test_is_library_project_only_when_full_folder_name_used() {
        let project = Project::new("something/library/project", vec![], "lib");
        assert_eq!(project.project_type, ProjectType::Standard);
    }

    #[test]
    fn test_is_standard_project() {
        let project = Project::new("something/web/project", vec![], "lib");
        assert_eq!(project.project_type, ProjectType::Standard);
    }

    #[test]
    fn test_name_normalizes_underscores() {
        let project = Project::new("/repo/libraries/auth_client", vec![], "libraries");
        assert_eq!(project.name(), "auth-client");
    }

    #[test]
    fn test_needs_build_defaults_to_false() {
        let project = Project::new("/repo/web/site", vec![], "libraries");
        assert!(!project.needs_build);
    }

    #[test]
    fn test_library_and_standard_filters() {
        let projects: ProjectSet = vec![
            Project::new("/repo/libraries/auth", vec![], "libraries"),
            Project::new("/repo/web/site", vec![], "libraries"),
            Project::new("/repo/libraries/nested/db", vec![], "libraries"),
        ]
        .into_iter()
        .collect();

        let libraries: Vec<_> = projects.library_projects().map(Project::name).collect();
        let standard: Vec<_> = projects.standard_projects().map(Project::name).collect();

        assert_eq!(libraries, vec!["auth", "db"]);
        assert_eq!(standard, vec!["site"]);
    }

    #[test]
    fn test_find_by_name() {
        let projects: ProjectSet = vec![
            Project::new("/repo/libraries/auth", vec![], "libraries"),
            Project::new("/repo/web/my_site", vec![], "libraries"),
        ]
        .into_iter()
        .collect();

        assert!(projects.find_by_name("my-site").is_some());
        assert!(projects.find_by_name("missing").is_none());
    }
}
