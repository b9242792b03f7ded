//! Build requests and their outcomes

use crate::project::{Project, ProjectSet, ProjectType};
use std::fmt;

/// Lifecycle of a build request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildStatus {
    /// Waiting for its phase
    #[default]
    NotStarted,

    /// Build script is executing
    Running,

    /// Build script exited; see `succeeded`
    Complete,

    /// Project did not need a build at dispatch time
    NotNeeded,
}

impl fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => write!(f, "not started"),
            Self::Running => write!(f, "running"),
            Self::Complete => write!(f, "complete"),
            Self::NotNeeded => write!(f, "not needed"),
        }
    }
}

/// One project's build attempt.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    /// Project to build
    pub project: Project,

    /// Current status
    pub status: BuildStatus,

    /// Set once, when the build completes
    pub succeeded: Option<bool>,

    /// Exit code of the build script, if it exited normally
    pub exit_code: Option<i32>,

    /// Combined stdout and stderr of the build script
    pub captured_output: Vec<u8>,

    /// Wall time of the build script in milliseconds
    pub duration_ms: u64,
}

impl BuildRequest {
    /// Create a request in `NotStarted`
    pub fn new(project: Project) -> Self {
        Self {
            project,
            status: BuildStatus::NotStarted,
            succeeded: None,
            exit_code: None,
            captured_output: Vec::new(),
            duration_ms: 0,
        }
    }

    /// Captured output as text
    pub fn output_lossy(&self) -> String {
        String::from_utf8_lossy(&self.captured_output).into_owned()
    }
}

/// Ordered list of build requests for one or both phases.
#[derive(Debug, Clone, Default)]
pub struct BuildRequests {
    requests: Vec<BuildRequest>,
}

impl BuildRequests {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests for library projects that need a build, in discovery order
    pub fn library_projects(projects: &ProjectSet) -> Self {
        Self::for_type(projects, ProjectType::Library)
    }

    /// Requests for standard projects that need a build, in discovery order
    pub fn standard_projects(projects: &ProjectSet) -> Self {
        Self::for_type(projects, ProjectType::Standard)
    }

    fn for_type(projects: &ProjectSet, project_type: ProjectType) -> Self {
        projects
            .iter()
            .filter(|p| p.project_type == project_type && p.needs_build)
            .cloned()
            .map(BuildRequest::new)
            .collect()
    }

    /// True iff there are no requests or every request succeeded.
    pub fn success(&self) -> bool {
        self.requests.iter().all(|r| r.succeeded == Some(true))
    }

    /// Requests whose build ran and failed
    pub fn failed(&self) -> Vec<&BuildRequest> {
        self.requests
            .iter()
            .filter(|r| r.succeeded == Some(false))
            .collect()
    }

    /// Append another phase's requests
    pub fn append(&mut self, other: BuildRequests) {
        self.requests.extend(other.requests);
    }

    /// Number of requests
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    /// Whether there are no requests
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Iterate in order
    pub fn iter(&self) -> impl Iterator<Item = &BuildRequest> {
        self.requests.iter()
    }

    /// Requests as a mutable slice, one element per worker
    pub fn as_mut_slice(&mut self) -> &mut [BuildRequest] {
        &mut self.requests
    }
}

impl FromIterator<BuildRequest> for BuildRequests {
    fn from_iter<I: IntoIterator<Item = BuildRequest>>(iter: I) -> Self {
        Self {
            requests: iter.into_iter().collect(),
        }
    }
}
