//! Orchestration of a complete run
//!
//! discovery → change detection → library phase → standard phase →
//! persistence. Snapshots are only written when every build succeeded, so
//! the next run compares against the last known good state.

use crate::change::{ChangeDetector, ChangeSummary};
use crate::config::Configuration;
use crate::discovery::ProjectDiscovery;
use crate::error::Result;
use crate::executor::{BuildCommand, BuildExecutor, BuildRequests};
use crate::installer::ArtifactStore;
use crate::project::ProjectSet;
use crate::state::ProjectListStore;
use crate::version::{VersionRecord, VersionStore, build_version_record};
use std::time::Instant;
use tracing::{error, info, warn};

/// Everything one invocation knows about its projects and builds.
#[derive(Debug, Clone, Default)]
pub struct RunState {
    /// Projects discovered in this run, with `needs_build` set
    pub projects: ProjectSet,

    /// Projects from the last successful run
    pub previous: ProjectSet,

    /// Versions from the last successful run
    pub previous_versions: VersionRecord,

    /// Why projects need a build
    pub changes: ChangeSummary,

    /// Library requests followed by standard requests when reached
    pub requests: BuildRequests,

    /// Standard projects were not attempted because a library failed
    pub standard_phase_skipped: bool,

    /// Final verdict, set once builds ran
    pub success: Option<bool>,
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Every attempted build succeeded
    pub success: bool,

    /// Version label of this run
    pub version: String,

    /// Projects whose build succeeded
    pub built: Vec<String>,

    /// Projects whose build failed
    pub failed: Vec<String>,

    /// Standard projects were not attempted
    pub standard_phase_skipped: bool,

    /// Snapshots were written
    pub persisted: bool,
}

/// Drives a run over a monorepo.
pub struct Runner<'a> {
    config: &'a Configuration,
    version: String,
    command: &'a dyn BuildCommand,
    store: Option<&'a dyn ArtifactStore>,
    jobs: usize,
}

impl<'a> Runner<'a> {
    /// Create a runner that builds with `command` and labels releases `version`
    pub fn new(
        config: &'a Configuration,
        version: impl Into<String>,
        command: &'a dyn BuildCommand,
    ) -> Self {
        Self {
            config,
            version: version.into(),
            command,
            store: None,
            jobs: 1,
        }
    }

    /// Distribute library artifacts through `store`
    pub fn with_store(mut self, store: &'a dyn ArtifactStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Allow up to `jobs` concurrent builds within a phase
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    fn project_list_store(&self) -> ProjectListStore {
        ProjectListStore::new(&self.config.project_list_filename)
    }

    fn version_store(&self) -> VersionStore {
        VersionStore::new(&self.config.version_list_filename)
    }

    /// Discover projects and decide which need a build.
    pub fn gather_projects(&self) -> Result<RunState> {
        info!("Creating project list");
        let mut projects = ProjectDiscovery::new(self.config).discover()?;
        let previous = self.project_list_store().load()?;
        let previous_versions = self.version_store().load()?;

        info!("Identifying projects requiring a build");
        let changes = ChangeDetector::new(&previous).mark_projects(&mut projects)?;

        Ok(RunState {
            projects,
            previous,
            previous_versions,
            changes,
            ..Default::default()
        })
    }

    /// Build libraries, then standard projects if every library succeeded.
    pub fn do_builds(&self, state: &mut RunState) -> Result<()> {
        let mut executor = BuildExecutor::new(self.command).with_jobs(self.jobs);
        if let Some(store) = self.store {
            executor = executor.with_store(store);
        }

        let mut requests = BuildRequests::library_projects(&state.projects);
        info!("Building {} library projects", requests.len());
        executor.execute_builds(&mut requests)?;

        if requests.success() {
            let mut standard = BuildRequests::standard_projects(&state.projects);
            info!("Building {} standard projects", standard.len());
            executor.execute_builds(&mut standard)?;
            requests.append(standard);
        } else {
            warn!("Library builds failed, standard projects will not be built");
            state.standard_phase_skipped = true;
        }

        state.success = Some(requests.success());
        state.requests = requests;
        Ok(())
    }

    /// Persist snapshots after a fully successful run; returns whether it did.
    pub fn finish(&self, state: &RunState) -> Result<bool> {
        if state.success != Some(true) {
            error!("Builds failed");
            for request in state.requests.failed() {
                error!("{} failed", request.project.name());
            }
            return Ok(false);
        }

        let versions =
            build_version_record(&state.projects, &self.version, &state.previous_versions);

        // both documents are written before either replaces the last good run
        let project_list = self.project_list_store().stage(&state.projects)?;
        let version_record = self.version_store().stage(&versions)?;

        // the project list goes last: once it moves, this run is the baseline
        version_record.commit()?;
        project_list.commit()?;
        info!(
            "All builds completed successfully, saved {} projects and {} versions",
            state.projects.len(),
            versions.len()
        );
        Ok(true)
    }

    /// Complete run: gather, build, persist.
    pub fn run(&self) -> Result<RunReport> {
        info!("Starting the build (version {})", self.version);
        let start = Instant::now();

        if let Some(store) = self.store {
            store.prepare()?;
        }

        let mut state = self.gather_projects()?;
        self.do_builds(&mut state)?;
        let persisted = self.finish(&state)?;

        info!("Build complete in {:.2}s", start.elapsed().as_secs_f64());
        Ok(RunReport {
            success: state.success == Some(true),
            version: self.version.clone(),
            built: state
                .requests
                .iter()
                .filter(|r| r.succeeded == Some(true))
                .map(|r| r.project.name())
                .collect(),
            failed: state
                .requests
                .failed()
                .iter()
                .map(|r| r.project.name())
                .collect(),
            standard_phase_skipped: state.standard_phase_skipped,
            persisted,
        })
    }

    /// Decide what would be built without building or persisting anything.
    pub fn plan(&self) -> Result<RunState> {
        self.gather_projects()
    }
}
