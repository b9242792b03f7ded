//! Executes one phase of build requests

use super::command::BuildCommand;
use super::types::{BuildRequest, BuildRequests, BuildStatus};
use crate::error::Result;
use crate::installer::ArtifactStore;
use rayon::prelude::*;
use std::time::Instant;
use tracing::{error, info, warn};

/// Runs build requests and records each outcome on its request.
///
/// A failing build never stops its siblings; every request of the phase is
/// attempted. Errors are reserved for artifact distribution and worker pool
/// failures.
pub struct BuildExecutor<'a> {
    command: &'a dyn BuildCommand,
    store: Option<&'a dyn ArtifactStore>,
    jobs: usize,
}

impl<'a> BuildExecutor<'a> {
    /// Create a sequential executor
    pub fn new(command: &'a dyn BuildCommand) -> Self {
        Self {
            command,
            store: None,
            jobs: 1,
        }
    }

    /// Stage and publish artifacts through `store`
    pub fn with_store(mut self, store: &'a dyn ArtifactStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Run up to `jobs` builds of a phase at once
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Execute every request, in order when sequential.
    pub fn execute_builds(&self, requests: &mut BuildRequests) -> Result<()> {
        if self.jobs == 1 || requests.len() < 2 {
            for request in requests.as_mut_slice() {
                self.run_build(request)?;
            }
            return Ok(());
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()?;
        pool.install(|| {
            requests
                .as_mut_slice()
                .par_iter_mut()
                .try_for_each(|request| self.run_build(request))
        })
    }

    /// Execute a single request.
    pub fn run_build(&self, request: &mut BuildRequest) -> Result<()> {
        let name = request.project.name();
        info!("{} Building", name);

        if !request.project.needs_build {
            request.status = BuildStatus::NotNeeded;
            info!("{} Build not needed", name);
            return Ok(());
        }

        if let Some(store) = self.store {
            store.stage(&request.project)?;
        }

        request.status = BuildStatus::Running;
        let start = Instant::now();
        let result = self.command.run(&request.project.path);
        request.duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        let succeeded = match result {
            Ok(output) => {
                request.exit_code = output.exit_code;
                request.captured_output = output.output;
                output.exit_code == Some(0)
            }
            Err(e) => {
                warn!("{} Build command could not start: {}", name, e);
                request.captured_output = e.to_string().into_bytes();
                false
            }
        };
        request.status = BuildStatus::Complete;
        request.succeeded = Some(succeeded);

        if succeeded {
            info!("{} Build succeeded ({}ms)", name, request.duration_ms);
            if request.project.is_library() {
                if let Some(store) = self.store {
                    let _ = store.publish(&request.project)?;
                }
            }
        } else {
            error!(
                "{} Build failed (exit code: {:?})\n{}",
                name,
                request.exit_code,
                request.output_lossy()
            );
        }

        Ok(())
    }
}
