//! Incremental builds for Python/Node monorepos.
//!
//! This crate detects which projects of a monorepo changed since the last
//! successful run and invokes each project's own build script only when
//! needed:
//!
//! 1. **Discovery**: library projects are found under the library folder
//!    (first directory holding a manifest wins), standard projects are the
//!    children of each standard folder. Every tracked file is fingerprinted
//!    by path and modification time.
//! 2. **Change detection**: fingerprints are compared with the snapshot of
//!    the last successful run. Standard projects whose manifest mentions a
//!    changed library are rebuilt too.
//! 3. **Execution**: libraries build first; standard projects build only if
//!    every library succeeded.
//! 4. **Persistence**: project and version snapshots are written only when
//!    the whole run succeeded.
//!
//! # Example
//!
//! ```no_run
//! use convenient_monorepo::{Configuration, Runner, ScriptCommand};
//!
//! # fn example() -> Result<(), convenient_monorepo::MonorepoError> {
//! let config = Configuration::load("monorepo-builder-config.json")?;
//! let command = ScriptCommand::new(config.build_script.clone());
//! let report = Runner::new(&config, "1.2.0", &command).run()?;
//! for name in &report.failed {
//!     eprintln!("{} failed", name);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![warn(unused_results)]

pub mod change;
pub mod config;
pub mod discovery;
pub mod error;
pub mod executor;
pub mod fingerprint;
pub mod installer;
pub mod project;
pub mod runner;
pub mod state;
pub mod version;

pub use change::{ChangeDetector, ChangeSummary};
pub use config::Configuration;
pub use discovery::{FileFilter, ProjectDiscovery};
pub use error::{MonorepoError, Result};
pub use executor::{
    BuildCommand, BuildExecutor, BuildRequest, BuildRequests, BuildStatus, CommandOutput,
    ScriptCommand,
};
pub use fingerprint::FileFingerprint;
pub use installer::{ArtifactStore, FolderArtifactStore};
pub use project::{Project, ProjectSet, ProjectType};
pub use runner::{RunReport, RunState, Runner};
pub use state::ProjectListStore;
pub use version::{VersionRecord, VersionStore, build_version_record};
