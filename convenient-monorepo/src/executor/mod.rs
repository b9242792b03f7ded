//! Two-phase build execution
//!
//! Library requests run first. Standard requests run only when every
//! library build succeeded.

pub mod build_executor;
pub mod command;
pub mod types;

pub use build_executor::BuildExecutor;
pub use command::{BuildCommand, CommandOutput, ScriptCommand};
pub use types::{BuildRequest, BuildRequests, BuildStatus};
