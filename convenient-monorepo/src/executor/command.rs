//! Invocation of a project's build script

use std::path::Path;
use std::process::Command;
use tracing::debug;

/// What a build script left behind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when terminated by a signal
    pub exit_code: Option<i32>,

    /// Stdout followed by stderr
    pub output: Vec<u8>,
}

impl CommandOutput {
    /// Zero exit code
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs the opaque build command of a project.
pub trait BuildCommand: Send + Sync {
    /// Run the build in `project_dir` and wait for it to exit.
    ///
    /// An `Err` means the command could not be started at all.
    fn run(&self, project_dir: &Path) -> std::io::Result<CommandOutput>;
}

/// Runs a script found in the project root, `./build.sh` by default.
#[derive(Debug, Clone)]
pub struct ScriptCommand {
    script: String,
}

impl ScriptCommand {
    /// Run `script` from each project root
    pub fn new(script: impl Into<String>) -> Self {
        Self {
            script: script.into(),
        }
    }
}

impl Default for ScriptCommand {
    fn default() -> Self {
        Self::new("./build.sh")
    }
}

impl BuildCommand for ScriptCommand {
    fn run(&self, project_dir: &Path) -> std::io::Result<CommandOutput> {
        // a relative script path is resolved against the project, not our cwd
        let program = if self.script.contains('/') {
            project_dir.join(&self.script)
        } else {
            Path::new(&self.script).to_path_buf()
        };
        debug!("Running {} in {}", program.display(), project_dir.display());

        let result = Command::new(&program).current_dir(project_dir).output()?;

        let mut output = result.stdout;
        output.extend_from_slice(&result.stderr);
        Ok(CommandOutput {
            exit_code: result.status.code(),
            output,
        })
    }
}
