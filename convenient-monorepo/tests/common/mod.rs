//! Shared fixtures for integration tests

#![allow(dead_code)]

use convenient_monorepo::{BuildCommand, CommandOutput, Configuration};
use filetime::FileTime;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

/// Build command double: fails for chosen project names, records every call.
#[derive(Default)]
pub struct RecordingCommand {
    failing: HashSet<String>,
    calls: Mutex<Vec<PathBuf>>,
}

impl RecordingCommand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(names: &[&str]) -> Self {
        Self {
            failing: names.iter().map(|n| n.to_string()).collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Names of the projects built, in call order
    pub fn built(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().replace('_', "-"))
            .collect()
    }
}

impl BuildCommand for RecordingCommand {
    fn run(&self, project_dir: &Path) -> std::io::Result<CommandOutput> {
        self.calls.lock().unwrap().push(project_dir.to_path_buf());
        let name = project_dir.file_name().unwrap().to_string_lossy().to_string();
        let exit_code = if self.failing.contains(&name) { 1 } else { 0 };
        Ok(CommandOutput {
            exit_code: Some(exit_code),
            output: format!("building {}\n", name).into_bytes(),
        })
    }
}

/// A throwaway monorepo:
///
/// ```text
/// libraries/auth     requirements.txt, auth/__init__.py
/// libraries/db       package.json, index.js
/// web/site           package.json (depends on auth), src/app.js
/// platform/api       requirements.txt (depends on db), api/main.py
/// platform/batch     requirements.txt (no library), batch.py
/// ```
pub struct Monorepo {
    pub dir: TempDir,
}

impl Monorepo {
    pub fn new() -> Self {
        let repo = Self {
            dir: TempDir::new().unwrap(),
        };
        repo.write("libraries/auth/requirements.txt", "requests==2.31\n");
        repo.write("libraries/auth/auth/__init__.py", "VERSION = 1\n");
        repo.write("libraries/db/package.json", r#"{"name": "db"}"#);
        repo.write("libraries/db/index.js", "module.exports = {};\n");
        repo.write(
            "web/site/package.json",
            r#"{"name": "site", "dependencies": {"auth": "file:../../libraries/auth"}}"#,
        );
        repo.write("web/site/src/app.js", "console.log('hi');\n");
        repo.write("platform/api/requirements.txt", "db\nflask\n");
        repo.write("platform/api/api/main.py", "print('api')\n");
        repo.write("platform/batch/requirements.txt", "click\n");
        repo.write("platform/batch/batch.py", "print('batch')\n");
        repo
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Write a file with a fixed modification time so runs are comparable.
    pub fn write(&self, relative: &str, content: &str) {
        let path = self.path(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        filetime::set_file_mtime(&path, FileTime::from_unix_time(1_700_000_000, 0)).unwrap();
    }

    /// Bump a file's modification time without touching its content.
    pub fn touch(&self, relative: &str) {
        filetime::set_file_mtime(
            self.path(relative),
            FileTime::from_unix_time(1_800_000_000, 0),
        )
        .unwrap();
    }

    pub fn config(&self) -> Configuration {
        Configuration {
            monorepo_root_folder: self.root().to_path_buf(),
            project_list_filename: self.path("state/.projectlist"),
            version_list_filename: self.path("state/.versionlist"),
            ..Default::default()
        }
    }
}
