//! Builder configuration
//!
//! The configuration is read once at startup and handed by reference to
//! discovery, change detection and the executor. On disk it is a JSON
//! document whose `config` key holds the settings:
//!
//! ```json
//! {
//!   "config": {
//!     "rootFolder": "/src/monorepo",
//!     "libraryFolder": "libraries",
//!     "standardFolders": ["platform", "web"],
//!     "installerFolder": "/srv/installers"
//!   }
//! }
//! ```

use crate::error::{MonorepoError, Result};
use crate::installer::staging_folder_name;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Setting keys accepted inside the `config` section.
const SETTINGS: &[&str] = &[
    "rootFolder",
    "libraryFolder",
    "standardFolders",
    "fileNamesToSkip",
    "extensionsToSkip",
    "skipHiddenFiles",
    "skipHiddenFolders",
    "projectListFilename",
    "versionListFilename",
    "installerFolder",
    "distributableFolder",
    "buildScript",
];

/// Settings consumed read-only by the builder core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Configuration {
    /// Monorepo root folder
    #[serde(rename = "rootFolder")]
    pub monorepo_root_folder: PathBuf,

    /// Name of the folder (under the root) holding library projects
    #[serde(rename = "libraryFolder")]
    pub library_folder_name: String,

    /// Names of the folders (under the root) holding standard projects
    #[serde(rename = "standardFolders")]
    pub standard_folder_list: Vec<String>,

    /// File or folder names never fingerprinted
    #[serde(rename = "fileNamesToSkip")]
    pub filenames_to_skip: Vec<String>,

    /// Extensions never fingerprinted, with or without the leading dot
    pub extensions_to_skip: Vec<String>,

    /// Skip dot-prefixed files
    pub skip_hidden_files: bool,

    /// Skip dot-prefixed folders
    pub skip_hidden_folders: bool,

    /// Project list snapshot from the last successful run
    pub project_list_filename: PathBuf,

    /// Version record snapshot from the last successful run
    pub version_list_filename: PathBuf,

    /// Shared folder receiving library artifacts; distribution is off when unset
    pub installer_folder: Option<PathBuf>,

    /// Folder inside a project where its build drops artifacts
    pub distributable_folder: String,

    /// Build script invoked from the project root
    pub build_script: String,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            monorepo_root_folder: PathBuf::from("."),
            library_folder_name: "libraries".to_string(),
            standard_folder_list: vec!["platform".to_string(), "web".to_string()],
            filenames_to_skip: [
                "bin",
                "lib",
                "include",
                "__pycache__",
                "reports",
                "node_modules",
                "dist",
                "build",
                "wheels",
                "installers",
                ".DS_Store",
                ".coverage",
                "coverage",
                "package-lock.json",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            extensions_to_skip: vec!["egg-info".to_string()],
            skip_hidden_files: true,
            skip_hidden_folders: true,
            project_list_filename: PathBuf::from(".projectlist"),
            version_list_filename: PathBuf::from(".versionlist"),
            installer_folder: None,
            distributable_folder: "dist".to_string(),
            build_script: "./build.sh".to_string(),
        }
    }
}

impl Configuration {
    /// Build a configuration from a parsed settings document.
    ///
    /// The document must contain a `config` object; every key inside it
    /// must be a known setting. Keys that are absent keep their defaults.
    pub fn from_settings(settings: &Value) -> Result<Self> {
        let section = settings
            .get("config")
            .and_then(Value::as_object)
            .ok_or_else(|| {
                MonorepoError::InvalidConfiguration(
                    "settings document has no `config` object".to_string(),
                )
            })?;

        if let Some(unknown) = section.keys().find(|k| !SETTINGS.contains(&k.as_str())) {
            return Err(MonorepoError::InvalidConfigurationSetting(unknown.clone()));
        }

        Ok(serde_json::from_value(Value::Object(section.clone()))?)
    }

    /// Load the configuration file, falling back to defaults when it is missing.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            warn!(
                "Configuration file {} not found, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        info!("Loading configuration from {}", path.display());
        let content =
            std::fs::read_to_string(path).map_err(|e| MonorepoError::io(path, e))?;
        let settings: Value = serde_json::from_str(&content)?;
        Self::from_settings(&settings)
    }

    /// Folder holding library projects.
    pub fn library_root(&self) -> PathBuf {
        self.monorepo_root_folder.join(&self.library_folder_name)
    }

    /// Folders holding standard projects, in configured order.
    pub fn standard_roots(&self) -> Vec<PathBuf> {
        self.standard_folder_list
            .iter()
            .map(|name| self.monorepo_root_folder.join(name))
            .collect()
    }

    /// Folder inside each project receiving shared installers, when distribution is on.
    pub fn staging_folder_name(&self) -> Option<&OsStr> {
        self.installer_folder.as_deref().map(staging_folder_name)
    }

    /// Whether `extension` (without dot) is on the skip-list.
    pub fn skips_extension(&self, extension: &str) -> bool {
        self.extensions_to_skip
            .iter()
            .any(|skip| skip.trim_start_matches('.') == extension)
    }
}
