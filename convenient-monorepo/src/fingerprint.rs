//! File fingerprint for change detection

use crate::error::{MonorepoError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

/// A file's identity and modification time.
///
/// Two fingerprints are equal iff both the path and the timestamp match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileFingerprint {
    /// Path of the file as discovered
    pub path: PathBuf,

    /// Modification time in nanoseconds since the Unix epoch
    pub modified_at: u64,
}

impl FileFingerprint {
    /// Create a fingerprint from known values
    pub fn new(path: impl Into<PathBuf>, modified_at: u64) -> Self {
        Self {
            path: path.into(),
            modified_at,
        }
    }

    /// Fingerprint a file on disk from its metadata.
    pub fn from_file(path: &Path) -> Result<Self> {
        let metadata = std::fs::metadata(path).map_err(|e| MonorepoError::io(path, e))?;
        let modified = metadata.modified().map_err(|e| MonorepoError::io(path, e))?;
        // pre-epoch timestamps collapse to 0
        let modified_at = modified
            .duration_since(UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
            .unwrap_or(0);

        Ok(Self::new(path, modified_at))
    }
}

/// Sort fingerprints into the canonical order used for comparison.
pub fn sort_by_path(fingerprints: &mut [FileFingerprint]) {
    fingerprints.sort_by(|a, b| a.path.as_os_str().cmp(b.path.as_os_str()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::FileTime;
    use tempfile::TempDir;

    #[test]
    fn test_from_file() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("setup.py");
        std::fs::write(&file, b"print('hi')").unwrap();
        filetime::set_file_mtime(&file, FileTime::from_unix_time(1000, 0)).unwrap();

        let fingerprint = FileFingerprint::from_file(&file).unwrap();

        assert_eq!(fingerprint.path, file);
        assert_eq!(fingerprint.modified_at, 1_000_000_000_000);
    }

    #[test]
    fn test_from_missing_file() {
        let tmp = TempDir::new().unwrap();
        let result = FileFingerprint::from_file(&tmp.path().join("gone"));
        assert!(matches!(result, Err(MonorepoError::Io { .. })));
    }

    #[test]
    fn test_equality_needs_path_and_time() {
        let a = FileFingerprint::new("first", 1);
        assert_eq!(a, FileFingerprint::new("first", 1));
        assert_ne!(a, FileFingerprint::new("first", 2));
        assert_ne!(a, FileFingerprint::new("second", 1));
    }

    #[test]
    fn test_sort_by_path() {
        let mut fingerprints = vec![
            FileFingerprint::new("b/setup.py", 1),
            FileFingerprint::new("a/z.py", 2),
            FileFingerprint::new("a/b.py", 3),
        ];

        sort_by_path(&mut fingerprints);

        let paths: Vec<_> = fingerprints.iter().map(|f| f.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("a/b.py"),
                PathBuf::from("a/z.py"),
                PathBuf::from("b/setup.py")
            ]
        );
    }
}
