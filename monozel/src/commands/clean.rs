//! Forget the last successful run

use convenient_monorepo::Configuration;
use std::path::Path;

/// Delete both snapshots so the next build rebuilds every project.
pub fn execute(
    config: &Configuration,
) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
    println!("🧹 Cleaning saved build state...");
    println!();

    let mut removed = 0;
    for snapshot in [&config.project_list_filename, &config.version_list_filename] {
        if remove_snapshot(snapshot)? {
            println!("  Removed {}", snapshot.display());
            removed += 1;
        }
    }

    println!();
    if removed == 0 {
        println!("No saved state found");
    } else {
        println!("✅ State cleaned, the next build rebuilds every project");
    }
    Ok(true)
}

/// Remove `path`; a missing file is not an error.
fn remove_snapshot(path: &Path) -> std::io::Result<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}
