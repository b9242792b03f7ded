//! Full incremental build

use convenient_monorepo::{Configuration, FolderArtifactStore, Runner, ScriptCommand};
use std::time::Instant;

/// Run every build the monorepo needs; returns whether the run succeeded.
pub fn execute(
    config: &Configuration,
    version: &str,
    jobs: usize,
) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
    let start_time = Instant::now();
    let jobs = if jobs == 0 { num_cpus::get() } else { jobs };

    println!("🏗️  Building {} (version {})", config.monorepo_root_folder.display(), version);
    println!("  Libraries: {}", config.library_root().display());
    for root in config.standard_roots() {
        println!("  Standard:  {}", root.display());
    }
    println!("  Jobs:      {}", jobs);
    println!();

    let command = ScriptCommand::new(config.build_script.clone());
    let store = FolderArtifactStore::from_config(config);

    let mut runner = Runner::new(config, version, &command).with_jobs(jobs);
    if let Some(store) = &store {
        println!("📦 Sharing installers through {}", store.folder().display());
        runner = runner.with_store(store);
    }

    let report = runner.run()?;

    println!();
    if report.built.is_empty() && report.failed.is_empty() {
        println!("✨ Nothing to build, every project is up to date");
    } else {
        for name in &report.built {
            println!("  ✓ {}", name);
        }
        for name in &report.failed {
            println!("  ✗ {}", name);
        }
    }
    println!();

    if report.success {
        println!(
            "✅ Build succeeded in {:.2}s ({} projects built)",
            start_time.elapsed().as_secs_f64(),
            report.built.len()
        );
    } else {
        eprintln!("❌ Build failed: {}", report.failed.join(", "));
        if report.standard_phase_skipped {
            eprintln!("   Standard projects were skipped because a library failed");
        }
        eprintln!("   Nothing was saved; the next build retries the same projects");
    }

    Ok(report.success)
}
