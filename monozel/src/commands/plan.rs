//! Dry run: what would be built and why

use convenient_monorepo::{Configuration, Runner, ScriptCommand};

/// Print every project and whether it needs a build.
pub fn execute(
    config: &Configuration,
) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
    println!("📋 Build plan for {}", config.monorepo_root_folder.display());
    println!();

    let command = ScriptCommand::new(config.build_script.clone());
    let state = Runner::new(config, "plan", &command).plan()?;

    println!("{:<32} {:<10} {}", "PROJECT", "TYPE", "BUILD");
    for project in &state.projects {
        let name = project.name();
        let reason = if state.changes.new_projects.contains(&name) {
            "yes (new)"
        } else if state.changes.changed_projects.contains(&name) {
            "yes (files changed)"
        } else if state.changes.library_dependents.contains(&name) {
            "yes (library changed)"
        } else {
            "no"
        };
        println!("{:<32} {:<10} {}", name, project.project_type.to_string(), reason);
    }

    println!();
    println!(
        "📊 {} of {} projects need a build",
        state.changes.total(),
        state.projects.len()
    );

    Ok(true)
}
