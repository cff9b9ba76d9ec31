//! Validate a Montage project directory.

use std::path::PathBuf;

use montage_timeline_model::LoadedProject;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    println!("Validating project at: {}", path.display());

    let project =
        LoadedProject::load(&path).map_err(|e| anyhow::anyhow!("Failed to load project: {e}"))?;

    println!("  Name: {}", project.project.name);
    println!("  Version: {}", project.project.version);
    println!("  Elements: {}", project.timeline.len());

    let mut issues = project.validate_sources();

    // Exporting with these would fail immediately; flag them here.
    let options = &project.project.options;
    if options.fps == 0 {
        issues.push("render options: fps is zero".to_string());
    }
    if !(options.duration > 0.0) {
        issues.push("render options: duration is not positive".to_string());
    }
    if options.width == 0 || options.height == 0 {
        issues.push("render options: output size is zero".to_string());
    }

    if issues.is_empty() {
        println!("  Sources: all present");
        println!("\nProject is valid.");
    } else {
        println!("\nValidation issues:");
        for issue in &issues {
            println!("  - {issue}");
        }
        println!(
            "\n{} issue(s) found. Export may fail or render gaps.",
            issues.len()
        );
    }

    Ok(())
}
