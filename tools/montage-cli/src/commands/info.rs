//! Show project information.

use std::path::PathBuf;

use montage_timeline_model::{ElementAnimation, FileType, LoadedProject, TimelineElement};

pub fn run(path: PathBuf, json: bool) -> anyhow::Result<()> {
    let project =
        LoadedProject::load(&path).map_err(|e| anyhow::anyhow!("Failed to load project: {e}"))?;

    if json {
        let summary = serde_json::json!({
            "project": project.project,
            "elements": project.timeline.len(),
            "animated_elements": project.timeline.values().filter(|e| is_animated(e)).count(),
            "content_end_ms": project.timeline.total_duration_ms(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let p = &project.project;

    println!("Project: {}", p.name);
    println!("  ID: {}", p.id);
    println!("  Created: {}", p.created_at);
    println!("  Modified: {}", p.modified_at);
    println!();

    println!("Render options:");
    println!(
        "  Resolution: {}x{} @ {}fps",
        p.options.width, p.options.height, p.options.fps
    );
    println!(
        "  Duration: {}s ({} frames)",
        p.options.duration,
        p.options.total_frames()
    );
    println!("  Background: {}", p.options.background_color);
    println!();

    println!("Timeline:");
    println!("  Elements: {}", project.timeline.len());
    for filetype in [
        FileType::Video,
        FileType::Image,
        FileType::Gif,
        FileType::Shape,
        FileType::Text,
        FileType::Audio,
    ] {
        let count = project
            .timeline
            .values()
            .filter(|e| e.filetype() == filetype)
            .count();
        if count > 0 {
            println!("    {filetype}: {count}");
        }
    }
    println!(
        "  Animated: {}",
        project.timeline.values().filter(|e| is_animated(e)).count()
    );
    println!(
        "  Content ends at: {:.1}s",
        project.timeline.total_duration_ms() / 1000.0
    );

    Ok(())
}

fn is_animated(element: &TimelineElement) -> bool {
    match element {
        TimelineElement::Video(e) => has_declared_channels(&e.animation),
        TimelineElement::Image(e) => has_declared_channels(&e.animation),
        TimelineElement::Text(e) => has_declared_channels(&e.animation),
        TimelineElement::Shape(e) => {
            !e.animation.opacity.keyframes.is_empty() || !e.animation.opacity.samples.is_empty()
        }
        TimelineElement::Gif(_) | TimelineElement::Audio(_) => false,
    }
}

fn has_declared_channels(animation: &ElementAnimation) -> bool {
    !animation.position.x_keyframes.is_empty()
        || !animation.position.y_keyframes.is_empty()
        || !animation.position.x_samples.is_empty()
        || !animation.position.y_samples.is_empty()
        || !animation.opacity.keyframes.is_empty()
        || !animation.opacity.samples.is_empty()
        || !animation.scale.keyframes.is_empty()
        || !animation.scale.samples.is_empty()
        || !animation.rotation.keyframes.is_empty()
        || !animation.rotation.samples.is_empty()
}
