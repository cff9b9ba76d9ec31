//! Rebuild animation sample tables from declared keyframes.

use std::path::PathBuf;

use montage_animation_core::{rebake_element, rebake_shape};
use montage_timeline_model::{ElementAnimation, LoadedProject, TimelineElement};

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    println!("Baking animation tables at: {}", path.display());

    let mut project =
        LoadedProject::load(&path).map_err(|e| anyhow::anyhow!("Failed to load project: {e}"))?;

    let mut baked_elements = 0usize;
    let mut total_samples = 0usize;

    for element in project.timeline.elements.values_mut() {
        let baked = match element {
            TimelineElement::Video(e) => {
                rebake_element(&mut e.animation);
                true
            }
            TimelineElement::Image(e) => {
                rebake_element(&mut e.animation);
                true
            }
            TimelineElement::Text(e) => {
                rebake_element(&mut e.animation);
                true
            }
            TimelineElement::Shape(e) => {
                rebake_shape(&mut e.animation);
                true
            }
            TimelineElement::Gif(_) | TimelineElement::Audio(_) => false,
        };

        if baked {
            baked_elements += 1;
            total_samples += sample_count(element);
        }
    }

    project.project.touch();
    project
        .save()
        .map_err(|e| anyhow::anyhow!("Failed to save project: {e}"))?;

    println!("  Elements baked: {baked_elements}");
    println!("  Table samples: {total_samples}");
    println!(
        "\nSaved {}",
        path.join("meta").join("timeline.json").display()
    );

    Ok(())
}

fn sample_count(element: &TimelineElement) -> usize {
    match element {
        TimelineElement::Video(e) => animation_samples(&e.animation),
        TimelineElement::Image(e) => animation_samples(&e.animation),
        TimelineElement::Text(e) => animation_samples(&e.animation),
        TimelineElement::Shape(e) => e.animation.opacity.samples.len(),
        TimelineElement::Gif(_) | TimelineElement::Audio(_) => 0,
    }
}

fn animation_samples(animation: &ElementAnimation) -> usize {
    animation.position.x_samples.len()
        + animation.position.y_samples.len()
        + animation.opacity.samples.len()
        + animation.scale.samples.len()
        + animation.rotation.samples.len()
}
