//! Create a new Montage project.

use std::path::PathBuf;

use montage_animation_core::{rebake_element, rebake_shape};
use montage_timeline_model::{
    AnimationChannel, ElementAnimation, ElementCommon, Keyframe, LoadedProject, Point,
    PositionChannel, ShapeAnimation, ShapeElement, TextAlign, TextBackground, TextElement,
    TextOutline, TimelineElement, VisualCommon,
};

pub fn run(
    name: String,
    output: PathBuf,
    width: u32,
    height: u32,
    fps: u32,
    demo: bool,
) -> anyhow::Result<()> {
    let project_dir = output.join(&name);
    println!("Creating project '{}' at {}", name, project_dir.display());

    let mut project = LoadedProject::create(&project_dir, &name)
        .map_err(|e| anyhow::anyhow!("Failed to create project: {e}"))?;

    project.project.options.width = width;
    project.project.options.height = height;
    project.project.options.fps = fps;

    if demo {
        seed_demo_timeline(&mut project, f64::from(width), f64::from(height));
        project.project.options.duration = 5.0;
    }

    project
        .save()
        .map_err(|e| anyhow::anyhow!("Failed to save project: {e}"))?;

    println!("Project created:");
    println!("  Directory: {}", project.root.display());
    println!("  Resolution: {}x{} @ {}fps", width, height, fps);
    if demo {
        println!("  Timeline: {} demo elements", project.timeline.len());
    }
    println!();
    println!("Directory structure:");
    println!("  {}/", name);
    println!("  ├── assets/      (media files referenced by the timeline)");
    println!("  ├── meta/        (project.json, timeline.json)");
    println!("  ├── cache/       (extracted video frames)");
    println!("  └── exports/     (rendered output)");

    Ok(())
}

/// A small scene that exercises stacking, animation, and text without any
/// media files: a fading backdrop, an accent bar, and a rising title.
fn seed_demo_timeline(project: &mut LoadedProject, width: f64, height: f64) {
    let mut backdrop_fade = ShapeAnimation {
        opacity: AnimationChannel {
            is_activate: true,
            keyframes: vec![Keyframe::linear(0.0, 0.0), Keyframe::linear(800.0, 100.0)],
            ..AnimationChannel::default()
        },
    };
    rebake_shape(&mut backdrop_fade);

    project.timeline.insert(TimelineElement::Shape(ShapeElement {
        common: ElementCommon {
            key: "backdrop".to_string(),
            priority: 0,
            start_time: 0.0,
            duration: 5000.0,
            location: Point::new(0.0, 0.0),
            local_path: String::new(),
            timeline_color: "#2c3e50".to_string(),
        },
        visual: VisualCommon::sized(width, height),
        o_width: width,
        o_height: height,
        points: vec![[0.0, 0.0], [width, 0.0], [width, height], [0.0, height]],
        fill_color: "#16233b".to_string(),
        animation: backdrop_fade,
    }));

    let bar_width = width * 0.3;
    project.timeline.insert(TimelineElement::Shape(ShapeElement {
        common: ElementCommon {
            key: "accent".to_string(),
            priority: 1,
            start_time: 600.0,
            duration: 4400.0,
            location: Point::new(width * 0.1, height * 0.62),
            local_path: String::new(),
            timeline_color: "#e74c3c".to_string(),
        },
        visual: VisualCommon::sized(bar_width, 12.0),
        o_width: bar_width,
        o_height: 12.0,
        points: vec![
            [0.0, 0.0],
            [bar_width, 0.0],
            [bar_width, 12.0],
            [0.0, 12.0],
        ],
        fill_color: "#ff5533".to_string(),
        animation: ShapeAnimation::default(),
    }));

    let title_y = height * 0.5;
    let mut title_rise = ElementAnimation {
        position: PositionChannel {
            is_activate: true,
            y_keyframes: vec![
                Keyframe::linear(0.0, title_y + 24.0),
                Keyframe::linear(600.0, title_y),
            ],
            ..PositionChannel::default()
        },
        ..ElementAnimation::default()
    };
    rebake_element(&mut title_rise);

    project.timeline.insert(TimelineElement::Text(TextElement {
        common: ElementCommon {
            key: "title".to_string(),
            priority: 5,
            start_time: 400.0,
            duration: 4600.0,
            location: Point::new(width * 0.1, title_y),
            local_path: String::new(),
            timeline_color: "#ecf0f1".to_string(),
        },
        visual: VisualCommon::sized(width * 0.8, 72.0),
        parent_key: None,
        text: project.project.name.clone(),
        text_color: "#ffffff".to_string(),
        font_size: 64.0,
        font_path: String::new(),
        font_name: String::new(),
        letter_spacing: 0.0,
        align: TextAlign::Center,
        bold: false,
        italic: false,
        outline: TextOutline::default(),
        background: TextBackground::default(),
        width_inner: width * 0.8,
        animation: title_rise,
    }));
}
