//! End-to-end export runs over an in-memory asset store and a collecting
//! sink: frame pacing, sink protocol, determinism, and the visibility and
//! stacking rules as actual pixels.

use montage_asset_store::MemoryAssets;
use montage_render_engine::{render_timeline, CollectSink, RendererSet};
use montage_timeline_model::{
    ElementCommon, ExportOptions, Point, RenderOptions, ShapeAnimation, ShapeElement, Timeline,
    TimelineElement, VisualCommon,
};

fn square(
    key: &str,
    priority: i32,
    start_time: f64,
    duration: f64,
    x: f64,
    y: f64,
    size: f64,
    fill: &str,
) -> TimelineElement {
    TimelineElement::Shape(ShapeElement {
        common: ElementCommon {
            key: key.to_string(),
            priority,
            start_time,
            duration,
            location: Point::new(x, y),
            local_path: String::new(),
            timeline_color: String::new(),
        },
        visual: VisualCommon::sized(size, size),
        o_width: size,
        o_height: size,
        points: vec![[0.0, 0.0], [size, 0.0], [size, size], [0.0, size]],
        fill_color: fill.to_string(),
        animation: ShapeAnimation::default(),
    })
}

fn options(fps: u32, duration: f64) -> ExportOptions {
    ExportOptions {
        output_path: "/tmp/pipeline.mp4".into(),
        video_bitrate_kbps: 5000,
        render: RenderOptions {
            width: 48,
            height: 32,
            fps,
            duration,
            background_color: "#000000".to_string(),
        },
    }
}

async fn export(timeline: &Timeline, options: &ExportOptions) -> (MemoryAssets, CollectSink) {
    let mut assets = MemoryAssets::new();
    let mut sink = CollectSink::new();
    let renderers = RendererSet::with_defaults();

    render_timeline(&mut assets, timeline, &renderers, options, &mut sink, None)
        .await
        .expect("export should succeed");

    (assets, sink)
}

fn pixel(png: &[u8], x: u32, y: u32) -> [u8; 4] {
    let decoded = image::load_from_memory(png).expect("frame should decode");
    decoded.to_rgba8().get_pixel(x, y).0
}

#[tokio::test]
async fn frame_pacing_matches_fps_exactly() {
    let options = options(30, 2.0);
    let (assets, sink) = export(&Timeline::new(), &options).await;

    assert_eq!(sink.frames.len(), 60);
    assert_eq!(assets.load_calls(), 1);
    assert_eq!(assets.seek_times().len(), 60);
    for (i, time_ms) in assets.seek_times().iter().enumerate() {
        assert_eq!(*time_ms, i as f64 / 30.0 * 1000.0);
    }
}

#[tokio::test]
async fn sink_protocol_is_start_frames_finish() {
    let (_, sink) = export(&Timeline::new(), &options(10, 1.0)).await;

    assert_eq!(sink.started, 1);
    assert_eq!(sink.finished, 1);
    let expected: Vec<u64> = (0..10).collect();
    assert_eq!(sink.indices, expected);
}

#[tokio::test]
async fn export_is_deterministic_across_runs() {
    let mut timeline = Timeline::new();
    timeline.insert(square("a", 0, 0.0, 2000.0, 4.0, 4.0, 24.0, "#ff0000"));
    timeline.insert(square("b", 1, 500.0, 1000.0, 20.0, 4.0, 24.0, "#0000ff"));

    let options = options(8, 2.0);
    let (_, first) = export(&timeline, &options).await;
    let (_, second) = export(&timeline, &options).await;

    assert_eq!(first.frames.len(), 16);
    assert_eq!(first.frames, second.frames);
}

#[tokio::test]
async fn element_appears_only_inside_its_half_open_window() {
    let mut timeline = Timeline::new();
    timeline.insert(square("red", 0, 500.0, 1000.0, 8.0, 4.0, 24.0, "#ff0000"));

    // fps 4 samples at 0, 250, 500, ..., 1750.
    let (_, sink) = export(&timeline, &options(4, 2.0)).await;
    assert_eq!(sink.frames.len(), 8);

    let center = (20, 16);
    assert_eq!(pixel(&sink.frames[0], center.0, center.1), [0, 0, 0, 255]);
    assert_eq!(pixel(&sink.frames[1], center.0, center.1), [0, 0, 0, 255]);
    // Start boundary is inclusive.
    assert_eq!(pixel(&sink.frames[2], center.0, center.1), [255, 0, 0, 255]);
    assert_eq!(pixel(&sink.frames[5], center.0, center.1), [255, 0, 0, 255]);
    // End boundary is exclusive: start + duration is already off screen.
    assert_eq!(pixel(&sink.frames[6], center.0, center.1), [0, 0, 0, 255]);
    assert_eq!(pixel(&sink.frames[7], center.0, center.1), [0, 0, 0, 255]);
}

#[tokio::test]
async fn higher_priority_wins_in_the_overlap() {
    let mut timeline = Timeline::new();
    timeline.insert(square("red", 1, 0.0, 1000.0, 4.0, 4.0, 24.0, "#ff0000"));
    timeline.insert(square("blue", 2, 0.0, 1000.0, 20.0, 4.0, 24.0, "#0000ff"));

    let (_, sink) = export(&timeline, &options(1, 1.0)).await;
    assert_eq!(sink.frames.len(), 1);

    // Red covers x 4..28, blue covers x 20..44; they overlap in x 20..28.
    let frame = &sink.frames[0];
    assert_eq!(pixel(frame, 10, 16), [255, 0, 0, 255]);
    assert_eq!(pixel(frame, 40, 16), [0, 0, 255, 255]);
    assert_eq!(pixel(frame, 24, 16), [0, 0, 255, 255]);
}

#[tokio::test]
async fn swapping_priorities_flips_the_overlap() {
    let mut timeline = Timeline::new();
    timeline.insert(square("red", 3, 0.0, 1000.0, 4.0, 4.0, 24.0, "#ff0000"));
    timeline.insert(square("blue", 2, 0.0, 1000.0, 20.0, 4.0, 24.0, "#0000ff"));

    let (_, sink) = export(&timeline, &options(1, 1.0)).await;
    assert_eq!(pixel(&sink.frames[0], 24, 16), [255, 0, 0, 255]);
}
