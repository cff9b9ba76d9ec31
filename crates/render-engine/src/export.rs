//! The export pipeline: renders every output frame in sequence and
//! streams it to a sink.
//!
//! One frame is in flight at a time. The loop seeks the asset store,
//! composites, encodes the surface to PNG on the blocking pool, and
//! hands the bytes to the sink; `send_frame` completing is the
//! backpressure signal that lets the next frame start.

use std::time::Instant;

use montage_asset_store::AssetStore;
use montage_common::{MontageError, MontageResult};
use montage_timeline_model::{ExportOptions, Timeline};

use crate::compositor::{render_timeline_at_time, RendererSet};
use crate::sink::FrameSink;
use crate::surface::Surface;

/// Progress callback for export rendering.
pub type ProgressCallback = Box<dyn Fn(ExportProgress) + Send>;

/// Export progress report.
#[derive(Debug, Clone)]
pub struct ExportProgress {
    /// Current progress [0.0, 1.0].
    pub progress: f64,

    /// Frames rendered so far.
    pub frames_rendered: u64,

    /// Total frames to render.
    pub total_frames: u64,

    /// Estimated time remaining in seconds.
    pub eta_secs: f64,

    /// Current stage.
    pub stage: ExportStage,
}

/// Stages of the export process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStage {
    Preparing,
    Rendering,
    Encoding,
    Finalizing,
    Complete,
    Failed,
}

/// Render the timeline frame by frame and stream it into `sink`.
///
/// This is the main entry point for export. Frames are produced strictly
/// in ascending order; frame N+1 is never composited before frame N's
/// bytes were accepted by the sink. The progress callback fires once per
/// frame plus the stage transitions around the loop.
pub async fn render_timeline<A, S>(
    assets: &mut A,
    timeline: &Timeline,
    renderers: &RendererSet,
    options: &ExportOptions,
    sink: &mut S,
    progress: Option<ProgressCallback>,
) -> MontageResult<()>
where
    A: AssetStore,
    S: FrameSink,
{
    let result = drive_export(assets, timeline, renderers, options, sink, &progress).await;

    if let Err(err) = &result {
        tracing::error!(error = %err, "Export failed");
        if let Some(cb) = &progress {
            cb(ExportProgress {
                progress: 0.0,
                frames_rendered: 0,
                total_frames: options.render.total_frames(),
                eta_secs: 0.0,
                stage: ExportStage::Failed,
            });
        }
    }

    result
}

async fn drive_export<A, S>(
    assets: &mut A,
    timeline: &Timeline,
    renderers: &RendererSet,
    options: &ExportOptions,
    sink: &mut S,
    progress: &Option<ProgressCallback>,
) -> MontageResult<()>
where
    A: AssetStore,
    S: FrameSink,
{
    validate_options(options)?;

    let render = &options.render;
    let total_frames = render.total_frames();

    tracing::info!(
        output = %options.output_path.display(),
        width = render.width,
        height = render.height,
        fps = render.fps,
        duration = render.duration,
        total_frames,
        "Starting export"
    );

    if let Some(cb) = progress {
        cb(ExportProgress {
            progress: 0.0,
            frames_rendered: 0,
            total_frames,
            eta_secs: 0.0,
            stage: ExportStage::Preparing,
        });
    }

    let mut surface = Surface::new(render.width, render.height)?;

    assets.load_entire_timeline(timeline).await?;
    sink.start(options, timeline).await?;

    let started = Instant::now();

    for frame in 0..total_frames {
        let time_ms = render.frame_time_ms(frame);

        assets.seek(timeline, time_ms).await?;
        render_timeline_at_time(
            &mut surface,
            timeline,
            time_ms,
            renderers,
            &*assets,
            &render.background_color,
        );

        // PNG encoding is CPU-bound; the surface moves to the blocking
        // pool and back so the async loop itself never stalls an executor
        // thread. A failed encode aborts the export before the frame is
        // ever offered to the sink.
        let (encoded, returned) = tokio::task::spawn_blocking(move || {
            let bytes = surface.encode_png();
            (bytes, surface)
        })
        .await
        .map_err(|e| MontageError::export(format!("Frame encode task failed: {e}")))?;
        surface = returned;
        let bytes = encoded?;

        sink.send_frame(bytes, frame, total_frames).await?;

        let frames_rendered = frame + 1;
        let fraction = frames_rendered as f64 / total_frames as f64;
        let elapsed_secs = started.elapsed().as_secs_f64();
        let eta_secs = if fraction > 0.0 {
            ((elapsed_secs / fraction) - elapsed_secs).max(0.0)
        } else {
            0.0
        };

        tracing::debug!(frame, time_ms, "Frame sent");

        if let Some(cb) = progress {
            cb(ExportProgress {
                progress: fraction,
                frames_rendered,
                total_frames,
                eta_secs,
                stage: ExportStage::Rendering,
            });
        }
    }

    if let Some(cb) = progress {
        cb(ExportProgress {
            progress: 1.0,
            frames_rendered: total_frames,
            total_frames,
            eta_secs: 0.0,
            stage: ExportStage::Finalizing,
        });
    }

    sink.finish_stream().await?;

    tracing::info!(
        frames = total_frames,
        elapsed_secs = started.elapsed().as_secs_f64(),
        "Export finished"
    );

    if let Some(cb) = progress {
        cb(ExportProgress {
            progress: 1.0,
            frames_rendered: total_frames,
            total_frames,
            eta_secs: 0.0,
            stage: ExportStage::Complete,
        });
    }

    Ok(())
}

/// Fail fast on settings that would otherwise export nothing.
fn validate_options(options: &ExportOptions) -> MontageResult<()> {
    let render = &options.render;

    if render.fps == 0 {
        return Err(MontageError::invalid_render_options("fps must be positive"));
    }
    if !(render.duration > 0.0) {
        return Err(MontageError::invalid_render_options(
            "duration must be positive",
        ));
    }
    if render.width == 0 || render.height == 0 {
        return Err(MontageError::invalid_render_options(
            "output dimensions must be nonzero",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use montage_asset_store::MemoryAssets;
    use montage_timeline_model::RenderOptions;

    use crate::sink::CollectSink;

    fn options_with(fps: u32, duration: f64, width: u32, height: u32) -> ExportOptions {
        ExportOptions {
            output_path: "/tmp/out.mp4".into(),
            video_bitrate_kbps: 5000,
            render: RenderOptions {
                width,
                height,
                fps,
                duration,
                ..RenderOptions::default()
            },
        }
    }

    async fn export_with(options: &ExportOptions) -> (MontageResult<()>, CollectSink) {
        let mut assets = MemoryAssets::new();
        let mut sink = CollectSink::new();
        let renderers = RendererSet::with_defaults();
        let result = render_timeline(
            &mut assets,
            &Timeline::new(),
            &renderers,
            options,
            &mut sink,
            None,
        )
        .await;
        (result, sink)
    }

    #[tokio::test]
    async fn test_zero_fps_is_rejected_before_the_sink_starts() {
        let (result, sink) = export_with(&options_with(0, 2.0, 64, 64)).await;
        assert!(matches!(
            result,
            Err(MontageError::InvalidRenderOptions { .. })
        ));
        assert_eq!(sink.started, 0);
        assert_eq!(sink.finished, 0);
    }

    #[tokio::test]
    async fn test_zero_duration_is_rejected() {
        let (result, _) = export_with(&options_with(30, 0.0, 64, 64)).await;
        assert!(matches!(
            result,
            Err(MontageError::InvalidRenderOptions { .. })
        ));
    }

    #[tokio::test]
    async fn test_negative_duration_is_rejected() {
        let (result, _) = export_with(&options_with(30, -1.0, 64, 64)).await;
        assert!(matches!(
            result,
            Err(MontageError::InvalidRenderOptions { .. })
        ));
    }

    #[tokio::test]
    async fn test_zero_surface_is_rejected() {
        let (result, _) = export_with(&options_with(30, 2.0, 0, 64)).await;
        assert!(matches!(
            result,
            Err(MontageError::InvalidRenderOptions { .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_timeline_still_streams_every_frame() {
        let (result, sink) = export_with(&options_with(10, 0.5, 32, 32)).await;
        result.expect("export");
        assert_eq!(sink.started, 1);
        assert_eq!(sink.finished, 1);
        assert_eq!(sink.frames.len(), 5);
        assert_eq!(sink.indices, vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_progress_fires_once_per_frame_and_is_monotonic() {
        use std::sync::{Arc, Mutex};

        let seen: Arc<Mutex<Vec<ExportProgress>>> = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = Arc::clone(&seen);

        let mut assets = MemoryAssets::new();
        let mut sink = CollectSink::new();
        let renderers = RendererSet::with_defaults();
        let options = options_with(10, 0.5, 32, 32);

        render_timeline(
            &mut assets,
            &Timeline::new(),
            &renderers,
            &options,
            &mut sink,
            Some(Box::new(move |p| sink_seen.lock().unwrap().push(p))),
        )
        .await
        .expect("export");

        let seen = seen.lock().unwrap();
        assert_eq!(seen.first().map(|p| p.stage), Some(ExportStage::Preparing));
        assert_eq!(seen.last().map(|p| p.stage), Some(ExportStage::Complete));

        let rendering: Vec<_> = seen
            .iter()
            .filter(|p| p.stage == ExportStage::Rendering)
            .collect();
        assert_eq!(rendering.len(), 5);
        for pair in rendering.windows(2) {
            assert!(pair[1].progress >= pair[0].progress);
            assert_eq!(pair[1].frames_rendered, pair[0].frames_rendered + 1);
        }
        assert_eq!(rendering.last().map(|p| p.progress), Some(1.0));
    }
}
