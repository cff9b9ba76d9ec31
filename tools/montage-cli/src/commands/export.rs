//! Export a project to video.

use std::io::Write;
use std::path::PathBuf;

use montage_asset_store::MediaLibrary;
use montage_render_engine::export::{render_timeline, ExportProgress, ProgressCallback};
use montage_render_engine::{FfmpegSink, PngDirSink, RendererSet};
use montage_timeline_model::{ExportOptions, LoadedProject};

#[allow(clippy::too_many_arguments)]
pub async fn run(
    path: PathBuf,
    output: Option<PathBuf>,
    fps: Option<u32>,
    width: Option<u32>,
    height: Option<u32>,
    duration: Option<f64>,
    bitrate: u32,
    frames_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    println!("Exporting project at: {}", path.display());

    let project =
        LoadedProject::load(&path).map_err(|e| anyhow::anyhow!("Failed to load project: {e}"))?;

    let output_path = output.unwrap_or_else(|| path.join("exports").join("output.mp4"));

    let mut render = project.project.options.clone();
    if let Some(fps) = fps {
        render.fps = fps;
    }
    if let Some(width) = width {
        render.width = width;
    }
    if let Some(height) = height {
        render.height = height;
    }
    if let Some(duration) = duration {
        render.duration = duration;
    }

    let options = ExportOptions {
        output_path: output_path.clone(),
        video_bitrate_kbps: bitrate,
        render,
    };

    println!(
        "  Resolution: {}x{} @ {}fps",
        options.render.width, options.render.height, options.render.fps
    );
    println!(
        "  Duration: {}s ({} frames)",
        options.render.duration,
        options.render.total_frames()
    );
    match &frames_dir {
        Some(dir) => println!("  Frames: {}", dir.display()),
        None => println!("  Output: {}", output_path.display()),
    }

    let mut assets = MediaLibrary::new(&path, path.join("cache"));
    let renderers = RendererSet::with_defaults();

    let progress_cb: ProgressCallback = Box::new(|p: ExportProgress| {
        print!(
            "\r  Progress: {:.1}% ({}/{} frames, ETA: {:.0}s)  ",
            p.progress * 100.0,
            p.frames_rendered,
            p.total_frames,
            p.eta_secs,
        );
        let _ = std::io::stdout().flush();
    });

    let result = match frames_dir {
        Some(dir) => {
            let mut sink = PngDirSink::new(&dir);
            render_timeline(
                &mut assets,
                &project.timeline,
                &renderers,
                &options,
                &mut sink,
                Some(progress_cb),
            )
            .await
            .map(|()| dir)
        }
        None => {
            let mut sink = FfmpegSink::new();
            render_timeline(
                &mut assets,
                &project.timeline,
                &renderers,
                &options,
                &mut sink,
                Some(progress_cb),
            )
            .await
            .map(|()| output_path)
        }
    };

    match result {
        Ok(destination) => {
            println!("\nExport complete: {}", destination.display());
            Ok(())
        }
        Err(e) => {
            println!();
            Err(anyhow::anyhow!("Export failed: {e}"))
        }
    }
}
