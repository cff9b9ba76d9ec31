//! Frame sinks: where encoded frames stream to.
//!
//! The export pipeline is sink-agnostic. `FfmpegSink` pipes PNG frames
//! into an ffmpeg process for muxing, `PngDirSink` drops them as files,
//! and `CollectSink` buffers them for assertions.

use std::path::PathBuf;
use std::process::Stdio;

use montage_asset_store::command_exists;
use montage_common::{MontageError, MontageResult};
use montage_timeline_model::{ExportOptions, Timeline, TimelineElement};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Consumes the ordered frame stream produced by the export pipeline.
///
/// The protocol is `start` once, `send_frame` per frame in ascending
/// order, `finish_stream` exactly once after the last frame. `send_frame`
/// completing is the backpressure signal: the pipeline will not composite
/// the next frame until the sink has accepted the current one.
#[allow(async_fn_in_trait)]
pub trait FrameSink {
    async fn start(&mut self, options: &ExportOptions, timeline: &Timeline) -> MontageResult<()>;

    async fn send_frame(&mut self, bytes: Vec<u8>, frame: u64, total_frames: u64)
        -> MontageResult<()>;

    async fn finish_stream(&mut self) -> MontageResult<()>;
}

/// Streams PNG frames into ffmpeg over stdin and muxes the timeline's
/// audio tracks into the output container.
#[derive(Default)]
pub struct FfmpegSink {
    child: Option<tokio::process::Child>,
    stdin: Option<tokio::process::ChildStdin>,
    stderr_task: Option<tokio::task::JoinHandle<String>>,
}

impl FfmpegSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameSink for FfmpegSink {
    async fn start(&mut self, options: &ExportOptions, timeline: &Timeline) -> MontageResult<()> {
        if !command_exists("ffmpeg") {
            return Err(MontageError::unsupported(
                "ffmpeg not found in PATH; cannot encode video",
            ));
        }

        if let Some(parent) = options.output_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let args = build_ffmpeg_args(options, timeline);
        tracing::debug!(args = ?args, "Running ffmpeg");

        let mut child = tokio::process::Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| MontageError::export(format!("Failed to start ffmpeg: {e}")))?;

        self.stdin = child.stdin.take();

        // Drain stderr concurrently so ffmpeg never blocks on a full pipe.
        if let Some(mut stderr) = child.stderr.take() {
            self.stderr_task = Some(tokio::spawn(async move {
                let mut output = String::new();
                match stderr.read_to_string(&mut output).await {
                    Ok(_) => output,
                    Err(err) => format!("<failed to read ffmpeg stderr: {err}>"),
                }
            }));
        }

        tracing::info!(
            pid = child.id(),
            output = %options.output_path.display(),
            "ffmpeg process started"
        );
        self.child = Some(child);
        Ok(())
    }

    async fn send_frame(
        &mut self,
        bytes: Vec<u8>,
        frame: u64,
        _total_frames: u64,
    ) -> MontageResult<()> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| MontageError::export("frame sent before stream start"))?;

        stdin
            .write_all(&bytes)
            .await
            .map_err(|e| MontageError::export(format!("ffmpeg rejected frame {frame}: {e}")))?;
        Ok(())
    }

    async fn finish_stream(&mut self) -> MontageResult<()> {
        // Dropping stdin closes the pipe, which is ffmpeg's end-of-stream.
        self.stdin.take();

        let mut child = self
            .child
            .take()
            .ok_or_else(|| MontageError::export("stream finished before start"))?;
        let status = child
            .wait()
            .await
            .map_err(|e| MontageError::export(format!("Failed to wait on ffmpeg: {e}")))?;

        let stderr_output = match self.stderr_task.take() {
            Some(task) => task
                .await
                .unwrap_or_else(|_| "<failed to join stderr reader>".to_string()),
            None => String::new(),
        };

        if !status.success() {
            return Err(MontageError::export(format!(
                "ffmpeg exited with {}: {}",
                status,
                stderr_output.trim()
            )));
        }

        tracing::info!("ffmpeg stream finished");
        Ok(())
    }
}

/// The ffmpeg invocation: PNG frames on stdin as the video stream, one
/// seeked input per audio-bearing element, delayed to its timeline start
/// and mixed down to a single track.
fn build_ffmpeg_args(options: &ExportOptions, timeline: &Timeline) -> Vec<String> {
    let render = &options.render;
    let mut args: Vec<String> = Vec::new();

    for arg in ["-y", "-hide_banner", "-loglevel", "error"] {
        args.push(arg.to_string());
    }
    for arg in ["-f", "image2pipe", "-vcodec", "png"] {
        args.push(arg.to_string());
    }
    args.push("-r".to_string());
    args.push(render.fps.to_string());
    args.push("-i".to_string());
    args.push("pipe:0".to_string());

    let mut filter_complex: Vec<String> = Vec::new();
    let mut audio_labels: Vec<String> = Vec::new();

    for element in timeline.values() {
        let (trim, speed, path, start_time) = match element {
            TimelineElement::Video(v) if v.is_exist_audio => {
                (v.trim, v.speed, v.common.local_path.as_str(), v.common.start_time)
            }
            TimelineElement::Audio(a) => {
                (a.trim, a.speed, a.common.local_path.as_str(), a.common.start_time)
            }
            _ => continue,
        };

        let mut in_start_ms = trim.start_time * speed;
        let in_duration_ms = trim.end_time - trim.start_time;
        let mut track_delay_ms = start_time;

        // An element dragged before timeline zero loses its head: the
        // source seek advances by the overhang and the delay clamps at 0.
        if in_start_ms >= 0.0 && track_delay_ms >= 0.0 {
            track_delay_ms = start_time + in_start_ms;
        } else if track_delay_ms < 0.0 {
            let d = in_start_ms - track_delay_ms.abs();
            if d >= 0.0 {
                track_delay_ms = d;
            } else {
                track_delay_ms = 0.0;
                in_start_ms = trim.start_time * speed + d.abs();
            }
        }

        args.push("-ss".to_string());
        args.push(format!("{}", in_start_ms / 1000.0));
        args.push("-t".to_string());
        args.push(format!("{}", in_duration_ms / 1000.0));
        args.push("-i".to_string());
        args.push(path.to_string());

        let delay = track_delay_ms.round() as i64;
        let index = audio_labels.len();
        let label = format!("audio{index}");
        filter_complex.push(format!(
            "[{}:a]adelay={delay}|{delay}[{label}]",
            audio_labels.len() + 1
        ));
        audio_labels.push(format!("[{label}]"));
    }

    if audio_labels.is_empty() {
        filter_complex.push(format!(
            "anullsrc=channel_layout=stereo:sample_rate=44100:d={}[silent]",
            render.duration
        ));
        audio_labels.push("[silent]".to_string());
    }

    filter_complex.push("[0:v]null[vout]".to_string());

    if audio_labels.len() > 1 {
        filter_complex.push(format!(
            "{}amix=inputs={}[aout]",
            audio_labels.concat(),
            audio_labels.len()
        ));
    } else {
        filter_complex.push(format!("{}aresample=async=1[aout]", audio_labels[0]));
    }

    args.push("-filter_complex".to_string());
    args.push(filter_complex.join(";"));
    args.push("-map".to_string());
    args.push("[vout]".to_string());
    args.push("-map".to_string());
    args.push("[aout]".to_string());

    for arg in ["-c:a", "aac", "-c:v", "libx264"] {
        args.push(arg.to_string());
    }
    args.push("-t".to_string());
    args.push(format!("{}", render.duration));
    args.push("-b:v".to_string());
    args.push(format!("{}k", options.video_bitrate_kbps));
    args.push("-pix_fmt".to_string());
    args.push("yuv420p".to_string());
    args.push(options.output_path.display().to_string());

    args
}

/// Writes each frame as `frame_{:05}.png` under a directory. Export
/// without an encoder on the machine.
pub struct PngDirSink {
    dir: PathBuf,
}

impl PngDirSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl FrameSink for PngDirSink {
    async fn start(&mut self, _options: &ExportOptions, _timeline: &Timeline) -> MontageResult<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    async fn send_frame(
        &mut self,
        bytes: Vec<u8>,
        frame: u64,
        _total_frames: u64,
    ) -> MontageResult<()> {
        let path = self.dir.join(format!("frame_{frame:05}.png"));
        tokio::fs::write(&path, &bytes).await?;
        Ok(())
    }

    async fn finish_stream(&mut self) -> MontageResult<()> {
        Ok(())
    }
}

/// Buffers every frame in memory. Test double for pipeline assertions.
#[derive(Debug, Default)]
pub struct CollectSink {
    pub started: u32,
    pub finished: u32,
    pub frames: Vec<Vec<u8>>,
    pub indices: Vec<u64>,
}

impl CollectSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameSink for CollectSink {
    async fn start(&mut self, _options: &ExportOptions, _timeline: &Timeline) -> MontageResult<()> {
        self.started += 1;
        Ok(())
    }

    async fn send_frame(
        &mut self,
        bytes: Vec<u8>,
        frame: u64,
        _total_frames: u64,
    ) -> MontageResult<()> {
        self.indices.push(frame);
        self.frames.push(bytes);
        Ok(())
    }

    async fn finish_stream(&mut self) -> MontageResult<()> {
        self.finished += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use montage_timeline_model::{
        AudioElement, ElementCommon, Point, RenderOptions, TrimRange,
    };

    fn audio_element(key: &str, start_time: f64, trim: TrimRange) -> TimelineElement {
        TimelineElement::Audio(AudioElement {
            common: ElementCommon {
                key: key.to_string(),
                priority: 0,
                start_time,
                duration: trim.end_time - trim.start_time,
                location: Point::new(0.0, 0.0),
                local_path: format!("/media/{key}.mp3"),
                timeline_color: String::new(),
            },
            trim,
            speed: 1.0,
        })
    }

    fn export_options() -> ExportOptions {
        ExportOptions {
            output_path: PathBuf::from("/tmp/out.mp4"),
            video_bitrate_kbps: 5000,
            render: RenderOptions {
                fps: 30,
                duration: 2.0,
                ..RenderOptions::default()
            },
        }
    }

    #[test]
    fn test_args_without_audio_use_silent_source() {
        let args = build_ffmpeg_args(&export_options(), &Timeline::new());
        let joined = args.join(" ");

        assert!(joined.contains("-f image2pipe -vcodec png -r 30 -i pipe:0"));
        assert!(joined.contains("anullsrc=channel_layout=stereo:sample_rate=44100:d=2"));
        assert!(joined.contains("[0:v]null[vout]"));
        assert!(joined.contains("[silent]aresample=async=1[aout]"));
        assert!(joined.contains("-b:v 5000k"));
        assert!(joined.ends_with("/tmp/out.mp4"));
    }

    #[test]
    fn test_args_delay_audio_to_timeline_start() {
        let mut timeline = Timeline::new();
        timeline.insert(audio_element(
            "song",
            1500.0,
            TrimRange {
                start_time: 500.0,
                end_time: 2500.0,
            },
        ));

        let args = build_ffmpeg_args(&export_options(), &timeline);
        let joined = args.join(" ");

        // Seeked 0.5s into the source, played for 2s, delayed to its slot.
        assert!(joined.contains("-ss 0.5 -t 2 -i /media/song.mp3"));
        assert!(joined.contains("[1:a]adelay=2000|2000[audio0]"));
        assert!(joined.contains("[audio0]aresample=async=1[aout]"));
    }

    #[test]
    fn test_args_mix_multiple_tracks() {
        let mut timeline = Timeline::new();
        timeline.insert(audio_element(
            "a",
            0.0,
            TrimRange {
                start_time: 0.0,
                end_time: 1000.0,
            },
        ));
        timeline.insert(audio_element(
            "b",
            500.0,
            TrimRange {
                start_time: 0.0,
                end_time: 1000.0,
            },
        ));

        let args = build_ffmpeg_args(&export_options(), &timeline);
        let joined = args.join(" ");

        assert!(joined.contains("[audio0][audio1]amix=inputs=2[aout]"));
    }

    #[test]
    fn test_args_skip_videos_without_audio_stream() {
        let mut timeline = Timeline::new();
        timeline.insert(audio_element(
            "keep",
            0.0,
            TrimRange {
                start_time: 0.0,
                end_time: 1000.0,
            },
        ));

        let args = build_ffmpeg_args(&export_options(), &timeline);
        assert_eq!(args.iter().filter(|a| *a == "-ss").count(), 1);
    }

    #[tokio::test]
    async fn test_collect_sink_records_protocol() {
        let mut sink = CollectSink::new();
        let options = export_options();
        let timeline = Timeline::new();

        sink.start(&options, &timeline).await.expect("start");
        sink.send_frame(vec![1, 2, 3], 0, 2).await.expect("frame 0");
        sink.send_frame(vec![4, 5], 1, 2).await.expect("frame 1");
        sink.finish_stream().await.expect("finish");

        assert_eq!(sink.started, 1);
        assert_eq!(sink.finished, 1);
        assert_eq!(sink.indices, vec![0, 1]);
        assert_eq!(sink.frames, vec![vec![1, 2, 3], vec![4, 5]]);
    }

    #[tokio::test]
    async fn test_png_dir_sink_writes_numbered_frames() {
        let dir = std::env::temp_dir().join("montage_png_sink_test");
        tokio::fs::remove_dir_all(&dir).await.ok();

        let mut sink = PngDirSink::new(&dir);
        sink.start(&export_options(), &Timeline::new())
            .await
            .expect("start");
        sink.send_frame(vec![9, 9], 3, 10).await.expect("frame");
        sink.finish_stream().await.expect("finish");

        let written = tokio::fs::read(dir.join("frame_00003.png"))
            .await
            .expect("frame file");
        assert_eq!(written, vec![9, 9]);

        tokio::fs::remove_dir_all(&dir).await.ok();
    }
}
