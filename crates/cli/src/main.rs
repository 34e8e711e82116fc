use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use serde::Deserialize;

use glimpse_core::admission::domain::admission_policy::AdmissionPolicy;
use glimpse_core::admission::domain::motion_heuristic::OddBoxCountHeuristic;
use glimpse_core::cache::infrastructure::jpeg_frame_cache::JpegFrameCache;
use glimpse_core::encode::infrastructure::ffmpeg_cli_encoder::{EncoderSettings, FfmpegCliEncoder};
use glimpse_core::pipeline::preview_recorder::PreviewRecorder;
use glimpse_core::segment::infrastructure::channel_reporter::ChannelReporter;
use glimpse_core::shared::constants::{DEFAULT_PREVIEW_BITRATE, PREVIEW_OUTPUT_FPS};
use glimpse_core::shared::detection::{MotionBox, TrackedObject};
use glimpse_core::shared::frame::Frame;
use glimpse_core::shared::stream_config::{SegmentSettings, StreamConfig};

/// Replays a directory of timestamped stills through the preview recorder
/// and encodes low-frame-rate summary clips.
#[derive(Parser)]
#[command(name = "glimpse")]
struct Cli {
    /// Directory of frames named `<seconds>.jpg`/`.png`, with optional
    /// `<seconds>.json` metadata sidecars.
    frames_dir: PathBuf,

    /// Root directory for finished clips.
    #[arg(long, default_value = "clips")]
    clips_dir: PathBuf,

    /// Scratch directory for cached frames awaiting encode.
    #[arg(long, default_value = "cache")]
    cache_dir: PathBuf,

    /// Stream name used in file names and reported results.
    #[arg(long, default_value = "stream")]
    stream: String,

    /// Detection resolution of the source, WIDTHxHEIGHT.
    #[arg(long, default_value = "1280x720")]
    detect: String,

    /// Windowing variant: recent (30s clips + results) or summary
    /// (one rolling 60s file).
    #[arg(long, default_value = "recent")]
    mode: String,

    /// Encoder bitrate in bits/sec.
    #[arg(long, default_value_t = DEFAULT_PREVIEW_BITRATE)]
    bitrate: u32,

    /// Encoder binary to invoke.
    #[arg(long, default_value = "ffmpeg")]
    ffmpeg: String,

    /// Hardware-acceleration flags, passed through verbatim.
    #[arg(long, value_delimiter = ' ')]
    hwaccel: Option<Vec<String>>,

    /// Per-encode timeout in seconds.
    #[arg(long, default_value = "120")]
    timeout: u64,
}

/// Sidecar metadata for one frame. Absent file means no detections.
#[derive(Deserialize, Default)]
struct FrameMeta {
    #[serde(default)]
    tracked_objects: Vec<ObjectMeta>,
    #[serde(default)]
    motion_boxes: Vec<[u32; 4]>,
}

#[derive(Deserialize)]
struct ObjectMeta {
    #[serde(default)]
    zones: Vec<String>,
    #[serde(default)]
    stationary: bool,
}

impl FrameMeta {
    fn tracked(&self) -> Vec<TrackedObject> {
        self.tracked_objects
            .iter()
            .map(|o| TrackedObject {
                zones: o.zones.iter().cloned().collect(),
                stationary: o.stationary,
            })
            .collect()
    }

    fn motion(&self) -> Vec<MotionBox> {
        self.motion_boxes
            .iter()
            .map(|b| MotionBox {
                x: b[0],
                y: b[1],
                width: b[2],
                height: b[3],
            })
            .collect()
    }
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let (detect_width, detect_height) = parse_detect(&cli.detect)?;
    let (settings, cache_mode) = match cli.mode.as_str() {
        "recent" => (SegmentSettings::recent(), "preview"),
        "summary" => (SegmentSettings::summary(), "summary"),
        other => return Err(format!("unknown mode '{other}' (use recent or summary)").into()),
    };

    let config = StreamConfig {
        name: cli.stream.clone(),
        detect_width,
        detect_height,
        cache_dir: cli.cache_dir.clone(),
        clips_dir: cli.clips_dir.clone(),
        segment: settings,
    };

    let cache = Arc::new(JpegFrameCache::new(&cli.cache_dir, cache_mode));
    let encoder = Arc::new(FfmpegCliEncoder::with_program(
        cli.ffmpeg.clone(),
        EncoderSettings {
            output_fps: PREVIEW_OUTPUT_FPS,
            segment_duration: settings.duration,
            bitrate: cli.bitrate,
            hwaccel_args: cli.hwaccel.clone().unwrap_or_default(),
            timeout: Duration::from_secs(cli.timeout),
        },
    ));
    let (reporter, results) = ChannelReporter::new();

    let policy = AdmissionPolicy::new(PREVIEW_OUTPUT_FPS, Box::new(OddBoxCountHeuristic));
    let mut recorder =
        PreviewRecorder::new(config, policy, cache, encoder, Arc::new(reporter))?;

    let frames = collect_frames(&cli.frames_dir)?;
    if frames.is_empty() {
        return Err(format!("no frames found in {}", cli.frames_dir.display()).into());
    }
    log::info!("replaying {} frames from {}", frames.len(), cli.frames_dir.display());

    for (frame_time, path) in &frames {
        let img = image::open(path)?.to_rgb8();
        let (width, height) = (img.width(), img.height());
        let frame = Frame::new(img.into_raw(), width, height);
        let meta = load_sidecar(path)?;
        recorder.write_data(&meta.tracked(), &meta.motion(), *frame_time, &frame)?;
    }

    recorder.finish();

    for result in results.try_iter() {
        println!(
            "{} {} [{} - {}] ({}s) -> {}",
            result.id,
            result.stream,
            result.start_time,
            result.end_time,
            result.duration,
            result.path.display()
        );
    }

    Ok(())
}

fn parse_detect(value: &str) -> Result<(u32, u32), Box<dyn std::error::Error>> {
    let (w, h) = value
        .split_once('x')
        .ok_or("detect resolution must be WIDTHxHEIGHT")?;
    let width: u32 = w.parse()?;
    let height: u32 = h.parse()?;
    if width == 0 || height == 0 {
        return Err("detect resolution must be non-zero".into());
    }
    Ok((width, height))
}

/// Frames sorted by the timestamp encoded in their file stem.
fn collect_frames(dir: &Path) -> Result<Vec<(f64, PathBuf)>, Box<dyn std::error::Error>> {
    let mut frames = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_image = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| matches!(e.to_lowercase().as_str(), "jpg" | "jpeg" | "png"))
            .unwrap_or(false);
        if !is_image {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        match stem.parse::<f64>() {
            Ok(t) => frames.push((t, path)),
            Err(_) => log::warn!("skipping {}: file stem is not a timestamp", path.display()),
        }
    }
    frames.sort_by(|a, b| a.0.total_cmp(&b.0));
    Ok(frames)
}

fn load_sidecar(frame_path: &Path) -> Result<FrameMeta, Box<dyn std::error::Error>> {
    let sidecar = frame_path.with_extension("json");
    if !sidecar.exists() {
        return Ok(FrameMeta::default());
    }
    let text = std::fs::read_to_string(&sidecar)?;
    Ok(serde_json::from_str(&text)?)
}
