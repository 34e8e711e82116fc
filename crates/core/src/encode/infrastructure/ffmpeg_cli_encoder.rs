use std::io::{ErrorKind, Read, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use crate::encode::domain::segment_encoder::{EncodeError, SegmentEncoder};
use crate::shared::constants::{
    DEFAULT_ENCODE_TIMEOUT_SECS, DEFAULT_PREVIEW_BITRATE, PREVIEW_OUTPUT_FPS,
    RECENT_SEGMENT_DURATION,
};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Fixed summary-mode encoder parameters, tunable per deployment.
#[derive(Clone, Debug)]
pub struct EncoderSettings {
    /// Cap on output frame rate; also drives keyframe spacing.
    pub output_fps: f64,
    /// Window length, so the GOP works out to one keyframe per clip.
    pub segment_duration: f64,
    /// Constrained bitrate in bits/sec.
    pub bitrate: u32,
    /// Hardware-acceleration flags, passed through verbatim before the
    /// input arguments. Selection happens outside this crate.
    pub hwaccel_args: Vec<String>,
    /// Wall-clock bound on one invocation; exceeding it kills the process.
    pub timeout: Duration,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            output_fps: PREVIEW_OUTPUT_FPS,
            segment_duration: RECENT_SEGMENT_DURATION,
            bitrate: DEFAULT_PREVIEW_BITRATE,
            hwaccel_args: Vec::new(),
            timeout: Duration::from_secs(DEFAULT_ENCODE_TIMEOUT_SECS),
        }
    }
}

/// Invokes ffmpeg as a black-box subprocess: concat-demuxer playlist over
/// stdin, variable-frame-rate mp4 out.
pub struct FfmpegCliEncoder {
    program: String,
    settings: EncoderSettings,
}

impl FfmpegCliEncoder {
    pub fn new(settings: EncoderSettings) -> Self {
        Self::with_program("ffmpeg", settings)
    }

    pub fn with_program(program: impl Into<String>, settings: EncoderSettings) -> Self {
        Self {
            program: program.into(),
            settings,
        }
    }

    /// Full argument list for one invocation. The playlist arrives on
    /// stdin, hence the pipe protocol whitelist.
    fn build_args(&self, output_path: &Path) -> Vec<String> {
        let s = &self.settings;
        let gop = (s.output_fps * s.segment_duration).round() as u32;

        let mut args: Vec<String> = s.hwaccel_args.clone();
        args.extend(
            [
                "-f",
                "concat",
                "-y",
                "-protocol_whitelist",
                "pipe,file",
                "-safe",
                "0",
                "-i",
                "/dev/stdin",
            ]
            .map(String::from),
        );
        args.extend([
            "-g".to_string(),
            gop.to_string(),
            "-fpsmax".to_string(),
            s.output_fps.to_string(),
            "-bf".to_string(),
            "0".to_string(),
            "-b".to_string(),
            s.bitrate.to_string(),
            "-fps_mode".to_string(),
            "vfr".to_string(),
            "-pix_fmt".to_string(),
            "yuv420p".to_string(),
            output_path.display().to_string(),
        ]);
        args
    }
}

impl SegmentEncoder for FfmpegCliEncoder {
    fn encode(&self, playlist: &str, output_path: &Path) -> Result<(), EncodeError> {
        let mut child = Command::new(&self.program)
            .args(self.build_args(output_path))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(EncodeError::Spawn)?;

        // Drain stderr concurrently so a chatty encoder can't fill the pipe
        // and deadlock against our wait loop.
        let stderr = child.stderr.take();
        let stderr_reader = std::thread::spawn(move || {
            let mut out = String::new();
            if let Some(mut stderr) = stderr {
                let _ = stderr.read_to_string(&mut out);
            }
            out
        });

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(playlist.as_bytes()) {
                // A broken pipe means the process already exited; fall
                // through and report its exit status instead.
                if e.kind() != ErrorKind::BrokenPipe {
                    let _ = child.kill();
                    let _ = child.wait();
                    let _ = stderr_reader.join();
                    return Err(EncodeError::Io(e));
                }
            }
        }

        let started = Instant::now();
        let status = loop {
            match child.try_wait().map_err(EncodeError::Io)? {
                Some(status) => break status,
                None => {
                    if started.elapsed() >= self.settings.timeout {
                        let _ = child.kill();
                        let _ = child.wait();
                        let _ = stderr_reader.join();
                        return Err(EncodeError::TimedOut(self.settings.timeout));
                    }
                    std::thread::sleep(POLL_INTERVAL);
                }
            }
        };

        let stderr = stderr_reader.join().unwrap_or_default();
        if status.success() {
            Ok(())
        } else {
            Err(EncodeError::Failed {
                status: status.code().unwrap_or(-1),
                stderr,
            })
        }
    }
}
