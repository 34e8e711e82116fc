/// Admission rate cap: at most one frame per second makes it into a preview.
pub const PREVIEW_OUTPUT_FPS: f64 = 1.0;

/// Fixed output height; width is derived from the stream's detect aspect ratio.
pub const PREVIEW_HEIGHT: u32 = 160;

/// Window length for interactive "recent activity" clips.
pub const RECENT_SEGMENT_DURATION: f64 = 30.0;

/// Window length for the rolling per-stream summary file.
pub const SUMMARY_SEGMENT_DURATION: f64 = 60.0;

/// Subfolder of the cache directory holding admitted still frames.
pub const FOLDER_PREVIEW_FRAMES: &str = "preview_frames";

/// Constrained encoder bitrate (bits/sec) for summary-mode output.
pub const DEFAULT_PREVIEW_BITRATE: u32 = 9120;

/// Wall-clock bound on a single encoder invocation, in seconds.
pub const DEFAULT_ENCODE_TIMEOUT_SECS: u64 = 120;
