use std::path::PathBuf;

use crate::shared::constants::{
    PREVIEW_HEIGHT, RECENT_SEGMENT_DURATION, SUMMARY_SEGMENT_DURATION,
};
use crate::shared::timestamp::format_frame_time;

/// How finished segments are laid out on disk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputLayout {
    /// One file per window, named by its first/last timestamps; a result
    /// is reported for each finished segment.
    PerSegment,
    /// One rolling file per stream, overwritten each window; nothing is
    /// reported downstream.
    Rolling,
}

/// Windowing variant for one recorder.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentSettings {
    /// Window length in seconds of stream time.
    pub duration: f64,
    pub layout: OutputLayout,
}

impl SegmentSettings {
    /// Interactive "recent activity" previews: short windows, one clip each.
    pub fn recent() -> Self {
        Self {
            duration: RECENT_SEGMENT_DURATION,
            layout: OutputLayout::PerSegment,
        }
    }

    /// Longer-horizon summary: one rolling file per stream.
    pub fn summary() -> Self {
        Self {
            duration: SUMMARY_SEGMENT_DURATION,
            layout: OutputLayout::Rolling,
        }
    }
}

/// Long-lived settings for one monitored stream.
#[derive(Clone, Debug)]
pub struct StreamConfig {
    pub name: String,
    /// Resolution the detection pipeline runs at; fixes the aspect ratio
    /// of cached preview frames.
    pub detect_width: u32,
    pub detect_height: u32,
    /// Scratch directory for cached stills awaiting encode.
    pub cache_dir: PathBuf,
    /// Root directory for finished clips.
    pub clips_dir: PathBuf,
    pub segment: SegmentSettings,
}

impl StreamConfig {
    /// Output geometry: fixed height, width derived from the detect
    /// aspect ratio (truncated).
    pub fn output_size(&self) -> (u32, u32) {
        let width =
            (self.detect_width as f64 / self.detect_height as f64 * PREVIEW_HEIGHT as f64) as u32;
        (width, PREVIEW_HEIGHT)
    }

    /// Directory finished clips for this stream land in.
    pub fn previews_dir(&self) -> PathBuf {
        match self.segment.layout {
            OutputLayout::PerSegment => self.clips_dir.join("previews").join(&self.name),
            OutputLayout::Rolling => self.clips_dir.join("previews"),
        }
    }

    /// Deterministic output path for a window spanning `[first, last]`.
    pub fn segment_output_path(&self, first: f64, last: f64) -> PathBuf {
        match self.segment.layout {
            OutputLayout::PerSegment => self.previews_dir().join(format!(
                "{}-{}.mp4",
                format_frame_time(first),
                format_frame_time(last)
            )),
            OutputLayout::Rolling => self.previews_dir().join(format!("{}.mp4", self.name)),
        }
    }
}
