use std::path::PathBuf;

use crate::shared::timestamp::format_frame_time;

/// Immutable snapshot of one closed window, handed to exactly one encode
/// task and never mutated afterwards.
#[derive(Clone, Debug)]
pub struct Segment {
    pub stream: String,
    /// Admitted timestamps in stream order. Always at least two entries,
    /// and the last two are equal (the closing frame is duplicated so the
    /// final display interval is well-defined).
    pub frame_times: Vec<f64>,
    pub output_path: PathBuf,
}

impl Segment {
    pub fn new(stream: String, frame_times: Vec<f64>, output_path: PathBuf) -> Self {
        debug_assert!(frame_times.len() >= 2, "segment needs at least two entries");
        debug_assert_eq!(
            frame_times[frame_times.len() - 1],
            frame_times[frame_times.len() - 2],
            "closing frame must be duplicated"
        );
        Self {
            stream,
            frame_times,
            output_path,
        }
    }

    pub fn first_time(&self) -> f64 {
        self.frame_times[0]
    }

    pub fn last_time(&self) -> f64 {
        self.frame_times[self.frame_times.len() - 1]
    }
}

/// Outcome of one successful encode, delivered once to the result reporter.
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentResult {
    pub id: String,
    pub stream: String,
    pub path: PathBuf,
    pub start_time: f64,
    pub end_time: f64,
    pub duration: f64,
}

impl SegmentResult {
    /// `end_time` is the *second* timestamp in the list, i.e. the end of the
    /// first admitted interval, not the window end. Downstream consumers key
    /// on this, so it is kept as-is.
    pub fn from_segment(segment: &Segment) -> Self {
        let start = segment.frame_times[0];
        let end = segment.frame_times[1];
        Self {
            id: format!("{}-{}", format_frame_time(end), format_frame_time(start)),
            stream: segment.stream.clone(),
            path: segment.output_path.clone(),
            start_time: start,
            end_time: end,
            duration: end - start,
        }
    }
}
