/// Windowing state for one stream: the open window's start time and the
/// timestamps admitted into it so far.
///
/// `start_time` is `None` until the first frame is observed. The clock
/// starts on the first *observed* frame, not the first admitted one, so a
/// quiet stream still rolls windows on schedule. Streams legitimately
/// start at `t = 0.0`, so openness is tracked explicitly rather than by a
/// sentinel value.
pub struct SegmentBuffer {
    duration: f64,
    start_time: Option<f64>,
    frame_times: Vec<f64>,
}

impl SegmentBuffer {
    pub fn new(duration: f64) -> Self {
        debug_assert!(duration > 0.0, "window duration must be positive");
        Self {
            duration,
            start_time: None,
            frame_times: Vec::new(),
        }
    }

    /// Opens a window at `frame_time` if none is open.
    pub fn observe(&mut self, frame_time: f64) {
        if self.start_time.is_none() {
            self.start_time = Some(frame_time);
        }
    }

    /// Appends an admitted timestamp. Frames arrive in stream order, so the
    /// sequence stays non-decreasing.
    pub fn push(&mut self, frame_time: f64) {
        debug_assert!(
            self.frame_times.last().map_or(true, |last| *last <= frame_time),
            "admitted timestamps must be non-decreasing"
        );
        self.frame_times.push(frame_time);
    }

    pub fn last_time(&self) -> Option<f64> {
        self.frame_times.last().copied()
    }

    /// Whether the open window has exceeded its duration at `frame_time`.
    pub fn should_close(&self, frame_time: f64) -> bool {
        self.start_time
            .map_or(false, |start| frame_time - start > self.duration)
    }

    /// Closes the window at `frame_time`, returning its timestamp list.
    ///
    /// The caller must already have appended `frame_time` (force-admitting
    /// it if the policy rejected it); this appends the boundary duplicate
    /// so the last two entries are always equal. The next window opens at
    /// this same frame, with no gap.
    pub fn close(&mut self, frame_time: f64) -> Vec<f64> {
        debug_assert_eq!(
            self.frame_times.last().copied(),
            Some(frame_time),
            "closing frame must be admitted before close"
        );
        self.frame_times.push(frame_time);
        self.start_time = Some(frame_time);
        std::mem::take(&mut self.frame_times)
    }

    /// Discards the open window's contents and re-opens at `frame_time`,
    /// returning the abandoned timestamps so their cache files can be
    /// reclaimed.
    pub fn reset(&mut self, frame_time: f64) -> Vec<f64> {
        self.start_time = Some(frame_time);
        std::mem::take(&mut self.frame_times)
    }
}
