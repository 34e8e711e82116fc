use crate::admission::domain::motion_heuristic::MotionHeuristic;
use crate::shared::detection::{MotionBox, TrackedObject};

/// Decides which delivered frames are worth keeping for a preview.
///
/// Rules are checked in order; the first match governs:
/// 1. rate limit (hard floor, regardless of content),
/// 2. a non-stationary tracked object in a zone,
/// 3. the pluggable motion heuristic.
///
/// Admission updates the recency state; rejection leaves it untouched.
pub struct AdmissionPolicy {
    min_interval: f64,
    heuristic: Box<dyn MotionHeuristic>,
    last_admitted: f64,
}

impl AdmissionPolicy {
    pub fn new(target_fps: f64, heuristic: Box<dyn MotionHeuristic>) -> Self {
        debug_assert!(target_fps > 0.0, "target_fps must be positive");
        Self {
            min_interval: 1.0 / target_fps,
            heuristic,
            // first delivered frame is never rate-limited
            last_admitted: f64::NEG_INFINITY,
        }
    }

    pub fn should_admit(
        &mut self,
        tracked_objects: &[TrackedObject],
        motion_boxes: &[MotionBox],
        frame_time: f64,
    ) -> bool {
        if frame_time - self.last_admitted < self.min_interval {
            return false;
        }

        if tracked_objects.iter().any(|o| o.is_active_in_zone()) {
            self.last_admitted = frame_time;
            return true;
        }

        if self.heuristic.is_significant(motion_boxes) {
            self.last_admitted = frame_time;
            return true;
        }

        false
    }
}
