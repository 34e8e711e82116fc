use crate::shared::detection::MotionBox;

/// Decides whether the current motion regions alone justify keeping a frame.
///
/// This is the fallback signal when no tracked object forces admission, so
/// implementations should stay cheap: called once per delivered frame, no I/O.
pub trait MotionHeuristic: Send {
    fn is_significant(&self, motion_boxes: &[MotionBox]) -> bool;
}

/// Placeholder heuristic carried over from the original recorder: an odd
/// number of motion boxes counts as significant.
// TODO: replace with a real significance measure (box area / persistence).
pub struct OddBoxCountHeuristic;

impl MotionHeuristic for OddBoxCountHeuristic {
    fn is_significant(&self, motion_boxes: &[MotionBox]) -> bool {
        motion_boxes.len() % 2 == 1
    }
}
