use std::collections::HashSet;

/// Per-frame state of one tracked object, as reported by the upstream
/// detection/tracking pipeline.
#[derive(Clone, Debug, Default)]
pub struct TrackedObject {
    /// Configured zones the object currently occupies.
    pub zones: HashSet<String>,
    /// Whether the tracker currently classifies the object as not moving.
    pub stationary: bool,
}

impl TrackedObject {
    /// An object in at least one zone and in motion is the primary
    /// "something interesting is happening" signal.
    pub fn is_active_in_zone(&self) -> bool {
        !self.zones.is_empty() && !self.stationary
    }
}

/// Axis-aligned region of detected motion within the frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MotionBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}
