use std::path::PathBuf;

use crate::shared::frame::Frame;

/// Content-addressed store of single-frame stills, keyed by
/// `(stream, timestamp)`.
///
/// The hand-off medium between admission and the encoder: the ingestion
/// path writes exactly one file per admitted frame, and the encode task
/// that owns the segment is the only component allowed to delete it.
/// Filenames are unique per key, so concurrent tasks need no locking.
pub trait FrameCache: Send + Sync {
    /// Persists a frame, resized to `size`. A failed write must leave no
    /// entry behind for this key.
    fn write(
        &self,
        stream: &str,
        frame_time: f64,
        frame: &Frame,
        size: (u32, u32),
    ) -> Result<(), Box<dyn std::error::Error>>;

    /// Deterministic path for a key, whether or not it exists yet.
    fn path_for(&self, stream: &str, frame_time: f64) -> PathBuf;

    /// Best-effort removal; a missing entry is not an error.
    fn remove(&self, stream: &str, frame_time: f64);
}
