use std::path::Path;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("failed to spawn encoder process: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("encoder I/O failed: {0}")]
    Io(#[source] std::io::Error),
    #[error("encoder exited with status {status}: {stderr}")]
    Failed { status: i32, stderr: String },
    #[error("encoder timed out after {0:?}")]
    TimedOut(Duration),
}

/// Capability interface over the external encoder.
///
/// One invocation per segment: the playlist describes the stills and their
/// display durations, `output_path` is where the clip lands. There is no
/// retry; a failure means the segment is dropped. Implementations may block
/// for the length of one encode, so callers must stay off the ingestion
/// path.
pub trait SegmentEncoder: Send + Sync {
    fn encode(&self, playlist: &str, output_path: &Path) -> Result<(), EncodeError>;
}
