use crate::segment::domain::segment::SegmentResult;

/// Downstream consumer of "segment ready" events.
///
/// Results arrive from concurrent encode tasks and may be out of order
/// across windows and streams; each one is an independent event.
pub trait ResultReporter: Send + Sync {
    fn segment_ready(&self, result: SegmentResult);
}
