use std::path::PathBuf;
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender, TrySendError};

use crate::cache::domain::frame_cache::FrameCache;
use crate::encode::domain::segment_encoder::SegmentEncoder;
use crate::segment::domain::playlist;
use crate::segment::domain::reporter::ResultReporter;
use crate::segment::domain::segment::{Segment, SegmentResult};

pub const DEFAULT_ENCODE_WORKERS: usize = 2;
pub const DEFAULT_QUEUE_DEPTH: usize = 4;

/// Bounded pool of encode workers for one stream.
///
/// The ingestion path hands a closed window over with `submit` and never
/// waits on it; a slow or hung encoder only ever backs up this pool. When
/// the queue is full the segment is dropped (with its cached frames
/// reclaimed) rather than blocking frame delivery.
pub struct EncodePool {
    tx: Option<Sender<Segment>>,
    workers: Vec<JoinHandle<()>>,
    cache: Arc<dyn FrameCache>,
}

impl EncodePool {
    pub fn new(
        workers: usize,
        queue_depth: usize,
        cache: Arc<dyn FrameCache>,
        encoder: Arc<dyn SegmentEncoder>,
        reporter: Option<Arc<dyn ResultReporter>>,
    ) -> Self {
        let (tx, rx) = crossbeam_channel::bounded::<Segment>(queue_depth);
        let handles = (0..workers.max(1))
            .map(|_| spawn_worker(rx.clone(), cache.clone(), encoder.clone(), reporter.clone()))
            .collect();
        Self {
            tx: Some(tx),
            workers: handles,
            cache,
        }
    }

    /// Queues a segment for encoding. Never blocks: on overflow the segment
    /// is logged, dropped, and its cache entries removed inline (local
    /// deletes only).
    pub fn submit(&self, segment: Segment) {
        let Some(tx) = &self.tx else {
            return;
        };
        match tx.try_send(segment) {
            Ok(()) => {}
            Err(TrySendError::Full(seg)) | Err(TrySendError::Disconnected(seg)) => {
                log::warn!(
                    "encode queue for {} is full; dropping segment {}-{}",
                    seg.stream,
                    seg.first_time(),
                    seg.last_time()
                );
                for t in &seg.frame_times {
                    self.cache.remove(&seg.stream, *t);
                }
            }
        }
    }

    /// Waits for all outstanding encodes to finish.
    pub fn shutdown(mut self) {
        self.drain();
    }

    fn drain(&mut self) {
        self.tx.take();
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

impl Drop for EncodePool {
    fn drop(&mut self) {
        self.drain();
    }
}

fn spawn_worker(
    rx: Receiver<Segment>,
    cache: Arc<dyn FrameCache>,
    encoder: Arc<dyn SegmentEncoder>,
    reporter: Option<Arc<dyn ResultReporter>>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        for segment in rx {
            encode_segment(&*cache, &*encoder, reporter.as_deref(), &segment);
        }
    })
}

/// Runs one segment end to end: playlist, encoder invocation, result
/// delivery, cache cleanup. Cleanup is unconditional and scoped to this
/// segment's own timestamps, so a failure here cannot disturb other
/// segments or streams.
fn encode_segment(
    cache: &dyn FrameCache,
    encoder: &dyn SegmentEncoder,
    reporter: Option<&dyn ResultReporter>,
    segment: &Segment,
) {
    let entries: Vec<(PathBuf, f64)> = segment
        .frame_times
        .iter()
        .map(|t| (cache.path_for(&segment.stream, *t), *t))
        .collect();
    let playlist = playlist::build(&entries);

    match encoder.encode(&playlist, &segment.output_path) {
        Ok(()) => {
            log::info!(
                "saved preview segment {} for {}",
                segment.output_path.display(),
                segment.stream
            );
            if let Some(reporter) = reporter {
                reporter.segment_ready(SegmentResult::from_segment(segment));
            }
        }
        Err(e) => {
            log::error!("error saving preview for {}: {e}", segment.stream);
        }
    }

    for t in &segment.frame_times {
        cache.remove(&segment.stream, *t);
    }
}
