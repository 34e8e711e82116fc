use std::sync::Arc;

use crate::admission::domain::admission_policy::AdmissionPolicy;
use crate::cache::domain::frame_cache::FrameCache;
use crate::encode::domain::segment_encoder::SegmentEncoder;
use crate::pipeline::encode_pool::{EncodePool, DEFAULT_ENCODE_WORKERS, DEFAULT_QUEUE_DEPTH};
use crate::segment::domain::buffer::SegmentBuffer;
use crate::segment::domain::reporter::ResultReporter;
use crate::segment::domain::segment::Segment;
use crate::shared::detection::{MotionBox, TrackedObject};
use crate::shared::frame::Frame;
use crate::shared::stream_config::{OutputLayout, StreamConfig};

/// Per-stream ingestion endpoint: admission, caching, windowing, and
/// hand-off of closed windows to the encode pool.
///
/// Owned by one thread of control; `write_data` runs on every delivered
/// frame and never waits on the encoder. The rolling layout reports no
/// results, so its pool is built without a reporter.
pub struct PreviewRecorder {
    config: StreamConfig,
    policy: AdmissionPolicy,
    buffer: SegmentBuffer,
    cache: Arc<dyn FrameCache>,
    pool: EncodePool,
    output_size: (u32, u32),
}

impl PreviewRecorder {
    pub fn new(
        config: StreamConfig,
        policy: AdmissionPolicy,
        cache: Arc<dyn FrameCache>,
        encoder: Arc<dyn SegmentEncoder>,
        reporter: Arc<dyn ResultReporter>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        std::fs::create_dir_all(config.previews_dir())?;

        let reporter = match config.segment.layout {
            OutputLayout::PerSegment => Some(reporter),
            OutputLayout::Rolling => None,
        };
        let pool = EncodePool::new(
            DEFAULT_ENCODE_WORKERS,
            DEFAULT_QUEUE_DEPTH,
            cache.clone(),
            encoder,
            reporter,
        );

        let buffer = SegmentBuffer::new(config.segment.duration);
        let output_size = config.output_size();
        Ok(Self {
            config,
            policy,
            buffer,
            cache,
            pool,
            output_size,
        })
    }

    /// Handles one delivered frame: admit (or not), cache, and roll the
    /// window when it expires.
    ///
    /// A cache-write failure is returned to the caller but leaves the
    /// buffer consistent (the timestamp is only recorded once its file
    /// exists); later frames proceed normally.
    pub fn write_data(
        &mut self,
        tracked_objects: &[TrackedObject],
        motion_boxes: &[MotionBox],
        frame_time: f64,
        frame: &Frame,
    ) -> Result<(), Box<dyn std::error::Error>> {
        self.buffer.observe(frame_time);

        if self
            .policy
            .should_admit(tracked_objects, motion_boxes, frame_time)
        {
            self.cache
                .write(&self.config.name, frame_time, frame, self.output_size)?;
            self.buffer.push(frame_time);
        }

        if self.buffer.should_close(frame_time) {
            self.close_window(frame_time, frame)?;
        }

        Ok(())
    }

    /// Waits for outstanding encodes before shutdown. Frames still in the
    /// open window are abandoned; their cache files are reclaimed.
    pub fn finish(mut self) {
        for t in self.buffer.reset(0.0) {
            self.cache.remove(&self.config.name, t);
        }
        self.pool.shutdown();
    }

    fn close_window(
        &mut self,
        frame_time: f64,
        frame: &Frame,
    ) -> Result<(), Box<dyn std::error::Error>> {
        // Force-admit the closing frame so every window ends on a frame
        // cached at its boundary, even when the policy rejected it.
        if self.buffer.last_time() != Some(frame_time) {
            if let Err(e) =
                self.cache
                    .write(&self.config.name, frame_time, frame, self.output_size)
            {
                // Keep the window open with its admitted frames intact; the
                // next delivered frame becomes the closing candidate. Only
                // the window length suffers.
                log::warn!(
                    "failed to cache closing frame for {}; retrying close on the next frame: {e}",
                    self.config.name
                );
                return Err(e);
            }
            self.buffer.push(frame_time);
        }

        let frame_times = self.buffer.close(frame_time);
        let output_path = self
            .config
            .segment_output_path(frame_times[0], frame_time);
        log::debug!(
            "closing window for {}: {} frames -> {}",
            self.config.name,
            frame_times.len(),
            output_path.display()
        );

        self.pool
            .submit(Segment::new(self.config.name.clone(), frame_times, output_path));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admission::domain::motion_heuristic::OddBoxCountHeuristic;
    use crate::encode::domain::segment_encoder::EncodeError;
    use crate::segment::domain::segment::SegmentResult;
    use crate::shared::constants::PREVIEW_OUTPUT_FPS;
    use crate::shared::stream_config::SegmentSettings;
    use std::collections::HashSet;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    // --- Stubs ---

    struct StubCache {
        written: Mutex<Vec<f64>>,
        removed: Mutex<Vec<f64>>,
        fail_writes: Mutex<HashSet<u64>>,
    }

    impl StubCache {
        fn new() -> Self {
            Self {
                written: Mutex::new(Vec::new()),
                removed: Mutex::new(Vec::new()),
                fail_writes: Mutex::new(HashSet::new()),
            }
        }

        fn fail_write_at(&self, frame_time: f64) {
            self.fail_writes.lock().unwrap().insert(frame_time.to_bits());
        }
    }

    impl FrameCache for StubCache {
        fn write(
            &self,
            _stream: &str,
            frame_time: f64,
            _frame: &Frame,
            _size: (u32, u32),
        ) -> Result<(), Box<dyn std::error::Error>> {
            if self.fail_writes.lock().unwrap().contains(&frame_time.to_bits()) {
                return Err("disk full".into());
            }
            self.written.lock().unwrap().push(frame_time);
            Ok(())
        }

        fn path_for(&self, stream: &str, frame_time: f64) -> PathBuf {
            PathBuf::from(format!("/cache/preview_{stream}-{frame_time}.jpg"))
        }

        fn remove(&self, _stream: &str, frame_time: f64) {
            self.removed.lock().unwrap().push(frame_time);
        }
    }

    struct StubEncoder {
        succeed: bool,
        playlists: Mutex<Vec<String>>,
        outputs: Mutex<Vec<PathBuf>>,
    }

    impl StubEncoder {
        fn new(succeed: bool) -> Self {
            Self {
                succeed,
                playlists: Mutex::new(Vec::new()),
                outputs: Mutex::new(Vec::new()),
            }
        }
    }

    impl SegmentEncoder for StubEncoder {
        fn encode(&self, playlist: &str, output_path: &Path) -> Result<(), EncodeError> {
            self.playlists.lock().unwrap().push(playlist.to_string());
            self.outputs.lock().unwrap().push(output_path.to_path_buf());
            if self.succeed {
                Ok(())
            } else {
                Err(EncodeError::Failed {
                    status: 1,
                    stderr: "codec error".to_string(),
                })
            }
        }
    }

    struct StubReporter {
        results: Mutex<Vec<SegmentResult>>,
    }

    impl StubReporter {
        fn new() -> Self {
            Self {
                results: Mutex::new(Vec::new()),
            }
        }
    }

    impl ResultReporter for StubReporter {
        fn segment_ready(&self, result: SegmentResult) {
            self.results.lock().unwrap().push(result);
        }
    }

    // --- Helpers ---

    fn config(settings: SegmentSettings, clips_dir: &Path) -> StreamConfig {
        StreamConfig {
            name: "front".to_string(),
            detect_width: 1280,
            detect_height: 720,
            cache_dir: clips_dir.join("cache"),
            clips_dir: clips_dir.to_path_buf(),
            segment: settings,
        }
    }

    fn recorder(
        settings: SegmentSettings,
        clips_dir: &Path,
        cache: Arc<StubCache>,
        encoder: Arc<StubEncoder>,
        reporter: Arc<StubReporter>,
    ) -> PreviewRecorder {
        PreviewRecorder::new(
            config(settings, clips_dir),
            AdmissionPolicy::new(PREVIEW_OUTPUT_FPS, Box::new(OddBoxCountHeuristic)),
            cache,
            encoder,
            reporter,
        )
        .unwrap()
    }

    fn in_zone() -> Vec<TrackedObject> {
        vec![TrackedObject {
            zones: ["yard".to_string()].into_iter().collect(),
            stationary: false,
        }]
    }

    fn frame() -> Frame {
        Frame::new(vec![0u8; 4 * 4 * 3], 4, 4)
    }

    // --- Tests ---

    #[test]
    fn test_activity_window_produces_expected_segment() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Arc::new(StubCache::new());
        let encoder = Arc::new(StubEncoder::new(true));
        let reporter = Arc::new(StubReporter::new());
        let mut rec = recorder(
            SegmentSettings::recent(),
            dir.path(),
            cache.clone(),
            encoder.clone(),
            reporter.clone(),
        );

        let f = frame();
        for t in [0.0, 2.0, 35.0] {
            rec.write_data(&in_zone(), &[], t, &f).unwrap();
        }
        rec.finish();

        // admitted 0.0 and 2.0; 35.0 admitted at delivery then duplicated
        // as the window boundary
        assert_eq!(*cache.written.lock().unwrap(), vec![0.0, 2.0, 35.0]);

        let playlists = encoder.playlists.lock().unwrap();
        assert_eq!(playlists.len(), 1);
        let file_count = playlists[0].lines().filter(|l| l.starts_with("file ")).count();
        assert_eq!(file_count, 5); // 4 entries + repeated final file

        let results = reporter.results.lock().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].start_time, 0.0);
        assert_eq!(results[0].end_time, 2.0);
        assert_eq!(results[0].duration, 2.0);
        assert_eq!(results[0].id, "2.0-0.0");

        // consumed frames are reclaimed, boundary duplicate included
        assert_eq!(*cache.removed.lock().unwrap(), vec![0.0, 2.0, 35.0, 35.0]);
    }

    #[test]
    fn test_quiet_window_closes_with_forced_boundary_frames() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Arc::new(StubCache::new());
        let encoder = Arc::new(StubEncoder::new(true));
        let reporter = Arc::new(StubReporter::new());
        let mut rec = recorder(
            SegmentSettings::summary(),
            dir.path(),
            cache.clone(),
            encoder.clone(),
            reporter.clone(),
        );

        let f = frame();
        // nothing qualifies: no objects, even motion-box count
        for t in [0.0, 20.0, 40.0, 60.5] {
            rec.write_data(&[], &[], t, &f).unwrap();
        }
        rec.finish();

        // only the forced closing frame was ever cached
        assert_eq!(*cache.written.lock().unwrap(), vec![60.5]);
        assert_eq!(encoder.playlists.lock().unwrap().len(), 1);
        assert_eq!(*cache.removed.lock().unwrap(), vec![60.5, 60.5]);
        // rolling layout reports nothing
        assert!(reporter.results.lock().unwrap().is_empty());
    }

    #[test]
    fn test_rolling_layout_reuses_one_output_path() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Arc::new(StubCache::new());
        let encoder = Arc::new(StubEncoder::new(true));
        let reporter = Arc::new(StubReporter::new());
        let mut rec = recorder(
            SegmentSettings::summary(),
            dir.path(),
            cache.clone(),
            encoder.clone(),
            reporter.clone(),
        );

        let f = frame();
        let mut t = 0.0;
        while t < 135.0 {
            rec.write_data(&[], &[], t, &f).unwrap();
            t += 5.0;
        }
        rec.finish();

        let outputs = encoder.outputs.lock().unwrap();
        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs[0], outputs[1]);
        assert!(outputs[0].ends_with("previews/front.mp4"));
    }

    #[test]
    fn test_next_window_opens_at_closing_frame() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Arc::new(StubCache::new());
        let encoder = Arc::new(StubEncoder::new(true));
        let reporter = Arc::new(StubReporter::new());
        let mut rec = recorder(
            SegmentSettings::recent(),
            dir.path(),
            cache.clone(),
            encoder.clone(),
            reporter.clone(),
        );

        let f = frame();
        rec.write_data(&in_zone(), &[], 0.0, &f).unwrap();
        rec.write_data(&in_zone(), &[], 31.0, &f).unwrap(); // closes window 1
        rec.write_data(&in_zone(), &[], 62.0, &f).unwrap(); // closes window 2
        rec.finish();

        // the second window's clock started at 31.0 (the first window's
        // closing frame), so 62.0 was enough to close it again
        let results = reporter.results.lock().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].start_time, 0.0);
        assert_eq!(results[1].start_time, 62.0);
    }

    #[test]
    fn test_encode_failure_still_cleans_cache_and_reports_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Arc::new(StubCache::new());
        let encoder = Arc::new(StubEncoder::new(false));
        let reporter = Arc::new(StubReporter::new());
        let mut rec = recorder(
            SegmentSettings::recent(),
            dir.path(),
            cache.clone(),
            encoder.clone(),
            reporter.clone(),
        );

        let f = frame();
        rec.write_data(&in_zone(), &[], 0.0, &f).unwrap();
        rec.write_data(&in_zone(), &[], 31.0, &f).unwrap();
        rec.finish();

        assert!(reporter.results.lock().unwrap().is_empty());
        assert_eq!(*cache.removed.lock().unwrap(), vec![0.0, 31.0, 31.0]);
    }

    #[test]
    fn test_cache_write_failure_keeps_timestamp_out_of_segment() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Arc::new(StubCache::new());
        let encoder = Arc::new(StubEncoder::new(true));
        let reporter = Arc::new(StubReporter::new());
        let mut rec = recorder(
            SegmentSettings::recent(),
            dir.path(),
            cache.clone(),
            encoder.clone(),
            reporter.clone(),
        );

        cache.fail_write_at(2.0);
        let f = frame();
        rec.write_data(&in_zone(), &[], 0.0, &f).unwrap();
        assert!(rec.write_data(&in_zone(), &[], 2.0, &f).is_err());
        rec.write_data(&in_zone(), &[], 31.0, &f).unwrap();
        rec.finish();

        let results = reporter.results.lock().unwrap();
        assert_eq!(results.len(), 1);
        // the failed 2.0 write never entered the window
        assert_eq!(results[0].end_time, 31.0);
        assert_eq!(*cache.removed.lock().unwrap(), vec![0.0, 31.0, 31.0]);
    }

    #[test]
    fn test_failed_boundary_write_retries_close_on_next_frame() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Arc::new(StubCache::new());
        let encoder = Arc::new(StubEncoder::new(true));
        let reporter = Arc::new(StubReporter::new());
        let mut rec = recorder(
            SegmentSettings::recent(),
            dir.path(),
            cache.clone(),
            encoder.clone(),
            reporter.clone(),
        );

        cache.fail_write_at(31.0);
        let f = frame();
        rec.write_data(&in_zone(), &[], 0.0, &f).unwrap();
        // closing frame can't be cached; the window stays open
        assert!(rec.write_data(&[], &[], 31.0, &f).is_err());
        rec.write_data(&[], &[], 33.0, &f).unwrap();
        rec.finish();

        // the admitted frame survives and the window closes at 33.0
        let results = reporter.results.lock().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].start_time, 0.0);
        assert_eq!(results[0].end_time, 33.0);
        assert_eq!(*cache.removed.lock().unwrap(), vec![0.0, 33.0, 33.0]);
    }

    #[test]
    fn test_rate_limited_frames_are_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Arc::new(StubCache::new());
        let encoder = Arc::new(StubEncoder::new(true));
        let reporter = Arc::new(StubReporter::new());
        let mut rec = recorder(
            SegmentSettings::recent(),
            dir.path(),
            cache.clone(),
            encoder.clone(),
            reporter.clone(),
        );

        let f = frame();
        rec.write_data(&in_zone(), &[], 0.0, &f).unwrap();
        rec.write_data(&in_zone(), &[], 0.5, &f).unwrap();
        assert_eq!(*cache.written.lock().unwrap(), vec![0.0]);
        rec.finish();
    }

    #[test]
    fn test_finish_reclaims_open_window_frames() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Arc::new(StubCache::new());
        let encoder = Arc::new(StubEncoder::new(true));
        let reporter = Arc::new(StubReporter::new());
        let mut rec = recorder(
            SegmentSettings::recent(),
            dir.path(),
            cache.clone(),
            encoder.clone(),
            reporter.clone(),
        );

        let f = frame();
        rec.write_data(&in_zone(), &[], 0.0, &f).unwrap();
        rec.write_data(&in_zone(), &[], 2.0, &f).unwrap();
        rec.finish();

        // window never closed; no encode, but cached frames were reclaimed
        assert!(encoder.playlists.lock().unwrap().is_empty());
        assert_eq!(*cache.removed.lock().unwrap(), vec![0.0, 2.0]);
    }
}
