use crossbeam_channel::{Receiver, Sender};

use crate::segment::domain::reporter::ResultReporter;
use crate::segment::domain::segment::SegmentResult;

/// Forwards segment results over a channel to whatever persists them.
///
/// Stands in for the original's inter-process queue: encode tasks push
/// without blocking, the persistence side drains at its own pace.
pub struct ChannelReporter {
    tx: Sender<SegmentResult>,
}

impl ChannelReporter {
    pub fn new() -> (Self, Receiver<SegmentResult>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (Self { tx }, rx)
    }
}

impl ResultReporter for ChannelReporter {
    fn segment_ready(&self, result: SegmentResult) {
        if self.tx.send(result).is_err() {
            log::warn!("segment result receiver dropped; discarding result");
        }
    }
}
