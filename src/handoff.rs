//! Latest-wins handoff between the acquisition thread and the pipeline task.
//!
//! A capacity-1 channel where the sender overwrites an unconsumed frame
//! instead of waiting, so a slow tick never stalls capture.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::landmarks::LandmarkSample;
use crate::stability::Timestamp;

/// One processed camera frame. `sample` is `None` when no hand was found.
#[derive(Debug, Clone)]
pub struct Frame {
    pub sample: Option<LandmarkSample>,
    pub at: Timestamp,
}

pub fn channel() -> (FrameSender, FrameReceiver) {
    let (tx, rx) = async_channel::bounded(1);
    let dropped = Arc::new(AtomicU64::new(0));
    (
        FrameSender {
            tx,
            dropped: dropped.clone(),
        },
        FrameReceiver { rx, dropped },
    )
}

#[derive(Clone)]
pub struct FrameSender {
    tx: async_channel::Sender<Frame>,
    dropped: Arc<AtomicU64>,
}

impl FrameSender {
    /// Publish a frame, replacing any frame not yet taken.
    /// Returns `false` once the receiving side has shut down.
    pub fn publish(&self, frame: Frame) -> bool {
        match self.tx.force_send(frame) {
            Ok(Some(stale)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                log::trace!("Dropped stale frame at {:.3}s", stale.at.as_secs_f64());
                true
            }
            Ok(None) => true,
            Err(_) => false,
        }
    }
}

pub struct FrameReceiver {
    rx: async_channel::Receiver<Frame>,
    dropped: Arc<AtomicU64>,
}

impl FrameReceiver {
    /// Next frame, or `None` once every sender is gone and the slot is empty.
    pub async fn next(&self) -> Option<Frame> {
        self.rx.recv().await.ok()
    }

    /// Stop accepting frames. Senders see `publish` return `false`.
    pub fn close(&self) {
        self.rx.close();
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}
