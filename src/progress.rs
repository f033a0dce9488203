//! Progress events emitted while an image is being recognized.
//!
//! The OCR engine reports percentages to a [`ProgressSink`]. Delivery is best
//! effort: a sink never fails the pipeline. The bot forwards events over a
//! tokio channel and thins them out with a [`ProgressThrottle`].

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

/// Receiver of OCR progress percentages (0 to 100).
pub trait ProgressSink: Send + Sync {
    fn report(&self, percent: u8);
}

/// Logs events at debug level. Used by the batch runner.
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn report(&self, percent: u8) {
        tracing::debug!("OCR progress: {}%", percent);
    }
}

/// Channel-backed sink. Events sent after the receiver is gone are dropped.
pub struct ChannelProgress {
    sender: UnboundedSender<u8>,
}

impl ProgressSink for ChannelProgress {
    fn report(&self, percent: u8) {
        let _ = self.sender.send(percent.min(100));
    }
}

/// Creates a progress channel. The sink side goes to the blocking OCR task,
/// the receiver to whoever updates the user.
pub fn progress_channel() -> (ChannelProgress, UnboundedReceiver<u8>) {
    let (sender, receiver) = unbounded_channel();
    (ChannelProgress { sender }, receiver)
}

/// Lets an update through only once progress has advanced at least `step`
/// points past the last update that was let through.
#[derive(Debug, Clone)]
pub struct ProgressThrottle {
    step: u8,
    last: u8,
}

impl ProgressThrottle {
    pub fn new(step: u8) -> Self {
        Self {
            step: step.max(1),
            last: 0,
        }
    }

    /// Returns true when `percent` should be shown to the user.
    pub fn accept(&mut self, percent: u8) -> bool {
        if percent.saturating_sub(self.last) >= self.step {
            self.last = percent;
            true
        } else {
            false
        }
    }
}
