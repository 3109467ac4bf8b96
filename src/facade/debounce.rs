//! Trailing-edge debouncer

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::trace;

/// Delays values until they have been the latest for a full quiescence window
///
/// At most one emission is pending at a time; each [`emit`](Self::emit)
/// cancels the previous one. Delivered values arrive on the receiver returned
/// by [`Debouncer::new`].
#[derive(Debug)]
pub struct Debouncer<T> {
    tx: mpsc::UnboundedSender<T>,
    pending: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Create a debouncer and the receiver of its delayed output
    pub fn new() -> (Self, mpsc::UnboundedReceiver<T>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx, pending: None }, rx)
    }

    /// Schedule `value` for delivery after `window`, replacing any pending value
    ///
    /// Must be called from within a tokio runtime.
    pub fn emit(&mut self, value: T, window: Duration) {
        self.cancel();

        let tx = self.tx.clone();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(window).await;
            if tx.send(value).is_err() {
                trace!("Debounced value dropped, receiver closed");
            }
        }));
    }
}

impl<T> Debouncer<T> {
    /// Drop the pending value, if any
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    /// Whether a value is waiting to be delivered
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.cancel();
    }
}
