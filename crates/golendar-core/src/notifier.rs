//! Bounded notification sink between reminder timers and the front end.
//!
//! ```text
//! Producers (many):                       Consumer (one):
//!   reminder timer 1 ──┐
//!   reminder timer 2 ──┼──► Notifier ──► NotificationStream ──► print loop
//!   command loop     ──┘   (mpsc, cap 5)
//! ```
//!
//! ## Rules
//! - **Back-pressure**: `notify()` waits while the queue is full. Nothing is dropped
//!   while the sink is open.
//! - **Ordered**: messages come out in the order their sends completed.
//! - **Shutdown handshake**: `close()` cancels a shared token. New sends fail with
//!   `SinkClosed`, producers parked on a full queue are released with the same
//!   error, and the stream yields whatever is still buffered before ending.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::ReminderError;

/// Queue capacity used when the configuration does not override it.
pub const DEFAULT_CAPACITY: usize = 5;

/// Create a sink with the given capacity (clamped to at least 1).
pub fn channel(capacity: usize) -> (Notifier, NotificationStream) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let closed = CancellationToken::new();
    (
        Notifier {
            tx,
            closed: closed.clone(),
        },
        NotificationStream { rx, closed },
    )
}

/// Producer half. Cheap to clone; every reminder holds one.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: mpsc::Sender<String>,
    closed: CancellationToken,
}

impl Notifier {
    /// Queue a message, waiting for room if the sink is full.
    ///
    /// Fails with [`ReminderError::SinkClosed`] once `close()` has been called,
    /// including for a send that was already waiting for room.
    pub async fn notify(&self, message: impl Into<String>) -> Result<(), ReminderError> {
        if self.closed.is_cancelled() {
            return Err(ReminderError::SinkClosed);
        }
        let message = message.into();
        tokio::select! {
            biased;
            _ = self.closed.cancelled() => Err(ReminderError::SinkClosed),
            sent = self.tx.send(message) => sent.map_err(|_| ReminderError::SinkClosed),
        }
    }

    /// Signal that no further messages will be produced. Idempotent.
    pub fn close(&self) {
        if !self.closed.is_cancelled() {
            info!("notification sink closed");
            self.closed.cancel();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }
}

/// Consumer half. There is exactly one per sink.
#[derive(Debug)]
pub struct NotificationStream {
    rx: mpsc::Receiver<String>,
    closed: CancellationToken,
}

impl NotificationStream {
    /// Next message in order, or `None` once the sink is closed and drained.
    pub async fn next(&mut self) -> Option<String> {
        tokio::select! {
            biased;
            msg = self.rx.recv() => msg,
            _ = self.closed.cancelled() => {
                // Refuse new sends, then hand out what is already buffered.
                self.rx.close();
                let msg = self.rx.recv().await;
                if msg.is_none() {
                    debug!("notification stream drained");
                }
                msg
            }
        }
    }

    /// Non-blocking poll for a buffered message.
    pub fn try_next(&mut self) -> Option<String> {
        self.rx.try_recv().ok()
    }
}
