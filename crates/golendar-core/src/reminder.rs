//! One-shot reminder timers.
//!
//! A [`Reminder`] turns a wall-clock deadline into a single tokio timer task
//! that pushes `reminder: <message>` into the shared [`Notifier`].
//!
//! ## State Transitions
//!
//! ```text
//! Unarmed -> Armed -> (Fired | Stopped)
//! ```
//!
//! `Fired` and `Stopped` are terminal. The timer task and `stop()` race for
//! the `Armed` state under one mutex, so exactly one of them wins: either the
//! notification goes out, or the stop is reported and nothing is sent.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::ReminderError;
use crate::notifier::Notifier;
use crate::validate::{format_duration, validate_message};

const ALREADY_SENT: &str = "reminder already sent!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderState {
    Unarmed,
    Armed,
    Fired,
    Stopped,
}

/// Outcome of [`Reminder::start`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartStatus {
    /// Timer scheduled; fires after the given delay.
    Armed { after: Duration },
    /// Deadline was not in the future. Nothing was scheduled.
    DeadlinePassed,
    AlreadyArmed,
    /// The reminder already reached a terminal state.
    Finished(ReminderState),
}

impl fmt::Display for StartStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartStatus::Armed { after } => {
                write!(f, "reminder fires in {}", format_duration(*after))
            }
            StartStatus::DeadlinePassed => f.write_str("reminder deadline already passed"),
            StartStatus::AlreadyArmed => f.write_str("reminder is already armed"),
            StartStatus::Finished(ReminderState::Fired) => f.write_str(ALREADY_SENT),
            StartStatus::Finished(_) => f.write_str("reminder timer was stopped"),
        }
    }
}

/// Outcome of [`Reminder::stop`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopStatus {
    NoTimer,
    Stopped { message: String },
    /// Timer already fired or was stopped earlier.
    AlreadyFinished { message: String },
}

impl fmt::Display for StopStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopStatus::NoTimer => f.write_str("no timer"),
            StopStatus::Stopped { message } => {
                write!(f, "timer stopped for reminder: {message}")
            }
            StopStatus::AlreadyFinished { message } => {
                write!(f, "timer already fired or was stopped: {message}")
            }
        }
    }
}

/// Persisted form. Only these three fields survive a restart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderRecord {
    pub message: String,
    #[serde(rename = "time")]
    pub deadline: DateTime<Utc>,
    #[serde(rename = "sent")]
    pub fired: bool,
}

#[derive(Debug)]
struct Slot {
    state: ReminderState,
    timer: Option<JoinHandle<()>>,
}

#[derive(Debug)]
struct Shared {
    message: String,
    deadline: DateTime<Utc>,
    notifier: Notifier,
    slot: Mutex<Slot>,
}

enum Firing {
    First,
    Duplicate,
    Cancelled,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Slot> {
        // Slot updates are single assignments; a poisoned guard is still consistent.
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn fire(&self) {
        let firing = {
            let mut slot = self.lock();
            match slot.state {
                ReminderState::Unarmed | ReminderState::Armed => {
                    slot.state = ReminderState::Fired;
                    slot.timer = None;
                    Firing::First
                }
                ReminderState::Fired => Firing::Duplicate,
                ReminderState::Stopped => Firing::Cancelled,
            }
        };

        let text = match firing {
            Firing::First => {
                info!(message = %self.message, "reminder fired");
                format!("reminder: {}", self.message)
            }
            Firing::Duplicate => {
                debug!(message = %self.message, "duplicate fire ignored");
                ALREADY_SENT.to_string()
            }
            Firing::Cancelled => {
                debug!(message = %self.message, "fire lost the race to stop");
                return;
            }
        };

        if let Err(err) = self.notifier.notify(text).await {
            warn!(message = %self.message, %err, "reminder notification dropped");
        }
    }
}

/// A single scheduled notification.
///
/// Dropping an armed reminder cancels its timer, so a replaced or detached
/// reminder can never fire.
#[derive(Debug)]
pub struct Reminder {
    shared: Arc<Shared>,
}

impl Reminder {
    /// Create an unarmed reminder.
    ///
    /// Past deadlines are accepted here and reported by [`start`](Self::start).
    pub fn new(
        message: &str,
        deadline: DateTime<Utc>,
        notifier: Notifier,
    ) -> Result<Self, ReminderError> {
        validate_message(message)?;
        Ok(Self::with_state(
            message.to_string(),
            deadline,
            ReminderState::Unarmed,
            notifier,
        ))
    }

    /// Rebuild a reminder from storage. Never arms a timer.
    pub fn from_record(record: ReminderRecord, notifier: Notifier) -> Result<Self, ReminderError> {
        validate_message(&record.message)?;
        let state = if record.fired {
            ReminderState::Fired
        } else {
            ReminderState::Unarmed
        };
        Ok(Self::with_state(record.message, record.deadline, state, notifier))
    }

    fn with_state(
        message: String,
        deadline: DateTime<Utc>,
        state: ReminderState,
        notifier: Notifier,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                message,
                deadline,
                notifier,
                slot: Mutex::new(Slot { state, timer: None }),
            }),
        }
    }

    /// Mark a reloaded reminder as stopped so it is never armed again.
    /// Only an unarmed reminder changes state.
    pub(crate) fn restore_stopped(&self) {
        let mut slot = self.shared.lock();
        if slot.state == ReminderState::Unarmed {
            slot.state = ReminderState::Stopped;
        }
    }

    pub fn record(&self) -> ReminderRecord {
        ReminderRecord {
            message: self.shared.message.clone(),
            deadline: self.shared.deadline,
            fired: self.is_fired(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn message(&self) -> &str {
        &self.shared.message
    }

    pub fn deadline(&self) -> DateTime<Utc> {
        self.shared.deadline
    }

    pub fn state(&self) -> ReminderState {
        self.shared.lock().state
    }

    pub fn is_fired(&self) -> bool {
        self.state() == ReminderState::Fired
    }

    pub fn is_armed(&self) -> bool {
        self.state() == ReminderState::Armed
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Arm the timer for `deadline - now`.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime; the timer is a spawned task.
    pub fn start(&self) -> StartStatus {
        self.start_at(Utc::now())
    }

    fn start_at(&self, now: DateTime<Utc>) -> StartStatus {
        let mut slot = self.shared.lock();
        match slot.state {
            ReminderState::Unarmed => {}
            ReminderState::Armed => return StartStatus::AlreadyArmed,
            terminal => return StartStatus::Finished(terminal),
        }

        let after = match (self.shared.deadline - now).to_std() {
            Ok(after) if !after.is_zero() => after,
            _ => {
                debug!(message = %self.shared.message, "deadline already passed, not arming");
                return StartStatus::DeadlinePassed;
            }
        };

        let shared = Arc::clone(&self.shared);
        slot.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(after).await;
            shared.fire().await;
        }));
        slot.state = ReminderState::Armed;
        info!(message = %self.shared.message, after = ?after, "reminder armed");
        StartStatus::Armed { after }
    }

    /// Cancel a pending timer. Safe to call any number of times.
    pub fn stop(&self) -> StopStatus {
        let mut slot = self.shared.lock();
        match slot.state {
            ReminderState::Unarmed => StopStatus::NoTimer,
            ReminderState::Armed => {
                slot.state = ReminderState::Stopped;
                if let Some(timer) = slot.timer.take() {
                    timer.abort();
                }
                info!(message = %self.shared.message, "reminder stopped");
                StopStatus::Stopped {
                    message: self.shared.message.clone(),
                }
            }
            ReminderState::Fired | ReminderState::Stopped => StopStatus::AlreadyFinished {
                message: self.shared.message.clone(),
            },
        }
    }

    #[cfg(test)]
    async fn fire(&self) {
        self.shared.fire().await;
    }
}

impl Drop for Reminder {
    fn drop(&mut self) {
        let mut slot = self.shared.lock();
        if slot.state == ReminderState::Armed {
            slot.state = ReminderState::Stopped;
            if let Some(timer) = slot.timer.take() {
                timer.abort();
            }
            debug!(message = %self.shared.message, "armed reminder dropped, timer cancelled");
        }
    }
}
