//! # Golendar Core Library
//!
//! Business logic for the Golendar personal event tracker. The CLI binary is a
//! thin interactive layer over this crate.
//!
//! ## Architecture
//!
//! - **Notifier**: bounded, ordered channel from reminder timers (many
//!   producers) to the front end (one consumer), with an explicit close handshake
//! - **Reminder**: one-shot timer task per reminder; fire and stop race under a
//!   per-reminder mutex so exactly one terminal outcome wins
//! - **Event**: validated record owning at most one reminder
//! - **Calendar**: the event collection plus the shared notifier
//! - **Storage**: JSON event store, JSON history log, TOML configuration
//!
//! ## Key Components
//!
//! - [`Calendar`]: routes every reminder request to its event
//! - [`Reminder`]: `Unarmed -> Armed -> (Fired | Stopped)` state machine
//! - [`Notifier`] / [`NotificationStream`]: the notification sink
//! - [`Config`]: application configuration management

pub mod calendar;
pub mod error;
pub mod event;
pub mod notifier;
pub mod reminder;
pub mod storage;
pub mod validate;

pub use calendar::{Calendar, ReminderFilter};
pub use error::{ConfigError, CoreError, EventError, ReminderError, StorageError};
pub use event::{Event, EventRecord, Priority};
pub use notifier::{NotificationStream, Notifier};
pub use reminder::{Reminder, ReminderRecord, ReminderState, StartStatus, StopStatus};
pub use storage::{Config, HistoryLog, JsonStorage};
