//! Calendar events and their single optional reminder.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::{EventError, ReminderError};
use crate::notifier::Notifier;
use crate::reminder::{Reminder, ReminderRecord, ReminderState, StopStatus};
use crate::validate::{format_date, parse_future_datetime, validate_title};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl FromStr for Priority {
    type Err = EventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(EventError::InvalidPriority(s.to_string())),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        })
    }
}

/// Persisted form of an [`Event`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: String,
    pub title: String,
    pub start_at: DateTime<Utc>,
    pub priority: Priority,
    #[serde(default)]
    pub reminder: Option<ReminderRecord>,
    /// Set when the user stopped the reminder before it fired. Kept beside
    /// the reminder record so a restart does not arm it again.
    #[serde(default, skip_serializing_if = "is_false")]
    pub reminder_stopped: bool,
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

/// A timed event. Owns at most one reminder.
#[derive(Debug)]
pub struct Event {
    id: String,
    title: String,
    start_at: DateTime<Utc>,
    priority: Priority,
    reminder: Option<Reminder>,
}

impl Event {
    /// Validate the inputs and build a new event with a fresh id.
    pub fn new(title: &str, date: &str, priority: &str) -> Result<Self, EventError> {
        let (start_at, priority) = Self::validate(title, date, priority, Utc::now())?;
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            start_at,
            priority,
            reminder: None,
        })
    }

    fn validate(
        title: &str,
        date: &str,
        priority: &str,
        now: DateTime<Utc>,
    ) -> Result<(DateTime<Utc>, Priority), EventError> {
        let priority = priority.parse::<Priority>()?;
        validate_title(title)?;
        let start_at = parse_future_datetime(date, now)?;
        Ok((start_at, priority))
    }

    /// Rebuild from storage. The reminder comes back unarmed.
    pub fn from_record(record: EventRecord, notifier: &Notifier) -> Result<Self, ReminderError> {
        let reminder = record
            .reminder
            .map(|r| Reminder::from_record(r, notifier.clone()))
            .transpose()?;
        if record.reminder_stopped {
            if let Some(reminder) = &reminder {
                reminder.restore_stopped();
            }
        }
        Ok(Self {
            id: record.id,
            title: record.title,
            start_at: record.start_at,
            priority: record.priority,
            reminder,
        })
    }

    pub fn record(&self) -> EventRecord {
        EventRecord {
            id: self.id.clone(),
            title: self.title.clone(),
            start_at: self.start_at,
            priority: self.priority,
            reminder: self.reminder.as_ref().map(Reminder::record),
            reminder_stopped: self
                .reminder
                .as_ref()
                .is_some_and(|r| r.state() == ReminderState::Stopped),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn start_at(&self) -> DateTime<Utc> {
        self.start_at
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn reminder(&self) -> Option<&Reminder> {
        self.reminder.as_ref()
    }

    pub fn has_reminder(&self) -> bool {
        self.reminder.is_some()
    }

    /// Replace title, date and priority, revalidating everything.
    ///
    /// On error the event is left unchanged.
    pub fn update(&mut self, title: &str, date: &str, priority: &str) -> Result<(), EventError> {
        let (start_at, priority) = Self::validate(title, date, priority, Utc::now())?;
        self.title = title.to_string();
        self.start_at = start_at;
        self.priority = priority;
        Ok(())
    }

    /// Attach a new reminder, replacing (and cancelling) any existing one, then arm it.
    ///
    /// Fails with [`ReminderError::NoRuntime`] outside a Tokio runtime, leaving
    /// the event untouched.
    pub fn attach_reminder(
        &mut self,
        message: &str,
        deadline: DateTime<Utc>,
        notifier: Notifier,
    ) -> Result<String, ReminderError> {
        tokio::runtime::Handle::try_current().map_err(|_| ReminderError::NoRuntime)?;
        let reminder = Reminder::new(message, deadline, notifier)?;
        if let Some(previous) = self.reminder.take() {
            let status = previous.stop();
            debug!(event = %self.id, %status, "replaced reminder");
        }
        let status = reminder.start();
        let reminder = self.reminder.insert(reminder);
        Ok(format!("reminder {} added\n{status}", reminder.message()))
    }

    /// Stop and remove the attached reminder.
    pub fn detach_reminder(&mut self) -> Result<String, ReminderError> {
        let reminder = self.reminder.take().ok_or(ReminderError::NoReminder)?;
        let status = reminder.stop();
        Ok(format!("reminder removed\n{status}"))
    }

    /// Stop the attached reminder but keep it, so its final state stays visible.
    pub fn cancel_reminder(&self) -> Result<StopStatus, ReminderError> {
        self.reminder
            .as_ref()
            .map(Reminder::stop)
            .ok_or(ReminderError::NoReminder)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} - {} - {}",
            self.id,
            self.title,
            format_date(self.start_at),
            self.priority
        )?;
        if let Some(reminder) = &self.reminder {
            write!(
                f,
                "\nreminder for: {} - {} - {} - sent: {}",
                self.title,
                reminder.message(),
                format_date(reminder.deadline()),
                reminder.is_fired()
            )?;
        }
        Ok(())
    }
}
