//! The event collection and the shared notification sink.
//!
//! [`Calendar`] is mutated only from the command path. The only state it
//! shares with timer tasks is the [`Notifier`] handed to every reminder.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{EventError, ReminderError, Result, StorageError};
use crate::event::{Event, EventRecord};
use crate::notifier::Notifier;
use crate::reminder::{ReminderState, StartStatus};
use crate::storage::JsonStorage;
use crate::validate::parse_datetime;

/// Minimum id prefix accepted by [`Calendar::resolve`].
pub const SHORT_ID_LEN: usize = 4;

#[derive(Debug, Default, Serialize, Deserialize)]
struct CalendarFile {
    #[serde(default)]
    events: HashMap<String, EventRecord>,
}

/// Which events a title lookup may match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderFilter {
    Any,
    /// Only events that carry a reminder.
    With,
}

#[derive(Debug)]
pub struct Calendar {
    events: HashMap<String, Event>,
    notifier: Notifier,
    storage: JsonStorage,
}

impl Calendar {
    pub fn new(storage: JsonStorage, notifier: Notifier) -> Self {
        Self {
            events: HashMap::new(),
            notifier,
            storage,
        }
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events ordered by start time, then title.
    pub fn events(&self) -> Vec<&Event> {
        let mut events: Vec<&Event> = self.events.values().collect();
        events.sort_by(|a, b| {
            a.start_at()
                .cmp(&b.start_at())
                .then_with(|| a.title().cmp(b.title()))
        });
        events
    }

    pub fn get_event(&self, id: &str) -> Result<&Event, EventError> {
        self.events
            .get(id)
            .ok_or_else(|| EventError::NotFound(id.to_string()))
    }

    fn get_event_mut(&mut self, id: &str) -> Result<&mut Event, EventError> {
        self.events
            .get_mut(id)
            .ok_or_else(|| EventError::NotFound(id.to_string()))
    }

    // ── Event CRUD ───────────────────────────────────────────────────

    pub fn add_event(&mut self, title: &str, date: &str, priority: &str) -> Result<String> {
        let event = Event::new(title, date, priority)?;
        let msg = format!("event {} added", event.title());
        info!(id = %event.id(), title = %event.title(), "event added");
        self.events.insert(event.id().to_string(), event);
        Ok(msg)
    }

    /// Remove an event, cancelling its reminder timer first.
    pub fn delete_event(&mut self, id: &str) -> Result<String> {
        let event = self.get_event(id)?;
        if let Some(reminder) = event.reminder() {
            reminder.stop();
        }
        let event = self
            .events
            .remove(id)
            .ok_or_else(|| EventError::NotFound(id.to_string()))?;
        info!(id = %id, title = %event.title(), "event deleted");
        Ok(format!("event {} deleted", event.title()))
    }

    pub fn edit_event(
        &mut self,
        id: &str,
        title: &str,
        date: &str,
        priority: &str,
    ) -> Result<String> {
        let event = self.get_event_mut(id)?;
        let old_title = event.title().to_string();
        event.update(title, date, priority)?;
        info!(id = %id, from = %old_title, to = %title, "event updated");
        Ok(format!("event {old_title} updated to {title} - {date}"))
    }

    /// One line per event, plus one per attached reminder.
    pub fn show_events(&self) -> String {
        if self.events.is_empty() {
            return EventError::NoEvents.to_string();
        }
        self.events()
            .into_iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    // ── Reminders ────────────────────────────────────────────────────

    /// Attach and arm a reminder. Past deadlines are accepted and reported
    /// as already passed rather than rejected.
    ///
    /// Fails with [`ReminderError::NoRuntime`] outside a Tokio runtime.
    pub fn set_event_reminder(&mut self, id: &str, message: &str, date: &str) -> Result<String> {
        let deadline = parse_datetime(date)?;
        let notifier = self.notifier.clone();
        let event = self.get_event_mut(id)?;
        Ok(event.attach_reminder(message, deadline, notifier)?)
    }

    pub fn remove_event_reminder(&mut self, id: &str) -> Result<String> {
        let event = self.get_event_mut(id)?;
        Ok(event.detach_reminder()?)
    }

    pub fn cancel_event_reminder(&self, id: &str) -> Result<String> {
        let event = self.get_event(id)?;
        Ok(event.cancel_reminder()?.to_string())
    }

    /// Push a user-facing message through the shared sink.
    pub async fn notify(&self, message: impl Into<String>) -> Result<(), ReminderError> {
        self.notifier.notify(message).await
    }

    /// Arm every reminder that was neither sent nor stopped. Past deadlines
    /// are reported, never fired.
    ///
    /// Returns one `title: status` line per reminder that was considered.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime; see [`Reminder::start`](crate::Reminder::start).
    pub fn rearm_reminders(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| {
                let reminder = event
                    .reminder()
                    .filter(|r| r.state() == ReminderState::Unarmed)?;
                let status = reminder.start();
                if status == StartStatus::DeadlinePassed {
                    warn!(event = %event.id(), message = %reminder.message(), "reminder deadline passed while offline");
                }
                Some(format!("{}: {status}", event.title()))
            })
            .collect()
    }

    // ── Lookup ───────────────────────────────────────────────────────

    /// Resolve user input to an event id.
    ///
    /// Tries, in order: an exact id, an `ID:<prefix>` tag or bare id prefix of
    /// at least [`SHORT_ID_LEN`] characters, then a case-insensitive title prefix.
    pub fn resolve(&self, query: &str) -> Result<String, EventError> {
        self.resolve_with(query, ReminderFilter::Any)
    }

    /// Like [`resolve`](Self::resolve), but a title prefix only matches
    /// events passing `filter`. Ids are never filtered.
    pub fn resolve_with(&self, query: &str, filter: ReminderFilter) -> Result<String, EventError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(EventError::NotFound(String::new()));
        }
        if self.events.contains_key(query) {
            return Ok(query.to_string());
        }

        let id_prefix = query
            .rsplit_once("ID:")
            .map(|(_, tail)| tail.trim())
            .unwrap_or(query);
        if id_prefix.chars().count() >= SHORT_ID_LEN {
            let ids: Vec<&String> = self
                .events
                .keys()
                .filter(|id| id.starts_with(id_prefix))
                .collect();
            match ids.as_slice() {
                [id] => return Ok((*id).clone()),
                [] => {}
                many => {
                    return Err(EventError::Ambiguous {
                        query: query.to_string(),
                        matches: many.len(),
                    })
                }
            }
        }

        match self.find_by_title_prefix(query, filter).as_slice() {
            [event] => Ok(event.id().to_string()),
            [] => Err(EventError::NotFound(query.to_string())),
            many => Err(EventError::Ambiguous {
                query: query.to_string(),
                matches: many.len(),
            }),
        }
    }

    pub fn find_by_title_prefix(&self, prefix: &str, filter: ReminderFilter) -> Vec<&Event> {
        let prefix = prefix.to_lowercase();
        self.events()
            .into_iter()
            .filter(|e| e.title().to_lowercase().starts_with(&prefix))
            .filter(|e| match filter {
                ReminderFilter::Any => true,
                ReminderFilter::With => e.has_reminder(),
            })
            .collect()
    }

    // ── Persistence ──────────────────────────────────────────────────

    pub fn save(&self) -> Result<(), StorageError> {
        let file = CalendarFile {
            events: self
                .events
                .iter()
                .map(|(id, event)| (id.clone(), event.record()))
                .collect(),
        };
        self.storage.save_json(&file)
    }

    /// Replace the in-memory events with the stored ones.
    ///
    /// Reminders come back unarmed; call [`rearm_reminders`](Self::rearm_reminders)
    /// to schedule them again.
    pub fn load(&mut self) -> Result<()> {
        let file: CalendarFile = self.storage.load_json()?;
        let mut events = HashMap::with_capacity(file.events.len());
        for (id, record) in file.events {
            let event = Event::from_record(record, &self.notifier)?;
            events.insert(id, event);
        }
        info!(count = events.len(), path = %self.storage.path().display(), "calendar loaded");
        self.events = events;
        Ok(())
    }

    /// Persist, then close the sink. The consumer drains what is buffered
    /// and ends; the caller completes the handshake by awaiting it.
    pub fn shutdown(&self) -> Result<(), StorageError> {
        let saved = self.save();
        self.notifier.close();
        saved
    }
}
