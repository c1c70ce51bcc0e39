//! Core error types for golendar-core.
//!
//! One top-level [`CoreError`] with a nested enum per domain, all built with
//! thiserror. Every variant is a local, recoverable condition: callers print
//! it and carry on.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for golendar-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Reminder lifecycle errors
    #[error(transparent)]
    Reminder(#[from] ReminderError),

    /// Event validation and lookup errors
    #[error(transparent)]
    Event(#[from] EventError),

    /// Persistence errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Reminder-specific errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReminderError {
    /// Empty or malformed reminder text
    #[error("invalid reminder message: {0:?}")]
    InvalidMessage(String),

    /// The operation needs an attached reminder and there is none
    #[error("no reminder attached to this event")]
    NoReminder,

    /// The notification sink was closed before the message could be queued
    #[error("notification sink is closed")]
    SinkClosed,

    /// Timers need a Tokio runtime and none is running on this thread
    #[error("no async runtime available for reminder timers")]
    NoRuntime,
}

/// Event-specific errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventError {
    #[error("title must not be blank")]
    EmptyTitle,

    #[error("invalid event title: {0:?}")]
    InvalidTitle(String),

    #[error("invalid priority {0:?}, expected low, medium or high")]
    InvalidPriority(String),

    #[error("invalid date {input:?}: {reason}")]
    InvalidDate { input: String, reason: String },

    #[error("date {0:?} has already passed")]
    DateAlreadyPassed(String),

    #[error("event not found: {0}")]
    NotFound(String),

    #[error("{query:?} matches {matches} events, be more specific")]
    Ambiguous { query: String, matches: usize },

    #[error("no events")]
    NoEvents,
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("deserialization failed: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("serialization failed: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Key does not exist in the configuration tree
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Data directory could not be determined or created
    #[error("data directory unavailable: {0}")]
    DataDir(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
