//! Derived reminder models.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// How urgently a reminder should be shown.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
        }
    }
}

/// A reminder derived from an upcoming event.
///
/// Never persisted: the list is rebuilt from events on every load, and the
/// read stamp only lives for the session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    /// `event-{event id}`
    pub id: String,
    /// Event the reminder was derived from
    pub event_id: String,
    /// Headline
    pub title: String,
    /// Detail line
    pub message: String,
    /// Urgency
    pub severity: Severity,
    /// When the owner saw it in this session
    pub read_at: Option<DateTime<Local>>,
    /// Parsed instant of the source event
    pub source_at: DateTime<Local>,
}

impl Notification {
    /// Check if the reminder has been seen this session.
    pub fn is_read(&self) -> bool {
        self.read_at.is_some()
    }
}
