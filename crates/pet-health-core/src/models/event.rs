//! Scheduled medical event models.

use serde::{Deserialize, Serialize};

/// Kind of medical event.
///
/// Stored text outside the known set is kept as `Unrecognized` with its
/// lower-cased value, so older rows still load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "String")]
pub enum EventType {
    Consult,
    Vaccination,
    Exam,
    Medication,
    Surgery,
    Other,
    Unrecognized(String),
}

impl EventType {
    /// Canonical storage string.
    pub fn as_str(&self) -> &str {
        match self {
            EventType::Consult => "consult",
            EventType::Vaccination => "vaccination",
            EventType::Exam => "exam",
            EventType::Medication => "medication",
            EventType::Surgery => "surgery",
            EventType::Other => "other",
            EventType::Unrecognized(raw) => raw,
        }
    }

    /// Parse one of the known type strings (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "consult" => Some(EventType::Consult),
            "vaccination" => Some(EventType::Vaccination),
            "exam" => Some(EventType::Exam),
            "medication" => Some(EventType::Medication),
            "surgery" => Some(EventType::Surgery),
            "other" => Some(EventType::Other),
            _ => None,
        }
    }

    /// Read a stored value, keeping unknown text as-is (lower-cased).
    pub fn from_stored(s: &str) -> Self {
        Self::parse(s).unwrap_or_else(|| EventType::Unrecognized(s.trim().to_lowercase()))
    }

    /// Human-readable label.
    pub fn label(&self) -> &str {
        match self {
            EventType::Consult => "Consult",
            EventType::Vaccination => "Vaccination",
            EventType::Exam => "Exam",
            EventType::Medication => "Medication",
            EventType::Surgery => "Surgery",
            EventType::Other => "Other",
            EventType::Unrecognized(raw) => raw,
        }
    }
}

impl From<String> for EventType {
    fn from(value: String) -> Self {
        EventType::from_stored(&value)
    }
}

impl From<EventType> for String {
    fn from(value: EventType) -> Self {
        match value {
            EventType::Unrecognized(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

/// Lifecycle status of a medical event.
///
/// Like [`EventType`], unknown stored text survives as `Unrecognized`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "String")]
pub enum EventStatus {
    #[default]
    Scheduled,
    Done,
    Canceled,
    Unrecognized(String),
}

impl EventStatus {
    /// Canonical storage string.
    pub fn as_str(&self) -> &str {
        match self {
            EventStatus::Scheduled => "scheduled",
            EventStatus::Done => "done",
            EventStatus::Canceled => "canceled",
            EventStatus::Unrecognized(raw) => raw,
        }
    }

    /// Parse one of the known status strings (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "scheduled" => Some(EventStatus::Scheduled),
            "done" => Some(EventStatus::Done),
            "canceled" | "cancelled" => Some(EventStatus::Canceled),
            _ => None,
        }
    }

    /// Read a stored value, keeping unknown text as-is (lower-cased).
    pub fn from_stored(s: &str) -> Self {
        Self::parse(s).unwrap_or_else(|| EventStatus::Unrecognized(s.trim().to_lowercase()))
    }

    /// Done and canceled events are closed; every other status is still open.
    pub fn is_closed(&self) -> bool {
        matches!(self, EventStatus::Done | EventStatus::Canceled)
    }

    /// Human-readable label.
    pub fn label(&self) -> &str {
        match self {
            EventStatus::Scheduled => "Scheduled",
            EventStatus::Done => "Done",
            EventStatus::Canceled => "Canceled",
            EventStatus::Unrecognized(raw) => raw,
        }
    }
}

impl From<String> for EventStatus {
    fn from(value: String) -> Self {
        EventStatus::from_stored(&value)
    }
}

impl From<EventStatus> for String {
    fn from(value: EventStatus) -> Self {
        match value {
            EventStatus::Unrecognized(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

/// Price exactly as it was entered.
///
/// Older records hold free text here, so the value is only coerced to a
/// number when it is summed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RawPrice {
    Amount(f64),
    Text(String),
}

impl RawPrice {
    /// Numeric amount; anything non-numeric or non-finite counts as zero.
    pub fn amount(&self) -> f64 {
        let value = match self {
            RawPrice::Amount(value) => *value,
            RawPrice::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    0.0
                } else {
                    text.parse::<f64>().unwrap_or(0.0)
                }
            }
        };
        if value.is_finite() {
            value
        } else {
            0.0
        }
    }
}

impl From<f64> for RawPrice {
    fn from(value: f64) -> Self {
        RawPrice::Amount(value)
    }
}

/// A scheduled (or past) medical event for one pet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    /// Local UUID
    pub id: String,
    /// Pet this event belongs to
    pub pet_id: String,
    /// Pet name, joined in when listing across pets
    pub pet_name: Option<String>,
    /// Short title
    pub title: String,
    /// Kind of event
    pub event_type: Option<EventType>,
    /// Lifecycle status; absent means scheduled
    pub status: Option<EventStatus>,
    /// Date in any shape `temporal::parse_flexible_date` accepts
    pub date: Option<String>,
    /// Time of day (`HH:MM`)
    pub time: Option<String>,
    /// Price as entered
    pub price: Option<RawPrice>,
    /// Attending veterinarian
    pub veterinarian: Option<String>,
    /// Notes
    pub description: Option<String>,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl Event {
    /// Create a new scheduled event.
    pub fn new(pet_id: String, title: String, date: Option<String>) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            pet_id,
            pet_name: None,
            title,
            event_type: None,
            status: Some(EventStatus::Scheduled),
            date,
            time: None,
            price: None,
            veterinarian: None,
            description: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Status with the "absent means scheduled" rule applied.
    pub fn effective_status(&self) -> EventStatus {
        self.status.clone().unwrap_or_default()
    }

    /// Check if the event is still upcoming work (not done or canceled).
    pub fn is_pending(&self) -> bool {
        !self.status.as_ref().is_some_and(EventStatus::is_closed)
    }

    /// Price coerced to a number (zero when missing or unreadable).
    pub fn price_amount(&self) -> f64 {
        self.price.as_ref().map(RawPrice::amount).unwrap_or(0.0)
    }
}

/// Optional criteria for narrowing an event list.
///
/// Each unset field matches everything. The status criterion compares the
/// effective status, so a row without a status matches `Scheduled`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EventFilter {
    pub pet_id: Option<String>,
    pub event_type: Option<EventType>,
    pub status: Option<EventStatus>,
}

impl EventFilter {
    /// True when no criterion is set.
    pub fn is_empty(&self) -> bool {
        self.pet_id.is_none() && self.event_type.is_none() && self.status.is_none()
    }

    pub fn matches(&self, event: &Event) -> bool {
        if let Some(pet_id) = &self.pet_id {
            if &event.pet_id != pet_id {
                return false;
            }
        }
        if let Some(event_type) = &self.event_type {
            if event.event_type.as_ref() != Some(event_type) {
                return false;
            }
        }
        if let Some(status) = &self.status {
            if &event.effective_status() != status {
                return false;
            }
        }
        true
    }
}
