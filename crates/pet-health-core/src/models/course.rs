//! Medication course models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::temporal;

/// Stored status of a medication course.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CourseStatus {
    /// Doses are being given
    #[default]
    Active,
    /// Temporarily suspended by the owner
    Paused,
    /// Finished, either by dose count or explicitly
    Completed,
}

impl CourseStatus {
    /// Canonical storage string.
    pub fn as_str(&self) -> &'static str {
        match self {
            CourseStatus::Active => "active",
            CourseStatus::Paused => "paused",
            CourseStatus::Completed => "completed",
        }
    }

    /// Parse a storage string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "active" => Some(CourseStatus::Active),
            "paused" => Some(CourseStatus::Paused),
            "completed" => Some(CourseStatus::Completed),
            _ => None,
        }
    }
}

/// A medication course for one pet.
///
/// `days_completed` is kept within `0..=duration_days`; only the tracker
/// changes it together with `status`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Course {
    /// Local UUID
    pub id: String,
    /// Pet this course belongs to
    pub pet_id: String,
    /// Drug name
    pub drug_name: String,
    /// Dosage text (e.g., "1 tablet", "2.5 mL")
    pub dosage: String,
    /// Schedule text (e.g., "08:00 and 20:00")
    pub schedule: String,
    /// First day of the course (`YYYY-MM-DD`)
    pub start_date: String,
    /// Length of the course in whole days
    pub duration_days: u32,
    /// Free-text instructions
    pub instructions: Option<String>,
    /// Stored status
    pub status: CourseStatus,
    /// Doses registered so far
    pub days_completed: u32,
    /// Counter value right before the course last became completed
    pub days_before_completion: Option<u32>,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl Course {
    /// Create a new active course with no doses registered.
    pub fn new(pet_id: String, drug_name: String, start_date: String, duration_days: u32) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            pet_id,
            drug_name,
            dosage: String::new(),
            schedule: String::new(),
            start_date,
            duration_days,
            instructions: None,
            status: CourseStatus::Active,
            days_completed: 0,
            days_before_completion: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Calendar date the course starts on, if readable.
    pub fn start(&self) -> Option<NaiveDate> {
        temporal::parse_flexible_date(&self.start_date).map(|d| d.date_naive())
    }

    /// Calendar date the course is expected to end on (start + duration).
    pub fn expected_end(&self) -> Option<NaiveDate> {
        self.start()?
            .checked_add_days(chrono::Days::new(u64::from(self.duration_days)))
    }

    /// Pull the counter back into `0..=duration_days`.
    pub fn clamp_progress(&mut self) {
        self.days_completed = self.days_completed.min(self.duration_days);
        if let Some(before) = self.days_before_completion.as_mut() {
            *before = (*before).min(self.duration_days);
        }
    }

    /// Check if the stored status is completed.
    pub fn is_completed(&self) -> bool {
        self.status == CourseStatus::Completed
    }
}
