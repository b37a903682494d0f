//! Pure course state: displayed status, transitions and progress metrics.

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{Course, CourseStatus};

/// Status shown to the owner, derived from stored state and today's date.
///
/// Never stored: it is recomputed from the course every time it is shown.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DisplayStatus {
    Completed,
    AwaitingStart,
    Overdue,
    Paused,
    InProgress,
}

impl DisplayStatus {
    /// Derive the displayed status. First matching rule wins:
    ///
    /// 1. completed status, or every dose registered
    /// 2. today is before the start date
    /// 3. today is past start date + duration
    /// 4. paused status
    /// 5. in progress
    ///
    /// Dates compare by calendar day. A course whose start date cannot be
    /// read skips the two date rules.
    pub fn of(course: &Course, now: DateTime<Local>) -> Self {
        Self::on(course, now.date_naive())
    }

    /// Same as [`DisplayStatus::of`] for a given calendar day.
    pub fn on(course: &Course, today: NaiveDate) -> Self {
        if course.is_completed() || course.days_completed >= course.duration_days {
            return DisplayStatus::Completed;
        }
        if let Some(start) = course.start() {
            if today < start {
                return DisplayStatus::AwaitingStart;
            }
            if course.expected_end().is_some_and(|end| today > end) {
                return DisplayStatus::Overdue;
            }
        }
        if course.status == CourseStatus::Paused {
            return DisplayStatus::Paused;
        }
        DisplayStatus::InProgress
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayStatus::Completed => "completed",
            DisplayStatus::AwaitingStart => "awaiting_start",
            DisplayStatus::Overdue => "overdue",
            DisplayStatus::Paused => "paused",
            DisplayStatus::InProgress => "in_progress",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            DisplayStatus::Completed => "Completed",
            DisplayStatus::AwaitingStart => "Awaiting start",
            DisplayStatus::Overdue => "Overdue",
            DisplayStatus::Paused => "Paused",
            DisplayStatus::InProgress => "In progress",
        }
    }
}

/// One combined write of status and counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseUpdate {
    /// Set the counter, optionally changing status too
    Progress {
        days_completed: u32,
        status: Option<CourseStatus>,
    },
    /// Set the status, optionally changing the counter too
    Status {
        status: CourseStatus,
        days_completed: Option<u32>,
    },
}

impl CourseUpdate {
    /// The course as it will look once the store has applied this update.
    ///
    /// Mirrors the store statement, including remembering the counter right
    /// before the course becomes completed.
    pub fn apply_to(&self, course: &Course) -> Course {
        let (days, status) = match *self {
            CourseUpdate::Progress {
                days_completed,
                status,
            } => (days_completed, status.unwrap_or(course.status)),
            CourseUpdate::Status {
                status,
                days_completed,
            } => (days_completed.unwrap_or(course.days_completed), status),
        };

        let days_before_completion = match (course.status, status) {
            (CourseStatus::Completed, CourseStatus::Completed) => course.days_before_completion,
            (_, CourseStatus::Completed) => Some(course.days_completed),
            _ => None,
        };

        let mut next = course.clone();
        next.status = status;
        next.days_completed = days.min(course.duration_days);
        next.days_before_completion = days_before_completion;
        next
    }
}

/// Check if a dose can be registered.
pub fn can_register_dose(course: &Course) -> bool {
    !course.is_completed() && course.days_completed < course.duration_days
}

/// Check if the last dose can be undone.
pub fn can_undo_dose(course: &Course) -> bool {
    course.days_completed > 0 && !course.is_completed()
}

/// Check if the course can be paused or resumed.
pub fn can_toggle_pause(course: &Course) -> bool {
    !course.is_completed()
}

/// Register one dose. Reaching the full duration completes the course in the
/// same update.
pub fn register_dose(course: &Course) -> Option<CourseUpdate> {
    if !can_register_dose(course) {
        return None;
    }
    let days = (course.days_completed + 1).min(course.duration_days);
    let status = (days >= course.duration_days).then_some(CourseStatus::Completed);
    Some(CourseUpdate::Progress {
        days_completed: days,
        status,
    })
}

/// Take back the last registered dose.
pub fn undo_dose(course: &Course) -> Option<CourseUpdate> {
    if !can_undo_dose(course) {
        return None;
    }
    Some(CourseUpdate::Progress {
        days_completed: course.days_completed.saturating_sub(1),
        status: None,
    })
}

/// Flip between active and paused.
pub fn toggle_pause(course: &Course) -> Option<CourseUpdate> {
    if !can_toggle_pause(course) {
        return None;
    }
    let status = match course.status {
        CourseStatus::Paused => CourseStatus::Active,
        _ => CourseStatus::Paused,
    };
    Some(CourseUpdate::Status {
        status,
        days_completed: None,
    })
}

/// Force-complete an open course, or reopen a completed one.
///
/// Reopening restores the counter the course had right before it was
/// completed and then takes one dose back off it.
pub fn toggle_completion(course: &Course) -> Option<CourseUpdate> {
    if course.is_completed() {
        let restored = course
            .days_before_completion
            .unwrap_or(course.days_completed);
        return Some(CourseUpdate::Status {
            status: CourseStatus::Active,
            days_completed: Some(restored.saturating_sub(1)),
        });
    }

    let days = if course.duration_days > 0 {
        course.duration_days
    } else {
        course.days_completed
    };
    Some(CourseUpdate::Status {
        status: CourseStatus::Completed,
        days_completed: Some(days),
    })
}

/// Progress figures for display.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CourseProgress {
    /// Share of doses registered, rounded to a whole percent
    pub progress_percent: u32,
    /// Doses still to go
    pub remaining_days: u32,
    /// 1-based day the owner is on, never past the last day
    pub current_day: u32,
    /// Start date plus duration
    pub expected_end: Option<NaiveDate>,
}

impl CourseProgress {
    pub fn of(course: &Course) -> Self {
        let days = course.days_completed.min(course.duration_days);
        let total = course.duration_days;

        let progress_percent = if total > 0 {
            // Round half up, in integers
            let scaled = (200 * u64::from(days) + u64::from(total)) / (2 * u64::from(total));
            u32::try_from(scaled).unwrap_or(100)
        } else {
            0
        };

        Self {
            progress_percent,
            remaining_days: total.saturating_sub(days),
            current_day: (days + 1).min(total),
            expected_end: course.expected_end(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(duration: u32, days: u32, status: CourseStatus) -> Course {
        let mut course = Course::new(
            "pet-1".into(),
            "Amoxicillin".into(),
            "2024-03-01".into(),
            duration,
        );
        course.days_completed = days;
        course.status = status;
        course
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_display_precedence() {
        let active = course(10, 3, CourseStatus::Active);
        assert_eq!(DisplayStatus::on(&active, day(2024, 2, 20)), DisplayStatus::AwaitingStart);
        assert_eq!(DisplayStatus::on(&active, day(2024, 3, 1)), DisplayStatus::InProgress);
        assert_eq!(DisplayStatus::on(&active, day(2024, 3, 11)), DisplayStatus::InProgress);
        assert_eq!(DisplayStatus::on(&active, day(2024, 3, 12)), DisplayStatus::Overdue);

        let paused = course(10, 3, CourseStatus::Paused);
        assert_eq!(DisplayStatus::on(&paused, day(2024, 3, 5)), DisplayStatus::Paused);
        assert_eq!(DisplayStatus::on(&paused, day(2024, 2, 20)), DisplayStatus::AwaitingStart);
        assert_eq!(DisplayStatus::on(&paused, day(2024, 4, 1)), DisplayStatus::Overdue);
    }

    #[test]
    fn test_completed_outranks_dates() {
        let done = course(10, 4, CourseStatus::Completed);
        assert_eq!(DisplayStatus::on(&done, day(2025, 1, 1)), DisplayStatus::Completed);
        assert_eq!(DisplayStatus::on(&done, day(2024, 1, 1)), DisplayStatus::Completed);

        let all_doses = course(10, 10, CourseStatus::Active);
        assert_eq!(DisplayStatus::on(&all_doses, day(2025, 1, 1)), DisplayStatus::Completed);
    }

    #[test]
    fn test_unreadable_start_skips_date_rules() {
        let mut undated = course(10, 3, CourseStatus::Paused);
        undated.start_date = "whenever".into();
        assert_eq!(DisplayStatus::on(&undated, day(2024, 3, 5)), DisplayStatus::Paused);
    }

    #[test]
    fn test_register_last_dose_completes() {
        let c = course(5, 4, CourseStatus::Active);
        let update = register_dose(&c).unwrap();
        assert_eq!(
            update,
            CourseUpdate::Progress {
                days_completed: 5,
                status: Some(CourseStatus::Completed)
            }
        );

        let next = update.apply_to(&c);
        assert_eq!(next.days_completed, 5);
        assert_eq!(next.status, CourseStatus::Completed);
        assert_eq!(next.days_before_completion, Some(4));
    }

    #[test]
    fn test_register_dose_disabled() {
        assert_eq!(register_dose(&course(5, 5, CourseStatus::Active)), None);
        assert_eq!(register_dose(&course(5, 2, CourseStatus::Completed)), None);
        assert_eq!(register_dose(&course(0, 0, CourseStatus::Active)), None);
    }

    #[test]
    fn test_register_dose_while_paused_keeps_status() {
        let c = course(5, 1, CourseStatus::Paused);
        let next = register_dose(&c).unwrap().apply_to(&c);
        assert_eq!(next.days_completed, 2);
        assert_eq!(next.status, CourseStatus::Paused);
    }

    #[test]
    fn test_undo_dose() {
        let c = course(5, 3, CourseStatus::Active);
        assert_eq!(undo_dose(&c).unwrap().apply_to(&c).days_completed, 2);

        assert_eq!(undo_dose(&course(5, 0, CourseStatus::Active)), None);
        assert_eq!(undo_dose(&course(5, 5, CourseStatus::Completed)), None);
    }

    #[test]
    fn test_toggle_pause() {
        let active = course(5, 2, CourseStatus::Active);
        let paused = toggle_pause(&active).unwrap().apply_to(&active);
        assert_eq!(paused.status, CourseStatus::Paused);
        assert_eq!(paused.days_completed, 2);

        let resumed = toggle_pause(&paused).unwrap().apply_to(&paused);
        assert_eq!(resumed.status, CourseStatus::Active);

        assert_eq!(toggle_pause(&course(5, 5, CourseStatus::Completed)), None);
    }

    #[test]
    fn test_force_complete_then_reopen() {
        let c = course(7, 3, CourseStatus::Paused);
        let completed = toggle_completion(&c).unwrap().apply_to(&c);
        assert_eq!(completed.status, CourseStatus::Completed);
        assert_eq!(completed.days_completed, 7);
        assert_eq!(completed.days_before_completion, Some(3));

        let reopened = toggle_completion(&completed).unwrap().apply_to(&completed);
        assert_eq!(reopened.status, CourseStatus::Active);
        assert_eq!(reopened.days_completed, 2);
        assert_eq!(reopened.days_before_completion, None);
    }

    #[test]
    fn test_reopen_without_memory_uses_current_counter() {
        let c = course(7, 7, CourseStatus::Completed);
        let reopened = toggle_completion(&c).unwrap().apply_to(&c);
        assert_eq!(reopened.days_completed, 6);

        let empty = course(7, 0, CourseStatus::Completed);
        assert_eq!(toggle_completion(&empty).unwrap().apply_to(&empty).days_completed, 0);
    }

    #[test]
    fn test_force_complete_zero_duration() {
        let c = course(0, 0, CourseStatus::Active);
        let completed = toggle_completion(&c).unwrap().apply_to(&c);
        assert_eq!(completed.status, CourseStatus::Completed);
        assert_eq!(completed.days_completed, 0);
    }

    #[test]
    fn test_progress_metrics() {
        let p = CourseProgress::of(&course(8, 1, CourseStatus::Active));
        assert_eq!(p.progress_percent, 13); // 12.5 rounds up
        assert_eq!(p.remaining_days, 7);
        assert_eq!(p.current_day, 2);
        assert_eq!(p.expected_end, Some(day(2024, 3, 9)));

        let full = CourseProgress::of(&course(3, 3, CourseStatus::Completed));
        assert_eq!(full.progress_percent, 100);
        assert_eq!(full.remaining_days, 0);
        assert_eq!(full.current_day, 3);

        let zero = CourseProgress::of(&course(0, 0, CourseStatus::Active));
        assert_eq!(zero.progress_percent, 0);
        assert_eq!(zero.remaining_days, 0);
    }
}
