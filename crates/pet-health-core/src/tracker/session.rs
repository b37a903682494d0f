//! Optimistic, session-local view of one course.
//!
//! The view shows the new state as soon as an action is taken. If the store
//! then rejects the write, the view goes back to the exact state it had
//! before the action and the error is returned, so what the owner sees never
//! drifts from what is stored.

use chrono::{DateTime, Local};

use super::state::{self, CourseProgress, CourseUpdate, DisplayStatus};
use super::{CourseStore, TrackerResult, TreatmentTracker};
use crate::models::Course;

/// A course as currently shown in a session.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedCourse {
    course: Course,
}

impl TrackedCourse {
    pub fn new(mut course: Course) -> Self {
        course.clamp_progress();
        Self { course }
    }

    pub fn course(&self) -> &Course {
        &self.course
    }

    pub fn into_course(self) -> Course {
        self.course
    }

    pub fn display_status(&self, now: DateTime<Local>) -> DisplayStatus {
        DisplayStatus::of(&self.course, now)
    }

    pub fn progress(&self) -> CourseProgress {
        CourseProgress::of(&self.course)
    }

    pub fn can_register_dose(&self) -> bool {
        state::can_register_dose(&self.course)
    }

    pub fn can_undo_dose(&self) -> bool {
        state::can_undo_dose(&self.course)
    }

    pub fn can_toggle_pause(&self) -> bool {
        state::can_toggle_pause(&self.course)
    }

    /// Returns whether anything changed.
    pub fn register_dose<S: CourseStore + ?Sized>(
        &mut self,
        tracker: &TreatmentTracker<'_, S>,
    ) -> TrackerResult<bool> {
        let update = state::register_dose(&self.course);
        self.run(tracker, update)
    }

    pub fn undo_dose<S: CourseStore + ?Sized>(
        &mut self,
        tracker: &TreatmentTracker<'_, S>,
    ) -> TrackerResult<bool> {
        let update = state::undo_dose(&self.course);
        self.run(tracker, update)
    }

    pub fn toggle_pause<S: CourseStore + ?Sized>(
        &mut self,
        tracker: &TreatmentTracker<'_, S>,
    ) -> TrackerResult<bool> {
        let update = state::toggle_pause(&self.course);
        self.run(tracker, update)
    }

    pub fn toggle_completion<S: CourseStore + ?Sized>(
        &mut self,
        tracker: &TreatmentTracker<'_, S>,
    ) -> TrackerResult<bool> {
        let update = state::toggle_completion(&self.course);
        self.run(tracker, update)
    }

    fn run<S: CourseStore + ?Sized>(
        &mut self,
        tracker: &TreatmentTracker<'_, S>,
        update: Option<CourseUpdate>,
    ) -> TrackerResult<bool> {
        let Some(update) = update else {
            return Ok(false);
        };

        let snapshot = self.course.clone();
        self.course = update.apply_to(&snapshot);

        match tracker.persist(&snapshot.id, &update) {
            Ok(stored) => {
                self.course = stored;
                Ok(true)
            }
            Err(err) => {
                tracing::warn!(
                    course_id = %snapshot.id,
                    error = %err,
                    "course update failed, restoring previous state"
                );
                self.course = snapshot;
                Err(err)
            }
        }
    }
}
