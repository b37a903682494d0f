//! Medication course tracking.
//!
//! Flow: owner action → transition on the current course → one combined
//! store write of `{status, days_completed}` → stored course back.
//!
//! Transitions that are not allowed in the current state are no-ops and
//! return `None`; store failures are always returned to the caller.

mod session;
mod state;

pub use session::*;
pub use state::*;

use thiserror::Error;

use crate::db::{Database, DbError, DbResult};
use crate::models::{Course, CourseStatus};

/// Tracker errors.
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Store error: {0}")]
    Store(#[from] DbError),
}

pub type TrackerResult<T> = Result<T, TrackerError>;

/// Where course progress is persisted.
///
/// Both writes change status and counter in a single atomic update, scoped
/// to the owner.
pub trait CourseStore {
    fn update_course_progress(
        &self,
        owner_id: &str,
        course_id: &str,
        days_completed: u32,
        status: Option<CourseStatus>,
    ) -> DbResult<Course>;

    fn update_course_status(
        &self,
        owner_id: &str,
        course_id: &str,
        status: CourseStatus,
        days_completed: Option<u32>,
    ) -> DbResult<Course>;
}

impl CourseStore for Database {
    fn update_course_progress(
        &self,
        owner_id: &str,
        course_id: &str,
        days_completed: u32,
        status: Option<CourseStatus>,
    ) -> DbResult<Course> {
        Database::update_course_progress(self, owner_id, course_id, days_completed, status)
    }

    fn update_course_status(
        &self,
        owner_id: &str,
        course_id: &str,
        status: CourseStatus,
        days_completed: Option<u32>,
    ) -> DbResult<Course> {
        Database::update_course_status(self, owner_id, course_id, status, days_completed)
    }
}

/// Applies course transitions for one owner.
pub struct TreatmentTracker<'a, S: CourseStore + ?Sized> {
    store: &'a S,
    owner_id: String,
}

impl<'a, S: CourseStore + ?Sized> TreatmentTracker<'a, S> {
    /// Create a tracker writing through `store` on behalf of `owner_id`.
    pub fn new(store: &'a S, owner_id: impl Into<String>) -> Self {
        Self {
            store,
            owner_id: owner_id.into(),
        }
    }

    /// Register one dose. `None` when the course is completed or full.
    pub fn register_dose(&self, course: &Course) -> TrackerResult<Option<Course>> {
        self.apply(course, state::register_dose(course))
    }

    /// Undo the last dose. `None` when nothing is registered or the course is completed.
    pub fn undo_dose(&self, course: &Course) -> TrackerResult<Option<Course>> {
        self.apply(course, state::undo_dose(course))
    }

    /// Pause or resume. `None` when the course is completed.
    pub fn toggle_pause(&self, course: &Course) -> TrackerResult<Option<Course>> {
        self.apply(course, state::toggle_pause(course))
    }

    /// Force-complete or reopen.
    pub fn toggle_completion(&self, course: &Course) -> TrackerResult<Option<Course>> {
        self.apply(course, state::toggle_completion(course))
    }

    fn apply(
        &self,
        course: &Course,
        update: Option<CourseUpdate>,
    ) -> TrackerResult<Option<Course>> {
        match update {
            Some(update) => self.persist(&course.id, &update).map(Some),
            None => {
                tracing::debug!(
                    course_id = %course.id,
                    status = course.status.as_str(),
                    "transition not allowed, skipping"
                );
                Ok(None)
            }
        }
    }

    /// Write one combined update through the store.
    pub fn persist(&self, course_id: &str, update: &CourseUpdate) -> TrackerResult<Course> {
        let stored = match *update {
            CourseUpdate::Progress {
                days_completed,
                status,
            } => self.store.update_course_progress(
                &self.owner_id,
                course_id,
                days_completed,
                status,
            )?,
            CourseUpdate::Status {
                status,
                days_completed,
            } => self.store.update_course_status(
                &self.owner_id,
                course_id,
                status,
                days_completed,
            )?,
        };

        tracing::debug!(
            course_id,
            status = stored.status.as_str(),
            days_completed = stored.days_completed,
            "course updated"
        );
        Ok(stored)
    }
}
