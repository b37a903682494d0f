//! Medication course database operations.
//!
//! Status and counter only ever change together, in one statement, through
//! [`Database::update_course_progress`] or [`Database::update_course_status`].
//! The same statement remembers the counter value the course had right
//! before it became completed, so a later reopen can restore it.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::models::{Course, CourseStatus};

const COURSE_COLUMNS: &str = "id, pet_id, drug_name, dosage, schedule, start_date, duration_days, \
                              instructions, status, days_completed, days_before_completion, \
                              created_at, updated_at";

const OWNED_BY: &str = "pet_id IN (SELECT id FROM pets WHERE owner_id = ?2)";

impl Database {
    /// Insert a new course. Fails with `NotFound` when the owner has no such pet.
    pub fn insert_course(&self, owner_id: &str, course: &Course) -> DbResult<()> {
        let mut course = course.clone();
        course.clamp_progress();

        let rows_affected = self.conn.execute(
            r#"
            INSERT INTO courses (
                id, pet_id, drug_name, dosage, schedule, start_date, duration_days,
                instructions, status, days_completed, days_before_completion,
                created_at, updated_at
            )
            SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13
            WHERE EXISTS (SELECT 1 FROM pets WHERE id = ?2 AND owner_id = ?14)
            "#,
            params![
                course.id,
                course.pet_id,
                course.drug_name,
                course.dosage,
                course.schedule,
                course.start_date,
                course.duration_days,
                course.instructions,
                course.status.as_str(),
                course.days_completed,
                course.days_before_completion,
                course.created_at,
                course.updated_at,
                owner_id,
            ],
        )?;

        if rows_affected == 0 {
            return Err(DbError::NotFound(format!("pet {}", course.pet_id)));
        }
        Ok(())
    }

    /// Update the descriptive fields of a course.
    ///
    /// Status is left alone; the counter is only pulled down if the new
    /// duration is shorter than the progress already made.
    pub fn update_course_details(&self, owner_id: &str, course: &Course) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            &format!(
                r#"
                UPDATE courses SET
                    drug_name = ?3,
                    dosage = ?4,
                    schedule = ?5,
                    start_date = ?6,
                    duration_days = ?7,
                    instructions = ?8,
                    days_completed = MIN(days_completed, ?7),
                    days_before_completion = MIN(days_before_completion, ?7),
                    updated_at = datetime('now')
                WHERE id = ?1 AND {OWNED_BY}
                "#
            ),
            params![
                course.id,
                owner_id,
                course.drug_name,
                course.dosage,
                course.schedule,
                course.start_date,
                course.duration_days,
                course.instructions,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Set the dose counter, optionally changing status in the same update.
    pub fn update_course_progress(
        &self,
        owner_id: &str,
        course_id: &str,
        days_completed: u32,
        status: Option<CourseStatus>,
    ) -> DbResult<Course> {
        self.apply_course_update(owner_id, course_id, Some(days_completed), status)
    }

    /// Set the status, optionally changing the dose counter in the same update.
    pub fn update_course_status(
        &self,
        owner_id: &str,
        course_id: &str,
        status: CourseStatus,
        days_completed: Option<u32>,
    ) -> DbResult<Course> {
        self.apply_course_update(owner_id, course_id, days_completed, Some(status))
    }

    fn apply_course_update(
        &self,
        owner_id: &str,
        course_id: &str,
        days_completed: Option<u32>,
        status: Option<CourseStatus>,
    ) -> DbResult<Course> {
        // Right-hand sides all see the row as it was before the update.
        let row = self
            .conn
            .query_row(
                &format!(
                    r#"
                    UPDATE courses SET
                        days_completed = MIN(COALESCE(?3, days_completed), duration_days),
                        status = COALESCE(?4, status),
                        days_before_completion = CASE
                            WHEN COALESCE(?4, status) = 'completed' AND status <> 'completed'
                                THEN days_completed
                            WHEN COALESCE(?4, status) = 'completed'
                                THEN days_before_completion
                            ELSE NULL
                        END,
                        updated_at = datetime('now')
                    WHERE id = ?1 AND {OWNED_BY}
                    RETURNING {COURSE_COLUMNS}
                    "#
                ),
                params![
                    course_id,
                    owner_id,
                    days_completed,
                    status.map(|s| s.as_str()),
                ],
                course_row,
            )
            .optional()?
            .ok_or_else(|| DbError::NotFound(format!("course {}", course_id)))?;

        row.try_into()
    }

    /// Get one of the owner's courses.
    pub fn get_course(&self, owner_id: &str, course_id: &str) -> DbResult<Option<Course>> {
        self.conn
            .query_row(
                &format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = ?1 AND {OWNED_BY}"),
                [course_id, owner_id],
                course_row,
            )
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// List courses for one of the owner's pets, newest first.
    pub fn list_courses_for_pet(&self, owner_id: &str, pet_id: &str) -> DbResult<Vec<Course>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses \
             WHERE pet_id = ?1 AND {OWNED_BY} \
             ORDER BY created_at DESC"
        ))?;

        let rows = stmt.query_map([pet_id, owner_id], course_row)?;

        let mut courses = Vec::new();
        for row in rows {
            courses.push(row?.try_into()?);
        }
        Ok(courses)
    }

    /// List courses across all of the owner's pets, newest first.
    pub fn list_courses(&self, owner_id: &str) -> DbResult<Vec<Course>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses \
             WHERE pet_id IN (SELECT id FROM pets WHERE owner_id = ?1) \
             ORDER BY created_at DESC"
        ))?;

        let rows = stmt.query_map([owner_id], course_row)?;

        let mut courses = Vec::new();
        for row in rows {
            courses.push(row?.try_into()?);
        }
        Ok(courses)
    }

    /// Delete a course.
    pub fn delete_course(&self, owner_id: &str, course_id: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            &format!("DELETE FROM courses WHERE id = ?1 AND {OWNED_BY}"),
            [course_id, owner_id],
        )?;
        Ok(rows_affected > 0)
    }
}

/// Intermediate row struct for database mapping.
struct CourseRow {
    id: String,
    pet_id: String,
    drug_name: String,
    dosage: String,
    schedule: String,
    start_date: String,
    duration_days: u32,
    instructions: Option<String>,
    status: String,
    days_completed: u32,
    days_before_completion: Option<u32>,
    created_at: String,
    updated_at: String,
}

fn course_row(row: &Row<'_>) -> rusqlite::Result<CourseRow> {
    Ok(CourseRow {
        id: row.get(0)?,
        pet_id: row.get(1)?,
        drug_name: row.get(2)?,
        dosage: row.get(3)?,
        schedule: row.get(4)?,
        start_date: row.get(5)?,
        duration_days: row.get(6)?,
        instructions: row.get(7)?,
        status: row.get(8)?,
        days_completed: row.get(9)?,
        days_before_completion: row.get(10)?,
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
    })
}

impl TryFrom<CourseRow> for Course {
    type Error = DbError;

    fn try_from(row: CourseRow) -> Result<Self, Self::Error> {
        let status = CourseStatus::parse(&row.status)
            .ok_or_else(|| DbError::Constraint(format!("Unknown course status: {}", row.status)))?;

        let mut course = Course {
            id: row.id,
            pet_id: row.pet_id,
            drug_name: row.drug_name,
            dosage: row.dosage,
            schedule: row.schedule,
            start_date: row.start_date,
            duration_days: row.duration_days,
            instructions: row.instructions,
            status,
            days_completed: row.days_completed,
            days_before_completion: row.days_before_completion,
            created_at: row.created_at,
            updated_at: row.updated_at,
        };
        course.clamp_progress();
        Ok(course)
    }
}
