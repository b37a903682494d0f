//! Medical event database operations.

use rusqlite::types::Value;
use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::models::{Event, EventFilter, EventStatus, EventType, RawPrice};

const EVENT_COLUMNS: &str = "e.id, e.pet_id, p.name, e.title, e.event_type, e.status, e.date, \
                             e.time, e.price, e.veterinarian, e.description, \
                             e.created_at, e.updated_at";

impl Database {
    /// Insert a new event. Fails with `NotFound` when the owner has no such pet.
    pub fn insert_event(&self, owner_id: &str, event: &Event) -> DbResult<()> {
        let rows_affected = self.conn.execute(
            r#"
            INSERT INTO events (
                id, pet_id, title, event_type, status, date, time, price,
                veterinarian, description, created_at, updated_at
            )
            SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12
            WHERE EXISTS (SELECT 1 FROM pets WHERE id = ?2 AND owner_id = ?13)
            "#,
            params![
                event.id,
                event.pet_id,
                event.title,
                event.event_type.as_ref().map(EventType::as_str),
                event.status.as_ref().map(EventStatus::as_str),
                event.date,
                event.time,
                price_to_value(event.price.as_ref()),
                event.veterinarian,
                event.description,
                event.created_at,
                event.updated_at,
                owner_id,
            ],
        )?;

        if rows_affected == 0 {
            return Err(DbError::NotFound(format!("pet {}", event.pet_id)));
        }
        Ok(())
    }

    /// Update an existing event. Returns false when the owner has no such event.
    pub fn update_event(&self, owner_id: &str, event: &Event) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE events SET
                title = ?3,
                event_type = ?4,
                status = ?5,
                date = ?6,
                time = ?7,
                price = ?8,
                veterinarian = ?9,
                description = ?10,
                updated_at = datetime('now')
            WHERE id = ?1
              AND pet_id IN (SELECT id FROM pets WHERE owner_id = ?2)
            "#,
            params![
                event.id,
                owner_id,
                event.title,
                event.event_type.as_ref().map(EventType::as_str),
                event.status.as_ref().map(EventStatus::as_str),
                event.date,
                event.time,
                price_to_value(event.price.as_ref()),
                event.veterinarian,
                event.description,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Change only the status of an event.
    pub fn set_event_status(
        &self,
        owner_id: &str,
        event_id: &str,
        status: EventStatus,
    ) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE events SET status = ?3, updated_at = datetime('now')
            WHERE id = ?1
              AND pet_id IN (SELECT id FROM pets WHERE owner_id = ?2)
            "#,
            params![event_id, owner_id, status.as_str()],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get one of the owner's events.
    pub fn get_event(&self, owner_id: &str, event_id: &str) -> DbResult<Option<Event>> {
        let row = self
            .conn
            .query_row(
                &format!(
                    "SELECT {EVENT_COLUMNS} FROM events e \
                     JOIN pets p ON p.id = e.pet_id \
                     WHERE e.id = ?1 AND p.owner_id = ?2"
                ),
                [event_id, owner_id],
                event_row,
            )
            .optional()?;
        Ok(row.map(Event::from))
    }

    /// List events across all of the owner's pets, oldest date first.
    pub fn list_events(&self, owner_id: &str) -> DbResult<Vec<Event>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {EVENT_COLUMNS} FROM events e \
             JOIN pets p ON p.id = e.pet_id \
             WHERE p.owner_id = ?1 \
             ORDER BY e.date ASC"
        ))?;

        let rows = stmt.query_map([owner_id], event_row)?;

        let mut events = Vec::new();
        for row in rows {
            events.push(Event::from(row?));
        }
        Ok(events)
    }

    /// List the owner's events that pass `filter`, oldest date first.
    pub fn list_events_filtered(
        &self,
        owner_id: &str,
        filter: &EventFilter,
    ) -> DbResult<Vec<Event>> {
        let mut events = self.list_events(owner_id)?;
        events.retain(|event| filter.matches(event));
        Ok(events)
    }

    /// Full event history of one pet, newest date first.
    pub fn list_events_for_pet(&self, owner_id: &str, pet_id: &str) -> DbResult<Vec<Event>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {EVENT_COLUMNS} FROM events e \
             JOIN pets p ON p.id = e.pet_id \
             WHERE e.pet_id = ?1 AND p.owner_id = ?2 \
             ORDER BY e.date DESC"
        ))?;

        let rows = stmt.query_map([pet_id, owner_id], event_row)?;

        let mut events = Vec::new();
        for row in rows {
            events.push(Event::from(row?));
        }
        Ok(events)
    }

    /// Delete an event.
    pub fn delete_event(&self, owner_id: &str, event_id: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            DELETE FROM events
            WHERE id = ?1
              AND pet_id IN (SELECT id FROM pets WHERE owner_id = ?2)
            "#,
            [event_id, owner_id],
        )?;
        Ok(rows_affected > 0)
    }
}

/// Intermediate row struct for database mapping.
struct EventRow {
    id: String,
    pet_id: String,
    pet_name: Option<String>,
    title: String,
    event_type: Option<String>,
    status: Option<String>,
    date: Option<String>,
    time: Option<String>,
    price: Value,
    veterinarian: Option<String>,
    description: Option<String>,
    created_at: String,
    updated_at: String,
}

fn event_row(row: &Row<'_>) -> rusqlite::Result<EventRow> {
    Ok(EventRow {
        id: row.get(0)?,
        pet_id: row.get(1)?,
        pet_name: row.get(2)?,
        title: row.get(3)?,
        event_type: row.get(4)?,
        status: row.get(5)?,
        date: row.get(6)?,
        time: row.get(7)?,
        price: row.get(8)?,
        veterinarian: row.get(9)?,
        description: row.get(10)?,
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
    })
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        let event_type = stored_text(row.event_type.as_deref()).map(EventType::from_stored);
        let status = stored_text(row.status.as_deref()).map(EventStatus::from_stored);

        Event {
            id: row.id,
            pet_id: row.pet_id,
            pet_name: row.pet_name,
            title: row.title,
            event_type,
            status,
            date: row.date,
            time: row.time,
            price: value_to_price(row.price),
            veterinarian: row.veterinarian,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Blank text counts as no value.
fn stored_text(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

fn price_to_value(price: Option<&RawPrice>) -> Value {
    match price {
        Some(RawPrice::Amount(amount)) => Value::Real(*amount),
        Some(RawPrice::Text(text)) => Value::Text(text.clone()),
        None => Value::Null,
    }
}

fn value_to_price(value: Value) -> Option<RawPrice> {
    match value {
        Value::Integer(amount) => Some(RawPrice::Amount(amount as f64)),
        Value::Real(amount) => Some(RawPrice::Amount(amount)),
        Value::Text(text) => Some(RawPrice::Text(text)),
        Value::Null | Value::Blob(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Pet;

    fn setup_db() -> (Database, Pet) {
        let db = Database::open_in_memory().unwrap();
        let pet = Pet::new("owner-1".into(), "Rex".into(), "dog".into());
        db.insert_pet(&pet).unwrap();
        (db, pet)
    }

    fn make_event(pet: &Pet, title: &str, date: &str) -> Event {
        let mut event = Event::new(pet.id.clone(), title.into(), Some(date.into()));
        event.event_type = Some(EventType::Vaccination);
        event
    }

    #[test]
    fn test_insert_and_get_event() {
        let (db, pet) = setup_db();
        let mut event = make_event(&pet, "Rabies booster", "2024-05-10");
        event.time = Some("14:30".into());
        event.price = Some(RawPrice::Amount(80.0));
        event.veterinarian = Some("Dr. Lima".into());
        db.insert_event("owner-1", &event).unwrap();

        let retrieved = db.get_event("owner-1", &event.id).unwrap().unwrap();
        assert_eq!(retrieved.title, "Rabies booster");
        assert_eq!(retrieved.pet_name, Some("Rex".into()));
        assert_eq!(retrieved.event_type, Some(EventType::Vaccination));
        assert_eq!(retrieved.status, Some(EventStatus::Scheduled));
        assert_eq!(retrieved.price, Some(RawPrice::Amount(80.0)));
        assert_eq!(retrieved.time, Some("14:30".into()));
    }

    #[test]
    fn test_price_text_survives_storage() {
        let (db, pet) = setup_db();
        let mut event = make_event(&pet, "Checkup", "2024-05-10");
        event.price = Some(RawPrice::Text("abc".into()));
        db.insert_event("owner-1", &event).unwrap();

        let retrieved = db.get_event("owner-1", &event.id).unwrap().unwrap();
        assert_eq!(retrieved.price, Some(RawPrice::Text("abc".into())));
        assert_eq!(retrieved.price_amount(), 0.0);
    }

    #[test]
    fn test_missing_status_stays_missing() {
        let (db, pet) = setup_db();
        let mut event = make_event(&pet, "Checkup", "2024-05-10");
        event.status = None;
        db.insert_event("owner-1", &event).unwrap();

        let retrieved = db.get_event("owner-1", &event.id).unwrap().unwrap();
        assert_eq!(retrieved.status, None);
        assert!(retrieved.is_pending());
    }

    #[test]
    fn test_unknown_stored_values_still_load() {
        let (db, pet) = setup_db();
        let legacy = make_event(&pet, "Checkup", "2024-05-10");
        db.insert_event("owner-1", &legacy).unwrap();
        db.insert_event("owner-1", &make_event(&pet, "Booster", "2024-05-12")).unwrap();
        db.conn()
            .execute(
                "UPDATE events SET status = 'Postponed', event_type = 'grooming' WHERE id = ?",
                [&legacy.id],
            )
            .unwrap();

        let retrieved = db.get_event("owner-1", &legacy.id).unwrap().unwrap();
        assert_eq!(retrieved.status, Some(EventStatus::Unrecognized("postponed".into())));
        assert_eq!(retrieved.event_type, Some(EventType::Unrecognized("grooming".into())));
        assert!(retrieved.is_pending());

        assert_eq!(db.list_events("owner-1").unwrap().len(), 2);
        assert_eq!(db.list_events_for_pet("owner-1", &pet.id).unwrap().len(), 2);

        // Saving the loaded event writes the lower-cased value back unchanged
        db.update_event("owner-1", &retrieved).unwrap();
        let status: String = db
            .conn()
            .query_row("SELECT status FROM events WHERE id = ?", [&legacy.id], |row| row.get(0))
            .unwrap();
        assert_eq!(status, "postponed");
    }

    #[test]
    fn test_blank_status_reads_as_missing() {
        let (db, pet) = setup_db();
        let event = make_event(&pet, "Checkup", "2024-05-10");
        db.insert_event("owner-1", &event).unwrap();
        db.conn()
            .execute("UPDATE events SET status = '  ' WHERE id = ?", [&event.id])
            .unwrap();

        let retrieved = db.get_event("owner-1", &event.id).unwrap().unwrap();
        assert_eq!(retrieved.status, None);
    }

    #[test]
    fn test_list_events_filtered() {
        let (db, pet) = setup_db();
        let other = Pet::new("owner-1".into(), "Mia".into(), "cat".into());
        db.insert_pet(&other).unwrap();

        let mut exam = make_event(&pet, "Blood work", "2024-05-01");
        exam.event_type = Some(EventType::Exam);
        let mut done = make_event(&pet, "Booster", "2024-04-01");
        done.status = Some(EventStatus::Done);
        for event in [&exam, &done, &make_event(&other, "Mia booster", "2024-05-20")] {
            db.insert_event("owner-1", event).unwrap();
        }

        let titles = |filter: EventFilter| -> Vec<String> {
            db.list_events_filtered("owner-1", &filter)
                .unwrap()
                .into_iter()
                .map(|e| e.title)
                .collect()
        };

        assert_eq!(titles(EventFilter::default()).len(), 3);
        assert_eq!(
            titles(EventFilter {
                pet_id: Some(pet.id.clone()),
                ..Default::default()
            }),
            vec!["Booster", "Blood work"]
        );
        assert_eq!(
            titles(EventFilter {
                event_type: Some(EventType::Vaccination),
                ..Default::default()
            }),
            vec!["Booster", "Mia booster"]
        );
        assert_eq!(
            titles(EventFilter {
                pet_id: Some(pet.id.clone()),
                status: Some(EventStatus::Scheduled),
                ..Default::default()
            }),
            vec!["Blood work"]
        );
        assert!(db
            .list_events_filtered("owner-2", &EventFilter::default())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_list_events_scoped_and_ordered() {
        let (db, pet) = setup_db();
        let other = Pet::new("owner-2".into(), "Mia".into(), "cat".into());
        db.insert_pet(&other).unwrap();

        db.insert_event("owner-1", &make_event(&pet, "Second", "2024-06-01")).unwrap();
        db.insert_event("owner-1", &make_event(&pet, "First", "2024-05-01")).unwrap();
        db.insert_event("owner-2", &make_event(&other, "Hidden", "2024-05-15")).unwrap();

        let events = db.list_events("owner-1").unwrap();
        let titles: Vec<_> = events.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Second"]);

        let history = db.list_events_for_pet("owner-1", &pet.id).unwrap();
        assert_eq!(history[0].title, "Second");

        assert!(db.list_events_for_pet("owner-1", &other.id).unwrap().is_empty());
    }

    #[test]
    fn test_foreign_owner_cannot_mutate() {
        let (db, pet) = setup_db();
        let mut event = make_event(&pet, "Checkup", "2024-05-10");
        db.insert_event("owner-1", &event).unwrap();

        assert!(matches!(
            db.insert_event("owner-2", &make_event(&pet, "Sneaky", "2024-05-11")),
            Err(DbError::NotFound(_))
        ));

        event.title = "Changed".into();
        assert!(!db.update_event("owner-2", &event).unwrap());
        assert!(!db.set_event_status("owner-2", &event.id, EventStatus::Done).unwrap());
        assert!(!db.delete_event("owner-2", &event.id).unwrap());

        assert!(db.set_event_status("owner-1", &event.id, EventStatus::Done).unwrap());
        let retrieved = db.get_event("owner-1", &event.id).unwrap().unwrap();
        assert_eq!(retrieved.title, "Checkup");
        assert_eq!(retrieved.status, Some(EventStatus::Done));
    }
}
