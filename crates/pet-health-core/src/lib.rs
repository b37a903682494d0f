//! Pet Health Core Library
//!
//! Local-first core for a pet health app: pets, medical events and
//! medication courses, stored per owner in SQLite.
//!
//! # Architecture
//!
//! ```text
//!   Owner action ──► TreatmentTracker ──► one combined {status, days} write
//!                                                     │
//!   Event create/edit/delete ──► events table ──► ChangeBus(EventsChanged)
//!                                                     │
//!                                   ┌─────────────────┴─────────────────┐
//!                                   ▼                                   ▼
//!                          NotificationWindow                    EventAnalytics
//!                       (next 30 days, max 10)             (totals, monthly, yearly)
//! ```
//!
//! Reminders and analytics are derived from the stored events every time;
//! neither is persisted.
//!
//! # Modules
//!
//! - [`db`]: SQLite store, every query scoped to the owner
//! - [`models`]: Domain types (Pet, Course, Event, Notification)
//! - [`temporal`]: Lenient date parsing and day arithmetic
//! - [`tracker`]: Medication course state machine
//! - [`notifications`]: Upcoming-event reminders
//! - [`analytics`]: Event history aggregates
//! - [`identity`]: Signed-in owner
//! - [`bus`]: Change signals between writers and derived views
//! - [`config`]: Runtime tunables

pub mod analytics;
pub mod bus;
pub mod config;
pub mod db;
pub mod identity;
pub mod models;
pub mod notifications;
pub mod temporal;
pub mod tracker;

// Re-export commonly used types
pub use analytics::{AnalyticsSnapshot, Bucket, EventAnalytics};
pub use bus::{ChangeBus, Subscription, Topic};
pub use config::CoreConfig;
pub use db::Database;
pub use identity::{IdentityError, IdentityProvider, OwnerSession, SessionIdentity};
pub use models::{
    Course, CourseStatus, Event, EventFilter, EventStatus, EventType, Notification, Pet, RawPrice,
    Severity,
};
pub use notifications::{NotificationFeed, NotificationWindow};
pub use tracker::{CourseProgress, DisplayStatus, TrackedCourse, TreatmentTracker};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Local;

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum PetHealthError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not signed in")]
    NotAuthenticated,

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<db::DbError> for PetHealthError {
    fn from(e: db::DbError) -> Self {
        match e {
            db::DbError::NotFound(what) => PetHealthError::NotFound(what),
            other => PetHealthError::DatabaseError(other.to_string()),
        }
    }
}

impl From<tracker::TrackerError> for PetHealthError {
    fn from(e: tracker::TrackerError) -> Self {
        match e {
            tracker::TrackerError::Store(db_error) => db_error.into(),
        }
    }
}

impl From<IdentityError> for PetHealthError {
    fn from(e: IdentityError) -> Self {
        match e {
            IdentityError::NotAuthenticated => PetHealthError::NotAuthenticated,
        }
    }
}

impl From<config::ConfigError> for PetHealthError {
    fn from(e: config::ConfigError) -> Self {
        PetHealthError::InvalidInput(e.to_string())
    }
}

impl From<serde_json::Error> for PetHealthError {
    fn from(e: serde_json::Error) -> Self {
        PetHealthError::SerializationError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for PetHealthError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        PetHealthError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a database at the given path.
#[uniffi::export]
pub fn open_database(path: String) -> Result<Arc<PetHealthCore>, PetHealthError> {
    let db = Database::open(&path)?;
    Ok(Arc::new(PetHealthCore::new(db, CoreConfig::default())))
}

/// Open or create a database, with configuration given as JSON.
#[uniffi::export]
pub fn open_database_with_config(
    path: String,
    config_json: String,
) -> Result<Arc<PetHealthCore>, PetHealthError> {
    let config = CoreConfig::from_json(&config_json)?;
    let db = Database::open(&path)?;
    Ok(Arc::new(PetHealthCore::new(db, config)))
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory() -> Result<Arc<PetHealthCore>, PetHealthError> {
    let db = Database::open_in_memory()?;
    Ok(Arc::new(PetHealthCore::new(db, CoreConfig::default())))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe core wrapper for FFI.
///
/// Event writes and sign-in changes publish on the bus; the reminder list
/// subscribes and is rebuilt on the next read after any such change.
#[derive(uniffi::Object)]
pub struct PetHealthCore {
    db: Arc<Mutex<Database>>,
    identity: SessionIdentity,
    bus: ChangeBus,
    feed: Mutex<NotificationFeed>,
    feed_stale: Arc<AtomicBool>,
    _subscriptions: Vec<Subscription>,
}

impl PetHealthCore {
    fn new(db: Database, config: CoreConfig) -> Self {
        let bus = ChangeBus::new();
        let feed_stale = Arc::new(AtomicBool::new(true));

        let subscriptions = [Topic::EventsChanged, Topic::UserChanged]
            .into_iter()
            .map(|topic| {
                let stale = Arc::clone(&feed_stale);
                bus.subscribe(topic, move |_| stale.store(true, Ordering::SeqCst))
            })
            .collect();

        Self {
            db: Arc::new(Mutex::new(db)),
            identity: SessionIdentity::new(),
            bus,
            feed: Mutex::new(NotificationFeed::new(config)),
            feed_stale,
            _subscriptions: subscriptions,
        }
    }

    /// Bus shared by this core, for in-process listeners.
    pub fn bus(&self) -> &ChangeBus {
        &self.bus
    }

    fn owner(&self) -> Result<String, PetHealthError> {
        Ok(self.identity.require_owner()?)
    }

    fn require_course(
        &self,
        db: &Database,
        owner_id: &str,
        course_id: &str,
    ) -> Result<Course, PetHealthError> {
        db.get_course(owner_id, course_id)?
            .ok_or_else(|| PetHealthError::NotFound(format!("course {}", course_id)))
    }

    /// Run one tracker transition and return the course as it now stands.
    fn track<F>(&self, course_id: &str, transition: F) -> Result<FfiCourse, PetHealthError>
    where
        F: FnOnce(
            &TreatmentTracker<'_, Database>,
            &Course,
        ) -> tracker::TrackerResult<Option<Course>>,
    {
        let owner_id = self.owner()?;
        let db = self.db.lock()?;
        let course = self.require_course(&db, &owner_id, course_id)?;
        let tracker = TreatmentTracker::new(&*db, owner_id);
        let course = transition(&tracker, &course)?.unwrap_or(course);
        Ok(FfiCourse::from_course(course, Local::now()))
    }

    fn rebuild_notifications_if_stale(&self) -> Result<(), PetHealthError> {
        if self.feed_stale.swap(false, Ordering::SeqCst) {
            if let Err(err) = self.reload_notifications() {
                self.feed_stale.store(true, Ordering::SeqCst);
                return Err(err);
            }
        }
        Ok(())
    }

    fn events_changed(&self) {
        self.bus.publish(Topic::EventsChanged);
    }
}

#[uniffi::export]
impl PetHealthCore {
    // =========================================================================
    // Session
    // =========================================================================

    /// Sign an owner in, replacing any current session.
    pub fn sign_in(&self, owner_id: String, email: Option<String>, display_name: Option<String>) {
        self.identity
            .sign_in(OwnerSession::new(owner_id, email, display_name));
        self.bus.publish(Topic::UserChanged);
    }

    /// Sign the current owner out. Returns false when nobody was signed in.
    pub fn sign_out(&self) -> bool {
        let signed_out = self.identity.sign_out();
        if signed_out {
            self.bus.publish(Topic::UserChanged);
        }
        signed_out
    }

    /// Display name of the signed-in owner.
    pub fn current_owner_name(&self) -> Option<String> {
        self.identity.current_session().map(|s| s.display_name)
    }

    // =========================================================================
    // Pet Operations
    // =========================================================================

    /// Register a new pet for the signed-in owner.
    pub fn create_pet(&self, name: String, species: String) -> Result<FfiPet, PetHealthError> {
        if name.trim().is_empty() {
            return Err(PetHealthError::InvalidInput("pet name is required".into()));
        }
        let owner_id = self.owner()?;
        let db = self.db.lock()?;
        let pet = Pet::new(owner_id, name, species);
        db.insert_pet(&pet)?;
        Ok(pet.into())
    }

    /// Save every editable field of a pet.
    pub fn update_pet(&self, pet: FfiPet) -> Result<(), PetHealthError> {
        let owner_id = self.owner()?;
        let db = self.db.lock()?;
        let mut stored = db
            .get_pet(&owner_id, &pet.id)?
            .ok_or_else(|| PetHealthError::NotFound(format!("pet {}", pet.id)))?;

        stored.name = pet.name;
        stored.species = pet.species;
        stored.breed = pet.breed;
        stored.birth_date = pet.birth_date;
        stored.weight_kg = pet.weight_kg;
        stored.sterilized = pet.sterilized;
        stored.photo_url = pet.photo_url;

        if !db.update_pet(&owner_id, &stored)? {
            return Err(PetHealthError::NotFound(format!("pet {}", stored.id)));
        }
        Ok(())
    }

    /// Get one of the owner's pets.
    pub fn get_pet(&self, pet_id: String) -> Result<Option<FfiPet>, PetHealthError> {
        let owner_id = self.owner()?;
        let db = self.db.lock()?;
        Ok(db.get_pet(&owner_id, &pet_id)?.map(|p| p.into()))
    }

    /// List the owner's pets.
    pub fn list_pets(&self) -> Result<Vec<FfiPet>, PetHealthError> {
        let owner_id = self.owner()?;
        let db = self.db.lock()?;
        let pets = loaded(db.list_pets(&owner_id), "pets");
        Ok(pets.into_iter().map(|p| p.into()).collect())
    }

    /// Delete a pet together with its courses and events.
    pub fn delete_pet(&self, pet_id: String) -> Result<bool, PetHealthError> {
        let owner_id = self.owner()?;
        let deleted = {
            let db = self.db.lock()?;
            db.delete_pet(&owner_id, &pet_id)?
        };
        if deleted {
            self.events_changed();
        }
        Ok(deleted)
    }

    // =========================================================================
    // Course Operations
    // =========================================================================

    /// Start a new course for one of the owner's pets.
    pub fn create_course(&self, input: FfiNewCourse) -> Result<FfiCourse, PetHealthError> {
        if input.drug_name.trim().is_empty() {
            return Err(PetHealthError::InvalidInput("drug name is required".into()));
        }
        if temporal::parse_flexible_date(&input.start_date).is_none() {
            return Err(PetHealthError::InvalidInput(format!(
                "unreadable start date: {}",
                input.start_date
            )));
        }

        let owner_id = self.owner()?;
        let db = self.db.lock()?;
        let mut course = Course::new(
            input.pet_id,
            input.drug_name,
            input.start_date,
            input.duration_days,
        );
        course.dosage = input.dosage;
        course.schedule = input.schedule;
        course.instructions = input.instructions;
        db.insert_course(&owner_id, &course)?;
        Ok(FfiCourse::from_course(course, Local::now()))
    }

    /// Get one course with its display status.
    pub fn get_course(&self, course_id: String) -> Result<Option<FfiCourse>, PetHealthError> {
        let owner_id = self.owner()?;
        let db = self.db.lock()?;
        let now = Local::now();
        Ok(db
            .get_course(&owner_id, &course_id)?
            .map(|c| FfiCourse::from_course(c, now)))
    }

    /// List a pet's courses.
    pub fn list_courses_for_pet(&self, pet_id: String) -> Result<Vec<FfiCourse>, PetHealthError> {
        let owner_id = self.owner()?;
        let db = self.db.lock()?;
        let now = Local::now();
        let courses = loaded(db.list_courses_for_pet(&owner_id, &pet_id), "courses");
        Ok(courses
            .into_iter()
            .map(|c| FfiCourse::from_course(c, now))
            .collect())
    }

    /// List courses across all of the owner's pets.
    pub fn list_courses(&self) -> Result<Vec<FfiCourse>, PetHealthError> {
        let owner_id = self.owner()?;
        let db = self.db.lock()?;
        let now = Local::now();
        let courses = loaded(db.list_courses(&owner_id), "courses");
        Ok(courses
            .into_iter()
            .map(|c| FfiCourse::from_course(c, now))
            .collect())
    }

    /// Delete a course.
    pub fn delete_course(&self, course_id: String) -> Result<bool, PetHealthError> {
        let owner_id = self.owner()?;
        let db = self.db.lock()?;
        Ok(db.delete_course(&owner_id, &course_id)?)
    }

    /// Register one dose. A completed or full course comes back unchanged.
    pub fn register_dose(&self, course_id: String) -> Result<FfiCourse, PetHealthError> {
        self.track(&course_id, |tracker, course| tracker.register_dose(course))
    }

    /// Take back the last dose. A completed or empty course comes back unchanged.
    pub fn undo_dose(&self, course_id: String) -> Result<FfiCourse, PetHealthError> {
        self.track(&course_id, |tracker, course| tracker.undo_dose(course))
    }

    /// Pause or resume. A completed course comes back unchanged.
    pub fn toggle_pause(&self, course_id: String) -> Result<FfiCourse, PetHealthError> {
        self.track(&course_id, |tracker, course| tracker.toggle_pause(course))
    }

    /// Force-complete or reopen.
    pub fn toggle_completion(&self, course_id: String) -> Result<FfiCourse, PetHealthError> {
        self.track(&course_id, |tracker, course| tracker.toggle_completion(course))
    }

    // =========================================================================
    // Event Operations
    // =========================================================================

    /// Schedule an event for one of the owner's pets.
    pub fn create_event(&self, input: FfiNewEvent) -> Result<FfiEvent, PetHealthError> {
        if input.title.trim().is_empty() {
            return Err(PetHealthError::InvalidInput("event title is required".into()));
        }
        let event_type = parse_event_type(input.event_type.as_deref())?;

        let owner_id = self.owner()?;
        let event = {
            let db = self.db.lock()?;
            let mut event = Event::new(input.pet_id, input.title, input.date);
            event.event_type = event_type;
            event.time = input.time;
            event.price = input.price.map(raw_price);
            event.veterinarian = input.veterinarian;
            event.description = input.description;
            db.insert_event(&owner_id, &event)?;
            db.get_event(&owner_id, &event.id)?.unwrap_or(event)
        };

        self.events_changed();
        Ok(event.into())
    }

    /// Save every editable field of an event.
    ///
    /// A type or status outside the known set is only accepted when it is the
    /// value already stored, so older records can still be edited.
    pub fn update_event(&self, event: FfiEvent) -> Result<(), PetHealthError> {
        let owner_id = self.owner()?;
        {
            let db = self.db.lock()?;
            let mut stored = db
                .get_event(&owner_id, &event.id)?
                .ok_or_else(|| PetHealthError::NotFound(format!("event {}", event.id)))?;

            if event.event_type.as_deref() != stored.event_type.as_ref().map(EventType::as_str) {
                stored.event_type = parse_event_type(event.event_type.as_deref())?;
            }
            if event.status.as_deref() != stored.status.as_ref().map(EventStatus::as_str) {
                stored.status = parse_event_status(event.status.as_deref())?;
            }
            stored.title = event.title;
            stored.date = event.date;
            stored.time = event.time;
            stored.price = event.price.map(raw_price);
            stored.veterinarian = event.veterinarian;
            stored.description = event.description;

            if !db.update_event(&owner_id, &stored)? {
                return Err(PetHealthError::NotFound(format!("event {}", stored.id)));
            }
        }

        self.events_changed();
        Ok(())
    }

    /// Mark an event scheduled, done or canceled.
    pub fn set_event_status(&self, event_id: String, status: String) -> Result<(), PetHealthError> {
        let status = parse_event_status(Some(status.as_str()))?
            .ok_or_else(|| PetHealthError::InvalidInput("event status is required".into()))?;

        let owner_id = self.owner()?;
        let updated = {
            let db = self.db.lock()?;
            db.set_event_status(&owner_id, &event_id, status)?
        };
        if !updated {
            return Err(PetHealthError::NotFound(format!("event {}", event_id)));
        }

        self.events_changed();
        Ok(())
    }

    /// Delete an event.
    pub fn delete_event(&self, event_id: String) -> Result<bool, PetHealthError> {
        let owner_id = self.owner()?;
        let deleted = {
            let db = self.db.lock()?;
            db.delete_event(&owner_id, &event_id)?
        };
        if deleted {
            self.events_changed();
        }
        Ok(deleted)
    }

    /// Every event of the owner, earliest date first.
    pub fn list_events(&self) -> Result<Vec<FfiEvent>, PetHealthError> {
        let owner_id = self.owner()?;
        let db = self.db.lock()?;
        let events = loaded(db.list_events(&owner_id), "events");
        Ok(events.into_iter().map(|e| e.into()).collect())
    }

    /// The owner's events narrowed by pet, type and status, earliest date first.
    pub fn list_events_filtered(
        &self,
        filter: FfiEventFilter,
    ) -> Result<Vec<FfiEvent>, PetHealthError> {
        let filter = EventFilter {
            pet_id: filter.pet_id.filter(|id| !id.is_empty()),
            event_type: parse_event_type(filter.event_type.as_deref())?,
            status: parse_event_status(filter.status.as_deref())?,
        };

        let owner_id = self.owner()?;
        let db = self.db.lock()?;
        let events = loaded(db.list_events_filtered(&owner_id, &filter), "events");
        Ok(events.into_iter().map(|e| e.into()).collect())
    }

    /// One pet's events, latest date first.
    pub fn list_events_for_pet(&self, pet_id: String) -> Result<Vec<FfiEvent>, PetHealthError> {
        let owner_id = self.owner()?;
        let db = self.db.lock()?;
        let events = loaded(db.list_events_for_pet(&owner_id, &pet_id), "pet events");
        Ok(events.into_iter().map(|e| e.into()).collect())
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    /// Rebuild reminders from the stored events. Returns how many there are.
    pub fn reload_notifications(&self) -> Result<u32, PetHealthError> {
        let db = self.db.lock()?;
        let mut feed = self.feed.lock()?;
        let count = feed.reload(&self.identity, &*db, Local::now())?;
        self.feed_stale.store(false, Ordering::SeqCst);
        Ok(count as u32)
    }

    /// Current reminders, rebuilt first if anything changed since the last load.
    pub fn notifications(&self) -> Result<Vec<FfiNotification>, PetHealthError> {
        self.rebuild_notifications_if_stale()?;
        let feed = self.feed.lock()?;
        Ok(feed.notifications().iter().map(|n| n.into()).collect())
    }

    /// Inline message when the last reminder load failed.
    pub fn notification_load_error(&self) -> Result<Option<String>, PetHealthError> {
        let feed = self.feed.lock()?;
        Ok(feed.load_error().map(String::from))
    }

    /// Mark every reminder as seen for this session. Returns how many were unread.
    pub fn open_notifications(&self) -> Result<u32, PetHealthError> {
        self.rebuild_notifications_if_stale()?;
        let mut feed = self.feed.lock()?;
        Ok(feed.open_panel(Local::now()) as u32)
    }

    /// Reminders not yet seen this session.
    pub fn unread_notification_count(&self) -> Result<u32, PetHealthError> {
        self.rebuild_notifications_if_stale()?;
        let feed = self.feed.lock()?;
        Ok(feed.unread_count() as u32)
    }

    // =========================================================================
    // Analytics
    // =========================================================================

    /// Aggregates over one pet's full event history.
    pub fn pet_analytics(&self, pet_id: String) -> Result<FfiAnalytics, PetHealthError> {
        let owner_id = self.owner()?;
        let db = self.db.lock()?;
        Ok(EventAnalytics::new(&*db).for_pet(&owner_id, &pet_id).into())
    }

    /// Same aggregates as JSON.
    pub fn pet_analytics_json(&self, pet_id: String) -> Result<String, PetHealthError> {
        let owner_id = self.owner()?;
        let db = self.db.lock()?;
        Ok(EventAnalytics::new(&*db).for_pet(&owner_id, &pet_id).to_json()?)
    }
}

/// List reads degrade to an empty list; an empty list is never an error.
fn loaded<T>(result: db::DbResult<Vec<T>>, what: &str) -> Vec<T> {
    result.unwrap_or_else(|err| {
        tracing::warn!(error = %err, "failed to load {}", what);
        Vec::new()
    })
}

fn parse_event_type(value: Option<&str>) -> Result<Option<EventType>, PetHealthError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => EventType::parse(v)
            .map(Some)
            .ok_or_else(|| PetHealthError::InvalidInput(format!("unknown event type: {}", v))),
    }
}

fn parse_event_status(value: Option<&str>) -> Result<Option<EventStatus>, PetHealthError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => EventStatus::parse(v)
            .map(Some)
            .ok_or_else(|| PetHealthError::InvalidInput(format!("unknown event status: {}", v))),
    }
}

/// Keep numbers as numbers and anything else as the text that was typed.
fn raw_price(text: String) -> RawPrice {
    match text.trim().parse::<f64>() {
        Ok(amount) if amount.is_finite() => RawPrice::Amount(amount),
        _ => RawPrice::Text(text),
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe pet.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPet {
    pub id: String,
    pub name: String,
    pub species: String,
    pub breed: Option<String>,
    pub birth_date: Option<String>,
    pub age_years: Option<u32>,
    pub weight_kg: Option<f64>,
    pub sterilized: bool,
    pub photo_url: Option<String>,
}

impl From<Pet> for FfiPet {
    fn from(pet: Pet) -> Self {
        let age_years = pet.age_years(Local::now().date_naive());
        Self {
            id: pet.id,
            name: pet.name,
            species: pet.species,
            breed: pet.breed,
            birth_date: pet.birth_date,
            age_years,
            weight_kg: pet.weight_kg,
            sterilized: pet.sterilized,
            photo_url: pet.photo_url,
        }
    }
}

/// FFI-safe course creation input.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewCourse {
    pub pet_id: String,
    pub drug_name: String,
    pub dosage: String,
    pub schedule: String,
    pub start_date: String,
    pub duration_days: u32,
    pub instructions: Option<String>,
}

/// FFI-safe course with its derived display fields.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCourse {
    pub id: String,
    pub pet_id: String,
    pub drug_name: String,
    pub dosage: String,
    pub schedule: String,
    pub start_date: String,
    pub duration_days: u32,
    pub instructions: Option<String>,
    pub status: String,
    pub display_status: String,
    pub days_completed: u32,
    pub progress_percent: u32,
    pub remaining_days: u32,
    pub current_day: u32,
    pub expected_end: Option<String>,
    pub can_register_dose: bool,
    pub can_undo_dose: bool,
    pub can_toggle_pause: bool,
}

impl FfiCourse {
    fn from_course(course: Course, now: chrono::DateTime<Local>) -> Self {
        let view = TrackedCourse::new(course);
        let display_status = view.display_status(now).as_str().to_string();
        let progress = view.progress();
        let can_register_dose = view.can_register_dose();
        let can_undo_dose = view.can_undo_dose();
        let can_toggle_pause = view.can_toggle_pause();
        let course = view.into_course();

        Self {
            id: course.id,
            pet_id: course.pet_id,
            drug_name: course.drug_name,
            dosage: course.dosage,
            schedule: course.schedule,
            start_date: course.start_date,
            duration_days: course.duration_days,
            instructions: course.instructions,
            status: course.status.as_str().to_string(),
            display_status,
            days_completed: course.days_completed,
            progress_percent: progress.progress_percent,
            remaining_days: progress.remaining_days,
            current_day: progress.current_day,
            expected_end: progress.expected_end.map(|d| d.format("%Y-%m-%d").to_string()),
            can_register_dose,
            can_undo_dose,
            can_toggle_pause,
        }
    }
}

/// FFI-safe event creation input.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewEvent {
    pub pet_id: String,
    pub title: String,
    pub event_type: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub price: Option<String>,
    pub veterinarian: Option<String>,
    pub description: Option<String>,
}

/// FFI-safe event list criteria. Unset or empty fields match everything.
#[derive(Debug, Clone, Default, uniffi::Record)]
pub struct FfiEventFilter {
    pub pet_id: Option<String>,
    pub event_type: Option<String>,
    pub status: Option<String>,
}

/// FFI-safe event.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiEvent {
    pub id: String,
    pub pet_id: String,
    pub pet_name: Option<String>,
    pub title: String,
    pub event_type: Option<String>,
    pub status: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    /// Price as entered
    pub price: Option<String>,
    /// Price coerced to a number
    pub price_amount: f64,
    pub veterinarian: Option<String>,
    pub description: Option<String>,
}

impl From<Event> for FfiEvent {
    fn from(event: Event) -> Self {
        let price_amount = event.price_amount();
        Self {
            id: event.id,
            pet_id: event.pet_id,
            pet_name: event.pet_name,
            title: event.title,
            event_type: event.event_type.map(String::from),
            status: event.status.map(String::from),
            date: event.date,
            time: event.time,
            price: event.price.map(|p| match p {
                RawPrice::Amount(amount) => amount.to_string(),
                RawPrice::Text(text) => text,
            }),
            price_amount,
            veterinarian: event.veterinarian,
            description: event.description,
        }
    }
}

/// FFI-safe reminder.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNotification {
    pub id: String,
    pub event_id: String,
    pub title: String,
    pub message: String,
    pub severity: String,
    pub read: bool,
    pub source_at: String,
}

impl From<&Notification> for FfiNotification {
    fn from(notification: &Notification) -> Self {
        Self {
            id: notification.id.clone(),
            event_id: notification.event_id.clone(),
            title: notification.title.clone(),
            message: notification.message.clone(),
            severity: notification.severity.as_str().to_string(),
            read: notification.is_read(),
            source_at: notification.source_at.to_rfc3339(),
        }
    }
}

/// FFI-safe count per key.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCount {
    pub key: String,
    pub count: u32,
}

/// FFI-safe history bucket.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiBucket {
    pub key: String,
    pub label: String,
    pub count: u32,
    pub spent: f64,
}

impl From<Bucket> for FfiBucket {
    fn from(bucket: Bucket) -> Self {
        Self {
            key: bucket.key,
            label: bucket.label,
            count: bucket.count,
            spent: bucket.spent,
        }
    }
}

/// FFI-safe analytics snapshot.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAnalytics {
    pub total_events: u32,
    pub total_spent: f64,
    pub status_counts: Vec<FfiCount>,
    pub type_counts: Vec<FfiCount>,
    pub monthly: Vec<FfiBucket>,
    pub yearly: Vec<FfiBucket>,
}

impl From<AnalyticsSnapshot> for FfiAnalytics {
    fn from(snapshot: AnalyticsSnapshot) -> Self {
        let counts = |map: std::collections::BTreeMap<String, u32>| -> Vec<FfiCount> {
            map.into_iter()
                .map(|(key, count)| FfiCount { key, count })
                .collect()
        };
        Self {
            total_events: snapshot.total_events,
            total_spent: snapshot.total_spent,
            status_counts: counts(snapshot.status_counts),
            type_counts: counts(snapshot.type_counts),
            monthly: snapshot.monthly.into_iter().map(|b| b.into()).collect(),
            yearly: snapshot.yearly.into_iter().map(|b| b.into()).collect(),
        }
    }
}
