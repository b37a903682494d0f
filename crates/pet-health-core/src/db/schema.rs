//! SQLite schema definition.

/// Complete database schema for pet health tracking.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Pets
-- ============================================================================

CREATE TABLE IF NOT EXISTS pets (
    id TEXT PRIMARY KEY,
    owner_id TEXT NOT NULL,                      -- all access is scoped to this
    name TEXT NOT NULL,
    species TEXT NOT NULL,
    breed TEXT,
    birth_date TEXT,
    weight_kg REAL,
    sterilized INTEGER NOT NULL DEFAULT 0,
    photo_url TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_pets_owner ON pets(owner_id);

-- ============================================================================
-- Medication Courses
-- ============================================================================

CREATE TABLE IF NOT EXISTS courses (
    id TEXT PRIMARY KEY,
    pet_id TEXT NOT NULL REFERENCES pets(id) ON DELETE CASCADE,
    drug_name TEXT NOT NULL,
    dosage TEXT NOT NULL DEFAULT '',
    schedule TEXT NOT NULL DEFAULT '',
    start_date TEXT NOT NULL,
    duration_days INTEGER NOT NULL CHECK (duration_days >= 0),
    instructions TEXT,
    status TEXT NOT NULL DEFAULT 'active'
        CHECK (status IN ('active', 'paused', 'completed')),
    days_completed INTEGER NOT NULL DEFAULT 0,
    days_before_completion INTEGER,              -- counter right before last completion
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    CHECK (days_completed >= 0 AND days_completed <= duration_days)
);

CREATE INDEX IF NOT EXISTS idx_courses_pet ON courses(pet_id);

-- ============================================================================
-- Medical Events
-- ============================================================================

CREATE TABLE IF NOT EXISTS events (
    id TEXT PRIMARY KEY,
    pet_id TEXT NOT NULL REFERENCES pets(id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    event_type TEXT,                             -- consult, vaccination, exam, ...; free text
    status TEXT,                                 -- scheduled, done, canceled, ...; NULL = scheduled
    date TEXT,
    time TEXT,
    price,                                       -- untyped: number or text as entered
    veterinarian TEXT,
    description TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_events_pet ON events(pet_id);
CREATE INDEX IF NOT EXISTS idx_events_date ON events(date);
"#;
