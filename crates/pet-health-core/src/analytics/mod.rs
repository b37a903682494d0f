//! Event history analytics for one pet.
//!
//! Everything here is recomputed from the full history on each call; there
//! is no cache to invalidate.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::db::{Database, DbResult};
use crate::models::{Event, EventStatus, EventType};
use crate::temporal;

/// Key used when an event has no status.
pub const NO_STATUS_KEY: &str = "no status";

/// Key used when an event has no type.
pub const NO_TYPE_KEY: &str = "other";

/// One calendar period of history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bucket {
    /// `YYYY-MM` or `YYYY`
    pub key: String,
    /// Display label (`Jan 2024`, `2024`)
    pub label: String,
    /// Events in the period
    pub count: u32,
    /// Sum of coerced prices in the period
    pub spent: f64,
}

/// Aggregated view of a pet's event history.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AnalyticsSnapshot {
    pub total_events: u32,
    pub total_spent: f64,
    /// Event count per lower-case status
    pub status_counts: BTreeMap<String, u32>,
    /// Event count per lower-case type
    pub type_counts: BTreeMap<String, u32>,
    /// Ascending by key
    pub monthly: Vec<Bucket>,
    /// Ascending by key
    pub yearly: Vec<Bucket>,
}

impl AnalyticsSnapshot {
    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Default)]
struct Tally {
    label: String,
    count: u32,
    spent: f64,
}

impl Tally {
    fn add(&mut self, spent: f64) {
        self.count += 1;
        self.spent += spent;
    }
}

/// Aggregate events in a single pass.
///
/// Events without a parseable date still count towards the totals and the
/// status and type counts, but land in no monthly or yearly bucket.
pub fn aggregate(events: &[Event]) -> AnalyticsSnapshot {
    let mut snapshot = AnalyticsSnapshot::default();
    let mut months: BTreeMap<String, Tally> = BTreeMap::new();
    let mut years: BTreeMap<String, Tally> = BTreeMap::new();

    for event in events {
        let spent = event.price_amount();
        snapshot.total_events += 1;
        snapshot.total_spent += spent;

        let status = event.status.as_ref().map_or(NO_STATUS_KEY, EventStatus::as_str);
        *snapshot.status_counts.entry(status.to_string()).or_default() += 1;

        let kind = event.event_type.as_ref().map_or(NO_TYPE_KEY, EventType::as_str);
        *snapshot.type_counts.entry(kind.to_string()).or_default() += 1;

        let parsed = event
            .date
            .as_deref()
            .and_then(|date| temporal::parse_flexible_date(date));
        let Some(at) = parsed else {
            continue;
        };

        months
            .entry(temporal::month_key(at))
            .or_insert_with(|| Tally {
                label: at.format("%b %Y").to_string(),
                ..Tally::default()
            })
            .add(spent);

        let year = temporal::year_key(at);
        years
            .entry(year.clone())
            .or_insert_with(|| Tally {
                label: year,
                ..Tally::default()
            })
            .add(spent);
    }

    snapshot.monthly = into_buckets(months);
    snapshot.yearly = into_buckets(years);
    snapshot
}

fn into_buckets(tallies: BTreeMap<String, Tally>) -> Vec<Bucket> {
    tallies
        .into_iter()
        .map(|(key, tally)| Bucket {
            key,
            label: tally.label,
            count: tally.count,
            spent: tally.spent,
        })
        .collect()
}

/// Where a pet's event history is read from.
pub trait PetHistory {
    fn list_events_for_pet(&self, owner_id: &str, pet_id: &str) -> DbResult<Vec<Event>>;
}

impl PetHistory for Database {
    fn list_events_for_pet(&self, owner_id: &str, pet_id: &str) -> DbResult<Vec<Event>> {
        Database::list_events_for_pet(self, owner_id, pet_id)
    }
}

/// Loads a pet's history and aggregates it.
pub struct EventAnalytics<'a, S: PetHistory + ?Sized> {
    source: &'a S,
}

impl<'a, S: PetHistory + ?Sized> EventAnalytics<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Snapshot of one pet's history.
    ///
    /// A failed read yields an empty snapshot.
    pub fn for_pet(&self, owner_id: &str, pet_id: &str) -> AnalyticsSnapshot {
        match self.source.list_events_for_pet(owner_id, pet_id) {
            Ok(events) => aggregate(&events),
            Err(err) => {
                tracing::warn!(pet_id, error = %err, "failed to load event history for analytics");
                AnalyticsSnapshot::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbError;
    use crate::models::RawPrice;

    fn event(date: Option<&str>, price: Option<RawPrice>) -> Event {
        let mut event = Event::new("pet-1".into(), "Visit".into(), date.map(String::from));
        event.price = price;
        event
    }

    #[test]
    fn test_empty_history() {
        let snapshot = aggregate(&[]);
        assert_eq!(snapshot, AnalyticsSnapshot::default());
        assert_eq!(snapshot.total_spent, 0.0);
        assert!(snapshot.monthly.is_empty());
    }

    #[test]
    fn test_price_coercion_in_totals() {
        let events = vec![
            event(Some("2024-01-05"), Some(RawPrice::Text("10.5".into()))),
            event(Some("2024-01-06"), None),
            event(Some("2024-01-07"), Some(RawPrice::Text("abc".into()))),
        ];
        let snapshot = aggregate(&events);
        assert_eq!(snapshot.total_events, 3);
        assert_eq!(snapshot.total_spent, 10.5);
    }

    #[test]
    fn test_same_month_shares_bucket() {
        let events = vec![
            event(Some("2024-01-05"), Some(RawPrice::Amount(20.0))),
            event(Some("2024/01/28"), Some(RawPrice::Amount(5.0))),
        ];
        let snapshot = aggregate(&events);

        assert_eq!(snapshot.monthly.len(), 1);
        let january = &snapshot.monthly[0];
        assert_eq!(january.key, "2024-01");
        assert_eq!(january.label, "Jan 2024");
        assert_eq!(january.count, 2);
        assert_eq!(january.spent, 25.0);

        assert_eq!(snapshot.yearly.len(), 1);
        assert_eq!(snapshot.yearly[0].key, "2024");
        assert_eq!(snapshot.yearly[0].count, 2);
    }

    #[test]
    fn test_buckets_ordered_regardless_of_input() {
        let events = vec![
            event(Some("2024-03-01"), None),
            event(Some("2022-11-15"), None),
            event(Some("2024-01-20"), None),
        ];
        let snapshot = aggregate(&events);

        let months: Vec<_> = snapshot.monthly.iter().map(|b| b.key.as_str()).collect();
        assert_eq!(months, vec!["2022-11", "2024-01", "2024-03"]);
        let years: Vec<_> = snapshot.yearly.iter().map(|b| b.key.as_str()).collect();
        assert_eq!(years, vec!["2022", "2024"]);
    }

    #[test]
    fn test_missing_fields_use_default_keys() {
        let mut untyped = event(None, None);
        untyped.status = None;
        let mut vaccination = event(Some("not a date"), None);
        vaccination.event_type = Some(EventType::Vaccination);
        vaccination.status = Some(EventStatus::Done);

        let snapshot = aggregate(&[untyped, vaccination]);
        assert_eq!(snapshot.status_counts.get(NO_STATUS_KEY), Some(&1));
        assert_eq!(snapshot.status_counts.get("done"), Some(&1));
        assert_eq!(snapshot.type_counts.get(NO_TYPE_KEY), Some(&1));
        assert_eq!(snapshot.type_counts.get("vaccination"), Some(&1));
        // Neither date parses
        assert!(snapshot.monthly.is_empty());
        assert!(snapshot.yearly.is_empty());
    }

    #[test]
    fn test_unrecognized_values_keyed_by_raw_text() {
        let mut postponed = event(Some("2024-02-10"), None);
        postponed.status = Some(EventStatus::from_stored("Postponed"));
        postponed.event_type = Some(EventType::from_stored("Grooming"));

        let snapshot = aggregate(&[postponed, event(Some("2024-02-11"), None)]);
        assert_eq!(snapshot.total_events, 2);
        assert_eq!(snapshot.status_counts.get("postponed"), Some(&1));
        assert_eq!(snapshot.status_counts.get("scheduled"), Some(&1));
        assert_eq!(snapshot.type_counts.get("grooming"), Some(&1));
    }

    struct BrokenHistory;

    impl PetHistory for BrokenHistory {
        fn list_events_for_pet(&self, _owner_id: &str, _pet_id: &str) -> DbResult<Vec<Event>> {
            Err(DbError::Constraint("disk I/O error".into()))
        }
    }

    #[test]
    fn test_failed_read_degrades_to_empty() {
        let snapshot = EventAnalytics::new(&BrokenHistory).for_pet("owner-1", "pet-1");
        assert_eq!(snapshot, AnalyticsSnapshot::default());
    }
}
