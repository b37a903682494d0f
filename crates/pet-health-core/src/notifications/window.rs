//! Builds upcoming-event reminders.

use chrono::{DateTime, Local};

use crate::config::CoreConfig;
use crate::models::{Event, Notification, Severity};
use crate::temporal;

/// Derives the reminder list from the owner's events.
#[derive(Debug, Clone)]
pub struct NotificationWindow {
    config: CoreConfig,
}

impl Default for NotificationWindow {
    fn default() -> Self {
        Self::new(CoreConfig::default())
    }
}

impl NotificationWindow {
    pub fn new(config: CoreConfig) -> Self {
        Self { config }
    }

    /// Build reminders for events between today and the look-ahead horizon.
    ///
    /// Done and canceled events are skipped, as are events without a usable
    /// date. The result is ordered by the event's parsed instant and cut to
    /// the configured maximum. Every reminder starts unread.
    pub fn build(&self, events: &[Event], now: DateTime<Local>) -> Vec<Notification> {
        let horizon = i64::from(self.config.lookahead_days);
        let warning_days = i64::from(self.config.warning_days);

        let mut notifications: Vec<Notification> = events
            .iter()
            .filter(|event| event.is_pending())
            .filter_map(|event| {
                let at = temporal::parse_flexible_date(event.date.as_deref()?)?;
                let offset = temporal::day_offset(at, now);
                if !(0..=horizon).contains(&offset) {
                    return None;
                }

                let severity = if offset <= warning_days {
                    Severity::Warning
                } else {
                    Severity::Info
                };

                Some(Notification {
                    id: format!("event-{}", event.id),
                    event_id: event.id.clone(),
                    title: title_for(event, offset),
                    message: self.message_for(event, at),
                    severity,
                    read_at: None,
                    source_at: at,
                })
            })
            .collect();

        // Stable: same-instant events keep their input order
        notifications.sort_by_key(|n| n.source_at);
        notifications.truncate(self.config.max_notifications);
        notifications
    }

    fn message_for(&self, event: &Event, at: DateTime<Local>) -> String {
        let kind = event
            .event_type
            .as_ref()
            .map(|t| t.as_str().to_uppercase())
            .unwrap_or_else(|| "APPOINTMENT".to_string());
        let pet = event
            .pet_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(self.config.fallback_pet_name.as_str());
        let time = event
            .time
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .map(|t| format!(" at {}", t.trim()))
            .unwrap_or_default();

        format!("{} with {} on {}{}.", kind, pet, at.format("%d/%m/%Y"), time)
    }
}

fn title_for(event: &Event, offset: i64) -> String {
    match offset {
        0 => format!("Event today: {}", event.title),
        1 => format!("Event tomorrow: {}", event.title),
        n => format!("Event in {} days", n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventStatus, EventType};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 10, 18, 45, 0).unwrap()
    }

    fn event_in(days: i64, title: &str) -> Event {
        let date = (now().date_naive() + Duration::days(days))
            .format("%Y-%m-%d")
            .to_string();
        let mut event = Event::new("pet-1".into(), title.into(), Some(date));
        event.id = title.to_string();
        event
    }

    #[test]
    fn test_window_filters_sorts_and_grades() {
        let events = vec![
            event_in(0, "today"),
            event_in(1, "tomorrow"),
            event_in(35, "too far"),
            event_in(5, "soon"),
        ];

        let notifications = NotificationWindow::default().build(&events, now());
        let ids: Vec<_> = notifications.iter().map(|n| n.event_id.as_str()).collect();
        assert_eq!(ids, vec!["today", "tomorrow", "soon"]);

        assert_eq!(notifications[0].severity, Severity::Warning);
        assert_eq!(notifications[1].severity, Severity::Warning);
        assert_eq!(notifications[2].severity, Severity::Info);
        assert!(notifications.iter().all(|n| !n.is_read()));
    }

    #[test]
    fn test_titles_by_offset() {
        let events = vec![event_in(0, "Vet"), event_in(1, "Bath"), event_in(12, "Exam")];
        let notifications = NotificationWindow::default().build(&events, now());

        assert_eq!(notifications[0].title, "Event today: Vet");
        assert_eq!(notifications[1].title, "Event tomorrow: Bath");
        assert_eq!(notifications[2].title, "Event in 12 days");
        assert_eq!(notifications[0].id, "event-Vet");
    }

    #[test]
    fn test_window_bounds() {
        let events = vec![
            event_in(-1, "yesterday"),
            event_in(30, "edge"),
            event_in(31, "past edge"),
        ];
        let notifications = NotificationWindow::default().build(&events, now());
        let ids: Vec<_> = notifications.iter().map(|n| n.event_id.as_str()).collect();
        assert_eq!(ids, vec!["edge"]);
    }

    #[test]
    fn test_only_done_and_canceled_are_skipped() {
        let mut done = event_in(2, "done");
        done.status = Some(EventStatus::Done);
        let mut canceled = event_in(2, "canceled");
        canceled.status = Some(EventStatus::Canceled);
        let mut unset = event_in(2, "unset");
        unset.status = None;
        let mut postponed = event_in(3, "postponed");
        postponed.status = Some(EventStatus::from_stored("Postponed"));

        let events = [done, canceled, unset, postponed];
        let notifications = NotificationWindow::default().build(&events, now());
        let ids: Vec<_> = notifications.iter().map(|n| n.event_id.as_str()).collect();
        assert_eq!(ids, vec!["unset", "postponed"]);
    }

    #[test]
    fn test_undated_events_are_skipped() {
        let mut undated = event_in(2, "undated");
        undated.date = None;
        let mut garbage = event_in(2, "garbage");
        garbage.date = Some("tbd".into());

        assert!(NotificationWindow::default()
            .build(&[undated, garbage], now())
            .is_empty());
    }

    #[test]
    fn test_sorted_by_instant_not_text() {
        // Mixed formats: "2024/03/12" sorts after "2024-03-15" as text
        let mut slash = event_in(0, "slash");
        slash.date = Some("2024/03/12".into());
        let mut iso = event_in(0, "iso");
        iso.date = Some("2024-03-11T09:00:00".into());
        let mut dash = event_in(0, "dash");
        dash.date = Some("2024-03-15".into());

        let notifications = NotificationWindow::default().build(&[dash, slash, iso], now());
        let ids: Vec<_> = notifications.iter().map(|n| n.event_id.as_str()).collect();
        assert_eq!(ids, vec!["iso", "slash", "dash"]);
    }

    #[test]
    fn test_truncated_to_earliest_ten() {
        let events: Vec<_> = (0..15).rev().map(|d| event_in(d, &format!("e{}", d))).collect();
        let notifications = NotificationWindow::default().build(&events, now());
        assert_eq!(notifications.len(), 10);
        assert_eq!(notifications[0].event_id, "e0");
        assert_eq!(notifications[9].event_id, "e9");
    }

    #[test]
    fn test_message_text() {
        let mut event = event_in(3, "Rabies booster");
        event.event_type = Some(EventType::Vaccination);
        event.pet_name = Some("Rex".into());
        event.time = Some("14:30".into());

        let notifications = NotificationWindow::default().build(&[event.clone()], now());
        assert_eq!(notifications[0].message, "VACCINATION with Rex on 13/03/2024 at 14:30.");

        event.event_type = None;
        event.pet_name = None;
        event.time = None;
        let notifications = NotificationWindow::default().build(&[event], now());
        assert_eq!(notifications[0].message, "APPOINTMENT with your pet on 13/03/2024.");
    }
}
