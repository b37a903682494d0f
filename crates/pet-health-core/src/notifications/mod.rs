//! Upcoming-event reminders.
//!
//! Reminders are derived, never stored. [`NotificationWindow`] turns the
//! owner's events into a short sorted list; [`NotificationFeed`] keeps the
//! current list for a session, rebuilds it wholesale on every reload, and
//! tracks which reminders the owner has already seen in memory only.

mod window;

pub use window::*;

use chrono::{DateTime, Local};

use crate::config::CoreConfig;
use crate::db::{Database, DbResult};
use crate::identity::{IdentityError, IdentityProvider};
use crate::models::{Event, Notification};

/// Where the owner's events are read from.
pub trait EventSource {
    fn list_events(&self, owner_id: &str) -> DbResult<Vec<Event>>;
}

impl EventSource for Database {
    fn list_events(&self, owner_id: &str) -> DbResult<Vec<Event>> {
        Database::list_events(self, owner_id)
    }
}

/// Session state of the reminder panel.
#[derive(Debug, Clone)]
pub struct NotificationFeed {
    window: NotificationWindow,
    notifications: Vec<Notification>,
    load_error: Option<String>,
    load_error_message: String,
}

impl Default for NotificationFeed {
    fn default() -> Self {
        Self::new(CoreConfig::default())
    }
}

impl NotificationFeed {
    pub fn new(config: CoreConfig) -> Self {
        let load_error_message = config.load_error_message.clone();
        Self {
            window: NotificationWindow::new(config),
            notifications: Vec::new(),
            load_error: None,
            load_error_message,
        }
    }

    /// Rebuild the list from the owner's events. Returns the new count.
    ///
    /// No signed-in owner is an error. A failed read is not: the list is
    /// emptied and [`NotificationFeed::load_error`] carries a message, so an
    /// empty panel and a broken one look different.
    pub fn reload<I, S>(
        &mut self,
        identity: &I,
        source: &S,
        now: DateTime<Local>,
    ) -> Result<usize, IdentityError>
    where
        I: IdentityProvider + ?Sized,
        S: EventSource + ?Sized,
    {
        self.notifications.clear();
        self.load_error = None;

        let owner_id = identity.require_owner()?;
        match source.list_events(&owner_id) {
            Ok(events) => {
                self.notifications = self.window.build(&events, now);
                tracing::debug!(
                    events = events.len(),
                    notifications = self.notifications.len(),
                    "notifications rebuilt"
                );
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to load events for notifications");
                self.load_error = Some(self.load_error_message.clone());
            }
        }
        Ok(self.notifications.len())
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Inline message when the last reload failed.
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn unread_count(&self) -> usize {
        self.notifications.iter().filter(|n| !n.is_read()).count()
    }

    /// Mark every loaded reminder as seen. Returns how many were unread.
    ///
    /// Nothing is written back; the next reload starts unread again.
    pub fn open_panel(&mut self, now: DateTime<Local>) -> usize {
        let mut marked = 0;
        for notification in self.notifications.iter_mut().filter(|n| !n.is_read()) {
            notification.read_at = Some(now);
            marked += 1;
        }
        marked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbError;
    use crate::identity::{OwnerSession, SessionIdentity};
    use chrono::{Duration, TimeZone};

    struct FixedSource(Vec<Event>);

    impl EventSource for FixedSource {
        fn list_events(&self, _owner_id: &str) -> DbResult<Vec<Event>> {
            Ok(self.0.clone())
        }
    }

    struct BrokenSource;

    impl EventSource for BrokenSource {
        fn list_events(&self, _owner_id: &str) -> DbResult<Vec<Event>> {
            Err(DbError::Constraint("connection reset".into()))
        }
    }

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap()
    }

    fn signed_in() -> SessionIdentity {
        let identity = SessionIdentity::new();
        identity.sign_in(OwnerSession::new("owner-1".into(), None, None));
        identity
    }

    fn upcoming(days: i64) -> Event {
        let date = (now().date_naive() + Duration::days(days)).to_string();
        Event::new("pet-1".into(), format!("in {}", days), Some(date))
    }

    #[test]
    fn test_open_panel_marks_all_then_reload_resets() {
        let identity = signed_in();
        let source = FixedSource(vec![upcoming(0), upcoming(3)]);
        let mut feed = NotificationFeed::default();

        assert_eq!(feed.reload(&identity, &source, now()).unwrap(), 2);
        assert_eq!(feed.unread_count(), 2);

        assert_eq!(feed.open_panel(now()), 2);
        assert_eq!(feed.unread_count(), 0);
        assert!(feed.notifications().iter().all(|n| n.read_at == Some(now())));
        assert_eq!(feed.open_panel(now()), 0);

        feed.reload(&identity, &source, now()).unwrap();
        assert_eq!(feed.unread_count(), 2);
    }

    #[test]
    fn test_failed_load_is_distinct_from_empty() {
        let identity = signed_in();
        let mut feed = NotificationFeed::default();

        feed.reload(&identity, &FixedSource(vec![]), now()).unwrap();
        assert!(feed.notifications().is_empty());
        assert_eq!(feed.load_error(), None);

        feed.reload(&identity, &BrokenSource, now()).unwrap();
        assert!(feed.notifications().is_empty());
        assert_eq!(feed.load_error(), Some("Could not load notifications."));
    }

    #[test]
    fn test_missing_session_propagates() {
        let identity = SessionIdentity::new();
        let mut feed = NotificationFeed::default();

        let result = feed.reload(&identity, &FixedSource(vec![upcoming(1)]), now());
        assert_eq!(result, Err(IdentityError::NotAuthenticated));
        assert!(feed.notifications().is_empty());
    }
}
