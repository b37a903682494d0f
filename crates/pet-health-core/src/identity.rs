//! Owner identity.
//!
//! The host app signs the owner in with whatever identity provider it uses
//! and hands the session over. Core code asks for the owner through
//! [`IdentityProvider::require_owner`], which turns a missing session into
//! an error instead of an empty result.

use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identity errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("No owner is signed in")]
    NotAuthenticated,
}

/// The signed-in owner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OwnerSession {
    /// Stable owner id from the identity provider
    pub owner_id: String,
    /// Email, if the provider shares it
    pub email: Option<String>,
    /// Name to greet the owner with
    pub display_name: String,
}

impl OwnerSession {
    /// Create a session, falling back to a generic display name.
    pub fn new(owner_id: String, email: Option<String>, display_name: Option<String>) -> Self {
        let display_name = display_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| "Owner".to_string());
        Self {
            owner_id,
            email,
            display_name,
        }
    }
}

/// Source of the current owner session.
pub trait IdentityProvider {
    /// The active session, if any.
    fn current_session(&self) -> Option<OwnerSession>;

    /// Owner id of the active session.
    fn require_owner(&self) -> Result<String, IdentityError> {
        self.current_session()
            .map(|session| session.owner_id)
            .ok_or(IdentityError::NotAuthenticated)
    }
}

/// In-process session holder.
#[derive(Debug, Default)]
pub struct SessionIdentity {
    session: Mutex<Option<OwnerSession>>,
}

impl SessionIdentity {
    /// Start with nobody signed in.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the active session.
    pub fn sign_in(&self, session: OwnerSession) {
        tracing::info!(owner_id = %session.owner_id, "owner signed in");
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = Some(session);
    }

    /// Drop the active session. Returns false when nobody was signed in.
    pub fn sign_out(&self) -> bool {
        let previous = self
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if previous.is_some() {
            tracing::info!("owner signed out");
        }
        previous.is_some()
    }
}

impl IdentityProvider for SessionIdentity {
    fn current_session(&self) -> Option<OwnerSession> {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_session_is_an_error() {
        let identity = SessionIdentity::new();
        assert_eq!(identity.require_owner(), Err(IdentityError::NotAuthenticated));
    }

    #[test]
    fn test_sign_in_and_out() {
        let identity = SessionIdentity::new();
        identity.sign_in(OwnerSession::new("owner-1".into(), None, None));

        assert_eq!(identity.require_owner(), Ok("owner-1".to_string()));
        assert_eq!(identity.current_session().unwrap().display_name, "Owner");

        assert!(identity.sign_out());
        assert!(!identity.sign_out());
        assert!(identity.current_session().is_none());
    }
}
