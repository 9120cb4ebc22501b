//! Identity collaborator.
//!
//! Snapshot loads and saves are gated on a signed-in user with a verified
//! email. Providers publish auth changes on a `watch` channel.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::error::AuthError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: String,
    pub email_verified: bool,
}

impl User {
    pub fn verified(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            email_verified: true,
        }
    }

    pub fn unverified(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            email_verified: false,
            ..Self::verified(id, email)
        }
    }
}

/// What a user may do right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessGate {
    SignedOut,
    /// Signed in, routed to the verification prompt.
    NeedsVerification,
    Ready,
}

impl AccessGate {
    pub fn for_user(user: Option<&User>) -> Self {
        match user {
            None => AccessGate::SignedOut,
            Some(u) if !u.email_verified => AccessGate::NeedsVerification,
            Some(_) => AccessGate::Ready,
        }
    }

    /// The signed-in, verified user, or the error a gated operation reports.
    pub fn check(user: Option<&User>) -> Result<&User, AuthError> {
        match user {
            None => Err(AuthError::SignedOut),
            Some(u) if !u.email_verified => Err(AuthError::EmailNotVerified {
                email: u.email.clone(),
            }),
            Some(u) => Ok(u),
        }
    }
}

pub trait IdentityProvider: Send + Sync {
    fn current_user(&self) -> Option<User>;

    /// Auth state changes, starting from the current value.
    fn subscribe(&self) -> watch::Receiver<Option<User>>;
}

/// Provider with a fixed or manually switched user.
#[derive(Debug)]
pub struct StaticIdentity {
    tx: watch::Sender<Option<User>>,
}

impl StaticIdentity {
    pub fn new(user: Option<User>) -> Self {
        let (tx, _rx) = watch::channel(user);
        Self { tx }
    }

    pub fn set_user(&self, user: Option<User>) {
        tracing::info!(user = ?user.as_ref().map(|u| &u.id), "auth state changed");
        self.tx.send_replace(user);
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user(&self) -> Option<User> {
        self.tx.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_classifies_users() {
        assert_eq!(AccessGate::for_user(None), AccessGate::SignedOut);
        let pending = User::unverified("u1", "a@b.c");
        assert_eq!(AccessGate::for_user(Some(&pending)), AccessGate::NeedsVerification);
        let ready = User::verified("u1", "a@b.c");
        assert_eq!(AccessGate::for_user(Some(&ready)), AccessGate::Ready);
    }

    #[test]
    fn check_routes_unverified_to_verification() {
        let pending = User::unverified("u1", "a@b.c");
        let err = AccessGate::check(Some(&pending)).unwrap_err();
        assert!(err.needs_verification());
        assert_eq!(AccessGate::check(None).unwrap_err(), AuthError::SignedOut);
    }

    #[tokio::test]
    async fn subscribers_see_changes() {
        let identity = StaticIdentity::new(None);
        let mut rx = identity.subscribe();
        identity.set_user(Some(User::verified("u1", "a@b.c")));
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().as_ref().map(|u| u.id.as_str()), Some("u1"));
        assert_eq!(identity.current_user().map(|u| u.id), Some("u1".to_string()));
    }
}
