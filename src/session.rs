//! Session/identity provider.
//!
//! The session is an explicit dependency: view-models receive a
//! [`SessionHandle`] at construction instead of reading ambient global state,
//! and dropping the handle ends the subscription. State fans out over a
//! [`tokio::sync::watch`] channel, so late subscribers immediately observe
//! the current value.

use tokio::sync::watch;
use tracing::debug;

use crate::{Error, Result, api::ApiClient, models::SessionUser, works};

/// Owner of the session state. One per process.
pub struct SessionProvider {
    tx: watch::Sender<Option<SessionUser>>,
}

impl Default for SessionProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionProvider {
    /// Create a provider with no signed-in user.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx }
    }

    /// Subscribe. The handle sees the current user immediately and every
    /// change afterwards.
    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            rx: self.tx.subscribe(),
        }
    }

    /// Replace the session state and notify subscribers.
    pub fn set(&self, user: Option<SessionUser>) {
        debug!(signed_in = user.is_some(), "session changed");
        self.tx.send_replace(user);
    }

    /// Re-fetch the current user from the API. A 401 means "no session" and
    /// clears the state rather than failing.
    pub async fn refresh(&self, api: &ApiClient) -> Result<()> {
        match works::current_user(api).await {
            Ok(user) => {
                self.set(Some(user));
                Ok(())
            }
            Err(Error::Unauthorized) => {
                self.set(None);
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}

/// A subscriber's view of the session.
#[derive(Clone)]
pub struct SessionHandle {
    rx: watch::Receiver<Option<SessionUser>>,
}

impl SessionHandle {
    /// The currently signed-in user, if any.
    pub fn current(&self) -> Option<SessionUser> {
        self.rx.borrow().clone()
    }

    /// Whether anyone is signed in.
    pub fn signed_in(&self) -> bool {
        self.rx.borrow().is_some()
    }

    /// Wait until the session changes. Returns the new state, or `None`
    /// forever once the provider is gone.
    pub async fn changed(&mut self) -> Option<SessionUser> {
        if self.rx.changed().await.is_err() {
            return None;
        }
        self.rx.borrow_and_update().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> SessionUser {
        SessionUser {
            id: id.to_owned(),
            email: None,
            display_name: None,
            admin: false,
        }
    }

    #[test]
    fn late_subscribers_see_the_current_user() {
        let provider = SessionProvider::new();
        provider.set(Some(user("u1")));

        let handle = provider.handle();
        assert_eq!(handle.current().map(|u| u.id), Some("u1".to_owned()));
    }

    #[tokio::test]
    async fn subscribers_observe_sign_out() {
        let provider = SessionProvider::new();
        provider.set(Some(user("u1")));

        let mut handle = provider.handle();
        provider.set(None);
        assert_eq!(handle.changed().await, None);
        assert!(!handle.signed_in());
    }
}
