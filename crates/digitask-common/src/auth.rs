//! Explicitly passed authentication state.
//!
//! The token lives in one shared `AuthSession` that is handed to the REST
//! client and to every realtime connection. Clones share state, so a logout
//! on any clone is observed by pending reconnect timers everywhere.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};

use crate::id::UserId;

/// The logged-in user as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub display_name: String,
}

#[derive(Default)]
struct AuthState {
    token: Option<String>,
    user: Option<CurrentUser>,
}

#[derive(Clone, Default)]
pub struct AuthSession {
    inner: Arc<RwLock<AuthState>>,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.read();
        f.debug_struct("AuthSession")
            .field("token", &state.token.as_ref().map(|_| "[REDACTED]"))
            .field("user", &state.user)
            .finish()
    }
}

impl AuthSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        let session = Self::new();
        session.login(token);
        session
    }

    /// Store a new access token. Blank tokens count as logged out.
    pub fn login(&self, token: impl Into<String>) {
        let token = token.into();
        let mut state = self.write();
        state.token = if token.trim().is_empty() {
            None
        } else {
            Some(token)
        };
    }

    pub fn set_user(&self, user: CurrentUser) {
        self.write().user = Some(user);
    }

    /// Drop the token and the cached user.
    pub fn logout(&self) {
        let mut state = self.write();
        state.token = None;
        state.user = None;
    }

    /// Current token, read fresh on every call.
    pub fn token(&self) -> Option<String> {
        self.read().token.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().token.is_some()
    }

    pub fn user(&self) -> Option<CurrentUser> {
        self.read().user.clone()
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.read().user.as_ref().map(|u| u.id)
    }

    fn read(&self) -> RwLockReadGuard<'_, AuthState> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, AuthState> {
        self.inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
