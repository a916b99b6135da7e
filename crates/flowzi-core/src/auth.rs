//! Authentication contract. The core only observes session changes and
//! forwards credential operations.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub uid: String,
    #[serde(default)]
    pub email: String,
}

impl SessionUser {
    pub fn new(uid: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: email.into(),
        }
    }
}

/// Result of a credential operation. Failures carry a user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthOutcome {
    pub success: bool,
    pub user: Option<SessionUser>,
    pub error: Option<String>,
}

impl AuthOutcome {
    pub fn signed_in(user: SessionUser) -> Self {
        Self {
            success: true,
            user: Some(user),
            error: None,
        }
    }

    pub fn ok() -> Self {
        Self {
            success: true,
            user: None,
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            user: None,
            error: Some(message.into()),
        }
    }
}

/// Invoked with the new session user, or `None` after sign-out.
pub type SessionCallback = Box<dyn Fn(Option<SessionUser>) + Send + Sync>;

pub trait AuthService: Send + Sync {
    fn on_session_change(&self, callback: SessionCallback);
    fn login(&self, email: &str, password: &str) -> AuthOutcome;
    fn register(&self, email: &str, password: &str) -> AuthOutcome;
    fn logout(&self) -> AuthOutcome;
    fn reset_password(&self, email: &str) -> AuthOutcome;
}
