use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

use flowzi_core::{AuthOutcome, AuthService, SessionCallback, SessionUser};

type SharedCallback = Arc<dyn Fn(Option<SessionUser>) + Send + Sync>;

#[derive(Debug, Clone)]
struct Account {
    uid: String,
    password: String,
}

#[derive(Default)]
struct LocalState {
    accounts: BTreeMap<String, Account>,
    current: Option<SessionUser>,
    callbacks: Vec<SharedCallback>,
}

/// Process-local accounts for the CLI and offline use.
///
/// Session callbacks fire synchronously and outside the internal lock, with
/// the current user when registered and after every sign-in or sign-out.
#[derive(Default)]
pub struct LocalAuth {
    state: Mutex<LocalState>,
}

const MIN_PASSWORD_LEN: usize = 6;

impl LocalAuth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_user(&self) -> Option<SessionUser> {
        self.state.lock().ok().and_then(|state| state.current.clone())
    }

    fn switch_to(&self, user: Option<SessionUser>) {
        let callbacks = match self.state.lock() {
            Ok(mut state) => {
                state.current = user.clone();
                state.callbacks.clone()
            }
            Err(_) => return,
        };
        for callback in callbacks {
            callback(user.clone());
        }
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl AuthService for LocalAuth {
    fn on_session_change(&self, callback: SessionCallback) {
        let callback: SharedCallback = Arc::from(callback);
        let current = match self.state.lock() {
            Ok(mut state) => {
                state.callbacks.push(callback.clone());
                state.current.clone()
            }
            Err(_) => return,
        };
        callback(current);
    }

    fn login(&self, email: &str, password: &str) -> AuthOutcome {
        let email = normalize_email(email);
        let account = match self.state.lock() {
            Ok(state) => state.accounts.get(&email).cloned(),
            Err(_) => return AuthOutcome::failed("Authentication is unavailable."),
        };
        match account {
            Some(account) if account.password == password => {
                let user = SessionUser::new(account.uid, email);
                self.switch_to(Some(user.clone()));
                tracing::info!(uid = %user.uid, "signed in");
                AuthOutcome::signed_in(user)
            }
            Some(_) => AuthOutcome::failed("Incorrect password."),
            None => AuthOutcome::failed("No account found with this email."),
        }
    }

    fn register(&self, email: &str, password: &str) -> AuthOutcome {
        let email = normalize_email(email);
        if !email.contains('@') {
            return AuthOutcome::failed("Please enter a valid email address.");
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return AuthOutcome::failed("Password should be at least 6 characters.");
        }
        let user = match self.state.lock() {
            Ok(mut state) => {
                if state.accounts.contains_key(&email) {
                    return AuthOutcome::failed("An account with this email already exists.");
                }
                let uid = uuid::Uuid::new_v4().simple().to_string();
                state.accounts.insert(
                    email.clone(),
                    Account {
                        uid: uid.clone(),
                        password: password.to_string(),
                    },
                );
                SessionUser::new(uid, email)
            }
            Err(_) => return AuthOutcome::failed("Authentication is unavailable."),
        };
        self.switch_to(Some(user.clone()));
        tracing::info!(uid = %user.uid, "account registered");
        AuthOutcome::signed_in(user)
    }

    fn logout(&self) -> AuthOutcome {
        self.switch_to(None);
        AuthOutcome::ok()
    }

    fn reset_password(&self, email: &str) -> AuthOutcome {
        let known = self
            .state
            .lock()
            .map(|state| state.accounts.contains_key(&normalize_email(email)))
            .unwrap_or(false);
        if known {
            tracing::info!("password reset requested");
            AuthOutcome::ok()
        } else {
            AuthOutcome::failed("No account found with this email.")
        }
    }
}
