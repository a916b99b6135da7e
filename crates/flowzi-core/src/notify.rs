//! Local-notification contract and the request payloads the core produces.

use std::fmt;

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::CoreError;

/// When a local notification should be delivered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Trigger {
    /// One-shot delivery after a delay.
    AfterSeconds(u64),
    /// Repeating delivery every week at the given local time.
    Weekly {
        weekday: Weekday,
        hour: u32,
        minute: u32,
    },
}

impl Default for Trigger {
    fn default() -> Self {
        Trigger::AfterSeconds(1)
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::AfterSeconds(seconds) => write!(f, "in {}s", seconds),
            Trigger::Weekly {
                weekday,
                hour,
                minute,
            } => write!(f, "every {} at {:02}:{:02}", weekday, hour, minute),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub title: String,
    pub body: String,
    pub data: Value,
    pub trigger: Trigger,
}

impl NotificationRequest {
    pub fn new(title: impl Into<String>, body: impl Into<String>, data: Value) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            data,
            trigger: Trigger::default(),
        }
    }

    pub fn with_trigger(mut self, trigger: Trigger) -> Self {
        self.trigger = trigger;
        self
    }

    /// The `type` tag carried in the payload, if any.
    pub fn kind(&self) -> Option<&str> {
        self.data.get("type").and_then(Value::as_str)
    }
}

/// In-app alert shown alongside a milestone notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CelebrationPrompt {
    pub title: String,
    pub message: String,
}

pub trait Notifier: Send + Sync {
    /// Requests permission and prepares delivery channels. Returns `false`
    /// when notifications are unavailable.
    fn initialize(&self) -> Result<bool, CoreError>;

    /// Schedules a notification and returns its id. `None` means nothing was scheduled.
    fn schedule_local(&self, request: NotificationRequest) -> Result<Option<String>, CoreError>;

    fn cancel(&self, id: &str) -> Result<(), CoreError>;

    fn cancel_all(&self) -> Result<(), CoreError>;

    fn celebrate(&self, _prompt: CelebrationPrompt) -> Result<(), CoreError> {
        Ok(())
    }
}

/// Notifier for platforms without local notifications.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn initialize(&self) -> Result<bool, CoreError> {
        Ok(false)
    }

    fn schedule_local(&self, _request: NotificationRequest) -> Result<Option<String>, CoreError> {
        Ok(None)
    }

    fn cancel(&self, _id: &str) -> Result<(), CoreError> {
        Ok(())
    }

    fn cancel_all(&self) -> Result<(), CoreError> {
        Ok(())
    }
}

/// Welcome and weekly-summary templates that are not tied to a computation.
pub mod templates {
    use chrono::Weekday;
    use serde_json::json;

    use super::{NotificationRequest, Trigger};

    pub fn welcome_back() -> NotificationRequest {
        NotificationRequest::new(
            "👋 Welcome back to FLOWZI!",
            "Ready to continue your financial journey? Check your latest progress!",
            json!({ "type": "welcome_back" }),
        )
        .with_trigger(Trigger::AfterSeconds(2))
    }

    pub fn welcome_new_user() -> NotificationRequest {
        NotificationRequest::new(
            "🎉 Welcome to FLOWZI!",
            "Thanks for joining! Let's start building your financial future together.",
            json!({ "type": "welcome_new_user" }),
        )
        .with_trigger(Trigger::AfterSeconds(3))
    }

    /// Repeats every Monday at 18:00. `week` is the number of whole weeks since the Unix epoch.
    pub fn weekly_summary(week: i64) -> NotificationRequest {
        NotificationRequest::new(
            "📊 Weekly Financial Summary",
            "Your FLOWZI weekly report is ready! See how you did this week.",
            json!({ "type": "weekly_summary", "week": week }),
        )
        .with_trigger(Trigger::Weekly {
            weekday: Weekday::Mon,
            hour: 18,
            minute: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_trigger_fires_after_one_second() {
        let request = NotificationRequest::new("t", "b", serde_json::json!({"type": "x"}));
        assert_eq!(request.trigger, Trigger::AfterSeconds(1));
        assert_eq!(request.kind(), Some("x"));
    }

    #[test]
    fn weekly_summary_repeats_on_monday_evening() {
        let request = templates::weekly_summary(2880);
        assert_eq!(
            request.trigger,
            Trigger::Weekly {
                weekday: Weekday::Mon,
                hour: 18,
                minute: 0
            }
        );
        assert_eq!(request.data["week"], 2880);
    }

    #[test]
    fn noop_notifier_schedules_nothing() {
        let notifier = NoopNotifier;
        assert!(!notifier.initialize().unwrap());
        assert_eq!(
            notifier
                .schedule_local(templates::welcome_back())
                .unwrap(),
            None
        );
    }
}
