//! flowzi-core
//!
//! Business logic for FLOWZI: currency conversion, financial aggregation, goal
//! progress, budget planning, milestone and insight notifications, and the
//! write-path services. Depends on flowzi-domain. No terminal I/O; persistence
//! and delivery go through the collaborator traits in `storage`, `notify` and `auth`.

pub mod auth;
pub mod bill_service;
pub mod budget_service;
pub mod error;
pub mod format;
pub mod goal_service;
pub mod insight_service;
pub mod milestone_service;
pub mod notify;
pub mod public_api;
pub mod reminder_service;
pub mod settings_service;
pub mod storage;
pub mod summary_service;
pub mod time;
pub mod transaction_service;

pub use auth::*;
pub use bill_service::*;
pub use budget_service::*;
pub use error::CoreError;
pub use format::{CurrencyPreferences, MoneyFormatter};
pub use goal_service::*;
pub use insight_service::*;
pub use milestone_service::*;
pub use notify::{CelebrationPrompt, NoopNotifier, NotificationRequest, Notifier, Trigger};
pub use public_api::*;
pub use reminder_service::*;
pub use settings_service::*;
pub use storage::*;
pub use summary_service::*;
pub use time::{Clock, FixedClock, SystemClock};
pub use transaction_service::*;

#[cfg(test)]
mod tests;
