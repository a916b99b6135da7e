//! Notification delivery: a gate in front of the platform notifier and the
//! background worker that feeds it.

pub mod service;
pub mod worker;

pub use service::NotificationService;
pub use worker::{NotifierEvent, NotifierWorker, RecomputedSnapshot, WorkerContext};
