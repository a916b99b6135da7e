//! Background thread that owns every notifier side effect.
//!
//! The recompute path only enqueues [`NotifierEvent`]s; milestone checks,
//! insight selection, reminders and welcome messages run here, one event at a
//! time and in arrival order.

use std::{
    sync::{
        mpsc::{self, Receiver, Sender},
        Arc,
    },
    thread::{self, JoinHandle},
};

use flowzi_core::{
    notify::templates, Clock, CoreError, CurrencyPreferences, FlagStore, GoalProgress,
    InsightPicker, InsightService, MilestoneTracker, MoneyFormatter, NotificationRequest,
    ReminderService,
};
use flowzi_domain::{
    collections, Bill, CurrencyTable, Goal, InsightRules, MilestoneRules, ReminderRules,
    Transaction,
};

use super::NotificationService;
use crate::errors::{FlowziError, Result};

const SECONDS_PER_WEEK: i64 = 7 * 24 * 60 * 60;

/// Derived values handed to the worker after each recompute.
#[derive(Debug, Clone)]
pub struct RecomputedSnapshot {
    /// Collection whose snapshot triggered the recompute.
    pub source: &'static str,
    pub goals: Vec<Goal>,
    pub transactions: Vec<Transaction>,
    pub progress: Vec<GoalProgress>,
    pub monthly_income: f64,
    pub has_activity: bool,
    pub preferences: CurrencyPreferences,
}

#[derive(Debug)]
pub enum NotifierEvent {
    SessionStarted { user_id: String },
    SessionEnded,
    Recomputed(Box<RecomputedSnapshot>),
    BillAdded {
        bill: Bill,
        preferences: CurrencyPreferences,
    },
    Schedule(NotificationRequest),
    /// Answered once every earlier event has been handled.
    Flush(Sender<()>),
    Shutdown,
}

/// Everything the worker thread owns.
pub struct WorkerContext {
    pub notifications: Arc<NotificationService>,
    pub flags: Arc<dyn FlagStore>,
    pub clock: Arc<dyn Clock>,
    pub picker: Arc<dyn InsightPicker>,
    pub currencies: CurrencyTable,
    pub milestones: MilestoneRules,
    pub insights: InsightRules,
    pub reminders: ReminderRules,
}

pub struct NotifierWorker {
    sender: Sender<NotifierEvent>,
    handle: Option<JoinHandle<()>>,
}

impl NotifierWorker {
    pub fn spawn(context: WorkerContext) -> Result<Self> {
        let (sender, receiver) = mpsc::channel();
        let handle = thread::Builder::new()
            .name("flowzi-notifier".into())
            .spawn(move || WorkerLoop::new(context).run(receiver))
            .map_err(|err| CoreError::Notifier(format!("failed to start worker: {err}")))?;
        tracing::debug!("notifier worker started");
        Ok(Self {
            sender,
            handle: Some(handle),
        })
    }

    pub fn send(&self, event: NotifierEvent) -> Result<()> {
        self.sender
            .send(event)
            .map_err(|_| FlowziError::WorkerStopped)
    }

    /// Blocks until the worker has drained everything queued before this call.
    pub fn flush(&self) -> Result<()> {
        let (done, wait) = mpsc::channel();
        self.send(NotifierEvent::Flush(done))?;
        wait.recv().map_err(|_| FlowziError::WorkerStopped)
    }

    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = self.sender.send(NotifierEvent::Shutdown);
            if handle.join().is_err() {
                tracing::warn!("notifier worker panicked");
            } else {
                tracing::debug!("notifier worker stopped");
            }
        }
    }
}

impl Drop for NotifierWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

struct WorkerLoop {
    context: WorkerContext,
    tracker: Option<MilestoneTracker>,
}

impl WorkerLoop {
    fn new(context: WorkerContext) -> Self {
        Self {
            context,
            tracker: None,
        }
    }

    fn run(mut self, receiver: Receiver<NotifierEvent>) {
        for event in receiver {
            match event {
                NotifierEvent::SessionStarted { user_id } => self.session_started(&user_id),
                NotifierEvent::SessionEnded => self.session_ended(),
                NotifierEvent::Recomputed(snapshot) => self.recomputed(&snapshot),
                NotifierEvent::BillAdded { bill, preferences } => {
                    self.bill_added(&bill, preferences)
                }
                NotifierEvent::Schedule(request) => {
                    self.context.notifications.send(request);
                }
                NotifierEvent::Flush(done) => {
                    let _ = done.send(());
                }
                NotifierEvent::Shutdown => break,
            }
        }
    }

    fn formatter(&self, preferences: CurrencyPreferences) -> MoneyFormatter {
        MoneyFormatter::new(self.context.currencies.clone(), preferences)
    }

    fn session_started(&mut self, user_id: &str) {
        let mut tracker = MilestoneTracker::new(self.context.flags.clone());
        if self.context.milestones.scope_by_user {
            tracker = tracker.scoped_to(user_id);
        }
        self.tracker = Some(tracker);

        let notifications = &self.context.notifications;
        if !notifications.initialize() {
            tracing::info!("local notifications unavailable for this session");
            return;
        }
        if notifications.settings().weekly_summary {
            let week = self.context.clock.now().timestamp() / SECONDS_PER_WEEK;
            notifications.send(templates::weekly_summary(week));
        }
    }

    fn session_ended(&mut self) {
        self.tracker = None;
        self.context.notifications.reset();
    }

    fn recomputed(&self, snapshot: &RecomputedSnapshot) {
        let Some(tracker) = &self.tracker else {
            return;
        };
        // Milestone flags are only written for celebrations that were delivered.
        if !self.context.notifications.is_initialized() {
            return;
        }
        let from_transactions = snapshot.source == collections::TRANSACTIONS;
        if !from_transactions && snapshot.source != collections::GOALS {
            return;
        }
        let formatter = self.formatter(snapshot.preferences.clone());
        let fired = tracker.check(
            &snapshot.goals,
            &snapshot.transactions,
            self.context.notifications.as_ref(),
            &formatter,
        );
        if !fired.is_empty() {
            tracing::info!(count = fired.len(), "milestones fired");
        }

        if !from_transactions || !snapshot.has_activity {
            return;
        }
        let insights = InsightService::generate(
            &snapshot.transactions,
            &snapshot.progress,
            snapshot.monthly_income,
            self.context.clock.today(),
            &self.context.insights,
            &formatter,
        );
        if let Some(insight) = InsightService::choose(insights, self.context.picker.as_ref()) {
            let timestamp = self.context.clock.now().timestamp_millis();
            self.context.notifications.send(InsightService::notification(
                insight,
                timestamp,
                &self.context.insights,
            ));
        }
    }

    fn bill_added(&self, bill: &Bill, preferences: CurrencyPreferences) {
        if !self.context.notifications.settings().bill_reminders {
            return;
        }
        let formatter = self.formatter(preferences);
        let reminders = ReminderService::plan(bill, &self.context.reminders, &formatter);
        tracing::debug!(bill = %bill.name, count = reminders.len(), "scheduling bill reminders");
        for request in reminders {
            self.context.notifications.send(request);
        }
    }
}
