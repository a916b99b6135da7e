//! Session lifecycle and the live overview.
//!
//! [`App::init`] wires the injected collaborators together and starts the
//! notifier worker. A session begins when the auth service reports a user:
//! the four collections are subscribed, and every snapshot from any of them
//! recomputes the [`FinancialOverview`] synchronously before the worker is
//! told about it. Signing out unsubscribes, cancels scheduled notifications
//! and drops the cached snapshots.

mod local;
mod session;

pub use local::LocalAuth;

use std::sync::{Arc, Mutex, MutexGuard, Weak};

use flowzi_config::Config;
use flowzi_core::{
    notify::templates, AuthOutcome, AuthService, BillService, Clock, CurrencyPreferences,
    Document, DocumentStore, FinancialOverview, FlagStore, GoalService, InsightPicker,
    MoneyFormatter, NewBill, NewGoal, NewTransaction, NotificationRequest, Notifier,
    RandomPicker, SessionUser, SettingsService, SystemClock, TransactionService,
};
use flowzi_domain::{collections, Bill, Goal, IncomeFrequency, Transaction};

use crate::{
    errors::{FlowziError, Result},
    notifications::{NotificationService, NotifierEvent, NotifierWorker, WorkerContext},
};
use session::SessionState;

const SUBSCRIBED_COLLECTIONS: [&str; 4] = [
    collections::TRANSACTIONS,
    collections::GOALS,
    collections::BILLS,
    collections::USERS,
];

/// Called with the fresh overview after every recompute.
pub type OverviewListener = Box<dyn Fn(&FinancialOverview) + Send + Sync>;

/// External collaborators the application runs against.
#[derive(Clone)]
pub struct Services {
    pub store: Arc<dyn DocumentStore>,
    pub auth: Arc<dyn AuthService>,
    pub notifier: Arc<dyn Notifier>,
    pub flags: Arc<dyn FlagStore>,
    pub clock: Arc<dyn Clock>,
    pub picker: Arc<dyn InsightPicker>,
}

impl Services {
    /// Uses the wall clock and random insight selection.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        auth: Arc<dyn AuthService>,
        notifier: Arc<dyn Notifier>,
        flags: Arc<dyn FlagStore>,
    ) -> Self {
        Self {
            store,
            auth,
            notifier,
            flags,
            clock: Arc::new(SystemClock),
            picker: Arc::new(RandomPicker),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_picker(mut self, picker: Arc<dyn InsightPicker>) -> Self {
        self.picker = picker;
        self
    }
}

struct AppInner {
    config: Config,
    services: Services,
    worker: Mutex<Option<NotifierWorker>>,
    state: Mutex<SessionState>,
    listeners: Mutex<Vec<Arc<dyn Fn(&FinancialOverview) + Send + Sync>>>,
}

pub struct App;

impl App {
    pub fn init(config: Config, services: Services) -> Result<AppHandle> {
        let notifications = Arc::new(NotificationService::new(
            services.notifier.clone(),
            config.notifications.clone(),
        ));
        let worker = NotifierWorker::spawn(WorkerContext {
            notifications,
            flags: services.flags.clone(),
            clock: services.clock.clone(),
            picker: services.picker.clone(),
            currencies: config.currencies.clone(),
            milestones: config.milestones.clone(),
            insights: config.insights.clone(),
            reminders: config.reminders.clone(),
        })?;

        let inner = Arc::new(AppInner {
            config,
            services,
            worker: Mutex::new(Some(worker)),
            state: Mutex::new(SessionState::default()),
            listeners: Mutex::new(Vec::new()),
        });

        let weak = Arc::downgrade(&inner);
        inner
            .services
            .auth
            .on_session_change(Box::new(move |user| {
                if let Some(app) = weak.upgrade() {
                    app.session_changed(user);
                }
            }));

        tracing::info!("FLOWZI initialized");
        Ok(AppHandle { inner })
    }

    /// Ends the session and stops the worker. Later calls on clones of the
    /// handle fail with [`FlowziError::WorkerStopped`].
    pub fn teardown(handle: AppHandle) {
        handle.inner.end_session();
        let worker = handle
            .inner
            .worker
            .lock()
            .ok()
            .and_then(|mut slot| slot.take());
        if let Some(worker) = worker {
            worker.shutdown();
        }
        tracing::info!("FLOWZI torn down");
    }
}

impl AppInner {
    fn lock_state(&self) -> Result<MutexGuard<'_, SessionState>> {
        self.state.lock().map_err(|_| FlowziError::Poisoned)
    }

    fn enqueue(&self, event: NotifierEvent) -> Result<()> {
        let worker = self.worker.lock().map_err(|_| FlowziError::Poisoned)?;
        match worker.as_ref() {
            Some(worker) => worker.send(event),
            None => Err(FlowziError::WorkerStopped),
        }
    }

    fn enqueue_logged(&self, event: NotifierEvent) {
        if let Err(err) = self.enqueue(event) {
            tracing::warn!(error = %err, "dropping notifier event");
        }
    }

    fn session_changed(self: &Arc<Self>, user: Option<SessionUser>) {
        match user {
            Some(user) => {
                if let Err(err) = self.start_session(user) {
                    tracing::error!(error = %err, "failed to start session");
                }
            }
            None => self.end_session(),
        }
    }

    fn start_session(self: &Arc<Self>, user: SessionUser) -> Result<()> {
        let previous = self.lock_state()?.user.clone();
        match previous {
            Some(current) if current == user => return Ok(()),
            Some(_) => self.end_session(),
            None => {}
        }

        self.lock_state()?.user = Some(user.clone());
        self.enqueue(NotifierEvent::SessionStarted {
            user_id: user.uid.clone(),
        })?;

        let store = &self.services.store;
        if let Err(err) = SettingsService::ensure_defaults(store.as_ref(), &user.uid) {
            tracing::warn!(error = %err, "could not create default settings");
        }

        // Subscriptions deliver their first snapshot before returning, so the
        // state lock must not be held here.
        let mut subscriptions = Vec::with_capacity(SUBSCRIBED_COLLECTIONS.len());
        for collection in SUBSCRIBED_COLLECTIONS {
            let weak: Weak<AppInner> = Arc::downgrade(self);
            let on_snapshot = Box::new(move |documents: Vec<Document>| {
                if let Some(app) = weak.upgrade() {
                    app.snapshot_received(collection, documents);
                }
            });
            let on_error = Box::new(move |err: flowzi_core::CoreError| {
                tracing::warn!(collection, error = %err, "subscription error");
            });
            match store.subscribe(collection, on_snapshot, on_error) {
                Ok(id) => subscriptions.push(id),
                Err(err) => tracing::error!(collection, error = %err, "failed to subscribe"),
            }
        }

        let mut state = self.lock_state()?;
        if state.user.as_ref() == Some(&user) {
            state.subscriptions.extend(subscriptions);
        } else {
            drop(state);
            for id in subscriptions {
                store.unsubscribe(id);
            }
        }
        tracing::info!(uid = %user.uid, "session started");
        Ok(())
    }

    fn end_session(&self) {
        let (had_user, subscriptions) = match self.state.lock() {
            Ok(mut state) => (state.user.is_some(), state.clear()),
            Err(_) => return,
        };
        if !had_user {
            return;
        }
        for id in subscriptions {
            self.services.store.unsubscribe(id);
        }
        self.enqueue_logged(NotifierEvent::SessionEnded);
        self.publish(&FinancialOverview::default());
        tracing::info!("session ended");
    }

    fn snapshot_received(&self, collection: &'static str, documents: Vec<Document>) {
        let (overview, snapshot) = {
            let mut state = match self.lock_state() {
                Ok(state) => state,
                Err(err) => {
                    tracing::warn!(error = %err, "dropping snapshot");
                    return;
                }
            };
            if state.user.is_none() {
                return;
            }
            state.apply(collection, documents);
            let overview = state.recompute(&self.config.budget_profiles).clone();
            (overview, state.worker_snapshot(collection))
        };
        tracing::debug!(collection, "overview recomputed");
        self.enqueue_logged(NotifierEvent::Recomputed(Box::new(snapshot)));
        self.publish(&overview);
    }

    fn publish(&self, overview: &FinancialOverview) {
        let listeners = match self.listeners.lock() {
            Ok(listeners) => listeners.clone(),
            Err(_) => return,
        };
        for listener in listeners {
            listener(overview);
        }
    }
}

/// Cloneable entry point to a running application.
#[derive(Clone)]
pub struct AppHandle {
    inner: Arc<AppInner>,
}

impl AppHandle {
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn current_user(&self) -> Option<SessionUser> {
        self.inner.state.lock().ok().and_then(|state| state.user.clone())
    }

    fn user_id(&self) -> Result<String> {
        self.current_user()
            .map(|user| user.uid)
            .ok_or(FlowziError::NoSession)
    }

    /// The overview derived from the latest snapshots.
    pub fn overview(&self) -> FinancialOverview {
        self.inner
            .state
            .lock()
            .map(|state| state.overview.clone())
            .unwrap_or_default()
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.inner
            .state
            .lock()
            .map(|state| state.transactions.clone())
            .unwrap_or_default()
    }

    pub fn goals(&self) -> Vec<Goal> {
        self.inner
            .state
            .lock()
            .map(|state| state.goals.clone())
            .unwrap_or_default()
    }

    pub fn bills(&self) -> Vec<Bill> {
        self.inner
            .state
            .lock()
            .map(|state| state.bills.clone())
            .unwrap_or_default()
    }

    /// Formatter bound to the signed-in user's currency preferences.
    pub fn formatter(&self) -> MoneyFormatter {
        MoneyFormatter::new(
            self.inner.config.currencies.clone(),
            self.overview().preferences,
        )
    }

    pub fn on_overview(&self, listener: OverviewListener) {
        if let Ok(mut listeners) = self.inner.listeners.lock() {
            listeners.push(Arc::from(listener));
        }
    }

    /// Waits for the notifier worker to drain its queue.
    pub fn flush(&self) -> Result<()> {
        let worker = self.inner.worker.lock().map_err(|_| FlowziError::Poisoned)?;
        match worker.as_ref() {
            Some(worker) => worker.flush(),
            None => Err(FlowziError::WorkerStopped),
        }
    }

    fn welcome(&self, request: NotificationRequest) {
        if self.inner.config.notifications.welcome_messages {
            self.inner.enqueue_logged(NotifierEvent::Schedule(request));
        }
    }

    pub fn login(&self, email: &str, password: &str) -> AuthOutcome {
        let outcome = self.inner.services.auth.login(email, password);
        if outcome.success {
            self.welcome(templates::welcome_back());
        } else {
            tracing::warn!(error = ?outcome.error, "login failed");
        }
        outcome
    }

    pub fn register(&self, email: &str, password: &str) -> AuthOutcome {
        let outcome = self.inner.services.auth.register(email, password);
        if outcome.success {
            self.welcome(templates::welcome_new_user());
        } else {
            tracing::warn!(error = ?outcome.error, "registration failed");
        }
        outcome
    }

    pub fn logout(&self) -> AuthOutcome {
        let outcome = self.inner.services.auth.logout();
        self.inner.end_session();
        outcome
    }

    pub fn reset_password(&self, email: &str) -> AuthOutcome {
        self.inner.services.auth.reset_password(email)
    }

    pub fn add_transaction(&self, input: &NewTransaction) -> Result<Transaction> {
        self.user_id()?;
        let today = self.inner.services.clock.today();
        Ok(TransactionService::add(
            self.inner.services.store.as_ref(),
            input,
            &self.formatter(),
            today,
        )?)
    }

    pub fn delete_transaction(&self, id: &str) -> Result<()> {
        self.user_id()?;
        Ok(TransactionService::delete(self.inner.services.store.as_ref(), id)?)
    }

    pub fn add_goal(&self, input: &NewGoal) -> Result<Goal> {
        self.user_id()?;
        let formatter = self.formatter();
        let goal = GoalService::create(
            self.inner.services.store.as_ref(),
            input,
            &formatter,
            self.inner.services.clock.as_ref(),
        )?;
        self.inner
            .enqueue_logged(NotifierEvent::Schedule(GoalService::created_notification(
                &goal, &formatter,
            )));
        Ok(goal)
    }

    pub fn update_goal(&self, id: &str, input: &NewGoal) -> Result<Goal> {
        self.user_id()?;
        let goal = GoalService::update(
            self.inner.services.store.as_ref(),
            id,
            input,
            &self.formatter(),
        )?;
        self.inner
            .enqueue_logged(NotifierEvent::Schedule(GoalService::updated_notification(&goal)));
        Ok(goal)
    }

    pub fn delete_goal(&self, id: &str) -> Result<()> {
        self.user_id()?;
        let name = self
            .goals()
            .into_iter()
            .find(|goal| goal.id == id)
            .map(|goal| goal.name)
            .ok_or_else(|| flowzi_core::CoreError::NotFound(format!("goal {id}")))?;
        GoalService::delete(self.inner.services.store.as_ref(), id)?;
        self.inner
            .enqueue_logged(NotifierEvent::Schedule(GoalService::deleted_notification(&name)));
        Ok(())
    }

    /// Stores the bill and schedules its due-date reminders.
    pub fn add_bill(&self, input: &NewBill) -> Result<Bill> {
        self.user_id()?;
        let formatter = self.formatter();
        let bill = BillService::add(self.inner.services.store.as_ref(), input, &formatter)?;
        self.inner.enqueue_logged(NotifierEvent::BillAdded {
            bill: bill.clone(),
            preferences: formatter.preferences().clone(),
        });
        Ok(bill)
    }

    pub fn delete_bill(&self, id: &str) -> Result<()> {
        self.user_id()?;
        Ok(BillService::delete(self.inner.services.store.as_ref(), id)?)
    }

    /// `amount` is in the display currency; returns the stored monthly base-unit income.
    pub fn save_income(&self, amount: f64, frequency: IncomeFrequency) -> Result<f64> {
        let uid = self.user_id()?;
        let currency = self.overview().preferences.currency;
        Ok(SettingsService::save_income(
            self.inner.services.store.as_ref(),
            &uid,
            &self.inner.config.currencies,
            &currency,
            amount,
            frequency,
        )?)
    }

    pub fn save_preferences(&self, prefs: &CurrencyPreferences) -> Result<()> {
        let uid = self.user_id()?;
        Ok(SettingsService::save_preferences(
            self.inner.services.store.as_ref(),
            &uid,
            prefs,
        )?)
    }

    /// Deletes every transaction, goal and bill and resets income and currency.
    pub fn clear_all_data(&self) -> Result<usize> {
        let uid = self.user_id()?;
        Ok(SettingsService::clear_all_data(
            self.inner.services.store.as_ref(),
            &uid,
        )?)
    }
}
