use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use flowzi_config::NotificationSettings;
use flowzi_core::{CelebrationPrompt, CoreError, NotificationRequest, Notifier};

/// Wraps the platform [`Notifier`]: nothing is scheduled until `initialize`
/// succeeds or while notifications are disabled in the config.
pub struct NotificationService {
    notifier: Arc<dyn Notifier>,
    settings: NotificationSettings,
    initialized: AtomicBool,
}

impl NotificationService {
    pub fn new(notifier: Arc<dyn Notifier>, settings: NotificationSettings) -> Self {
        Self {
            notifier,
            settings,
            initialized: AtomicBool::new(false),
        }
    }

    pub fn settings(&self) -> &NotificationSettings {
        &self.settings
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Asks the platform for permission. Failures leave the service inert.
    pub fn initialize(&self) -> bool {
        if !self.settings.enabled {
            tracing::debug!("notifications disabled in config");
            return false;
        }
        let ready = match self.notifier.initialize() {
            Ok(ready) => ready,
            Err(err) => {
                tracing::warn!(error = %err, "notifier initialization failed");
                false
            }
        };
        self.initialized.store(ready, Ordering::SeqCst);
        ready
    }

    /// Best-effort scheduling. Returns the platform id when something was scheduled.
    pub fn send(&self, request: NotificationRequest) -> Option<String> {
        let kind = request.kind().unwrap_or("untyped").to_string();
        match self.schedule_local(request) {
            Ok(id) => id,
            Err(err) => {
                tracing::warn!(kind = %kind, error = %err, "failed to schedule notification");
                None
            }
        }
    }

    pub fn clear(&self) {
        if let Err(err) = self.notifier.cancel_all() {
            tracing::warn!(error = %err, "failed to cancel notifications");
        }
    }

    pub fn reset(&self) {
        self.clear();
        self.initialized.store(false, Ordering::SeqCst);
    }
}

impl Notifier for NotificationService {
    fn initialize(&self) -> Result<bool, CoreError> {
        Ok(NotificationService::initialize(self))
    }

    fn schedule_local(&self, request: NotificationRequest) -> Result<Option<String>, CoreError> {
        if !self.is_initialized() {
            tracing::debug!(title = %request.title, "notifier not initialized, skipping");
            return Ok(None);
        }
        let id = self.notifier.schedule_local(request)?;
        if let Some(id) = &id {
            tracing::debug!(id = %id, "notification scheduled");
        }
        Ok(id)
    }

    fn cancel(&self, id: &str) -> Result<(), CoreError> {
        self.notifier.cancel(id)
    }

    fn cancel_all(&self) -> Result<(), CoreError> {
        self.notifier.cancel_all()
    }

    fn celebrate(&self, prompt: CelebrationPrompt) -> Result<(), CoreError> {
        if !self.is_initialized() {
            tracing::debug!(title = %prompt.title, "notifier not initialized, skipping celebration");
            return Ok(());
        }
        self.notifier.celebrate(prompt)
    }
}
