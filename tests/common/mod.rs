#![allow(dead_code)]

use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use chrono::NaiveDate;
use flowzi::{App, AppHandle, Services};
use flowzi::app::LocalAuth;
use flowzi_config::Config;
use flowzi_core::{
    CelebrationPrompt, CoreError, FirstPicker, FixedClock, NotificationRequest, Notifier,
};
use flowzi_storage::{MemoryDocumentStore, MemoryFlagStore};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub fn temp_dir() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    path
}

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 20).unwrap()
}

/// Notifier that remembers everything it was asked to do.
#[derive(Default)]
pub struct RecordingNotifier {
    pub requests: Mutex<Vec<NotificationRequest>>,
    pub celebrations: Mutex<Vec<CelebrationPrompt>>,
    pub cancelled: AtomicUsize,
    pub denied: AtomicBool,
}

impl RecordingNotifier {
    /// A notifier whose platform refuses permission.
    pub fn denied() -> Self {
        Self {
            denied: AtomicBool::new(true),
            ..Self::default()
        }
    }

    pub fn kinds(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|request| request.kind().unwrap_or_default().to_string())
            .collect()
    }

    pub fn of_kind(&self, kind: &str) -> Vec<NotificationRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|request| request.kind() == Some(kind))
            .cloned()
            .collect()
    }

    pub fn cancel_count(&self) -> usize {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl Notifier for RecordingNotifier {
    fn initialize(&self) -> Result<bool, CoreError> {
        Ok(!self.denied.load(Ordering::SeqCst))
    }

    fn schedule_local(&self, request: NotificationRequest) -> Result<Option<String>, CoreError> {
        let mut requests = self.requests.lock().unwrap();
        requests.push(request);
        Ok(Some(format!("n{}", requests.len())))
    }

    fn cancel(&self, _id: &str) -> Result<(), CoreError> {
        Ok(())
    }

    fn cancel_all(&self) -> Result<(), CoreError> {
        self.cancelled.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn celebrate(&self, prompt: CelebrationPrompt) -> Result<(), CoreError> {
        self.celebrations.lock().unwrap().push(prompt);
        Ok(())
    }
}

pub struct Harness {
    pub app: AppHandle,
    pub store: Arc<MemoryDocumentStore>,
    pub auth: Arc<LocalAuth>,
    pub notifier: Arc<RecordingNotifier>,
    pub flags: Arc<MemoryFlagStore>,
}

impl Harness {
    /// Waits for the worker, then returns the recorded notification kinds.
    pub fn settled_kinds(&self) -> Vec<String> {
        self.app.flush().expect("flush worker");
        self.notifier.kinds()
    }
}

/// App over in-memory collaborators, a clock pinned to [`today`] and
/// deterministic insight selection.
pub fn harness(config: Config) -> Harness {
    harness_with(config, RecordingNotifier::default())
}

pub fn harness_with(config: Config, notifier: RecordingNotifier) -> Harness {
    flowzi::init();
    let store = Arc::new(MemoryDocumentStore::new());
    let auth = Arc::new(LocalAuth::new());
    let notifier = Arc::new(notifier);
    let flags = Arc::new(MemoryFlagStore::new());

    let services = Services::new(store.clone(), auth.clone(), notifier.clone(), flags.clone())
        .with_clock(Arc::new(FixedClock::on(today())))
        .with_picker(Arc::new(FirstPicker));
    let app = App::init(config, services).expect("init app");

    Harness {
        app,
        store,
        auth,
        notifier,
        flags,
    }
}

/// Registers and signs in a fresh user.
pub fn signed_in(config: Config) -> Harness {
    signed_in_with(config, RecordingNotifier::default())
}

pub fn signed_in_with(config: Config, notifier: RecordingNotifier) -> Harness {
    let harness = harness_with(config, notifier);
    let outcome = harness.app.register("ana@example.com", "secret1");
    assert!(outcome.success, "register failed: {:?}", outcome.error);
    harness
}
