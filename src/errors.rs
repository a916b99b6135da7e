use thiserror::Error;

use flowzi_config::ConfigError;
use flowzi_core::CoreError;

/// Top-level failure surfaced by the application shell.
#[derive(Debug, Error)]
pub enum FlowziError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("No active session")]
    NoSession,
    #[error("Notifier worker stopped")]
    WorkerStopped,
    #[error("State lock poisoned")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, FlowziError>;
