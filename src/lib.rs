#![doc(test(attr(deny(warnings))))]

//! FLOWZI application shell.
//!
//! Wires the domain, core, config and storage crates together: session
//! lifecycle, live recomputation of the financial overview, and the worker
//! that turns derived values into local notifications.

pub mod app;
pub mod cli;
pub mod errors;
pub mod notifications;
pub mod utils;

pub use app::{App, AppHandle, Services};
pub use errors::{FlowziError, Result};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing with the default filter.
pub fn init() {
    init_with_filter(&flowzi_config::Config::default_log_filter());
}

/// Initializes global tracing once. `RUST_LOG` wins over `filter`.
pub fn init_with_filter(filter: &str) {
    INIT_TRACING.call_once(|| {
        utils::init_tracing(filter);
        tracing::info!("FLOWZI tracing initialized.");
    });
}
