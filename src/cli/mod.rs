pub mod commands;
pub mod notifier;
pub mod output;
pub mod shell;

pub use notifier::ConsoleNotifier;
pub use shell::{run_cli, CliError};
