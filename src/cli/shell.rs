use std::{
    env,
    io::{self, BufRead, IsTerminal, Write},
    path::PathBuf,
    sync::Arc,
};

use shell_words::split;
use thiserror::Error;

use flowzi_config::{Config, ConfigError, ConfigManager};
use flowzi_core::CoreError;
use flowzi_storage::{JsonFlagStore, MemoryDocumentStore};

use crate::{
    app::{App, AppHandle, LocalAuth, Services},
    cli::{
        commands::{CommandError, CommandRegistry, LoopControl},
        output, ConsoleNotifier,
    },
    errors::FlowziError,
};

/// Environment variable that forces script mode.
pub const SCRIPT_ENV: &str = "FLOWZI_CLI_SCRIPT";
/// Environment variable that relocates config, backups and flags.
pub const HOME_ENV: &str = "FLOWZI_HOME";

#[derive(Debug, Error)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    App(#[from] FlowziError),
}

pub struct ShellContext {
    pub app: AppHandle,
    pub running: bool,
    registry: CommandRegistry,
    config_manager: ConfigManager,
}

impl ShellContext {
    pub fn new(app: AppHandle, config_manager: ConfigManager) -> Self {
        Self {
            app,
            running: true,
            registry: CommandRegistry::with_defaults(),
            config_manager,
        }
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn config_manager(&self) -> &ConfigManager {
        &self.config_manager
    }

    pub fn prompt(&self) -> String {
        match self.app.current_user() {
            Some(user) if !user.email.is_empty() => format!("flowzi ({})> ", user.email),
            _ => "flowzi> ".to_string(),
        }
    }

    pub fn dispatch(&mut self, command: &str, args: &[&str]) -> Result<LoopControl, CommandError> {
        let handler = self
            .registry
            .handler(command)
            .ok_or_else(|| CommandError::Unknown(command.to_string()))?;
        let result = handler(self, args);
        if let Err(err) = self.app.flush() {
            tracing::debug!(error = %err, "flush after command failed");
        }
        result
    }
}

/// Entry point for the `flowzi_cli` binary.
pub fn run_cli() -> Result<(), CliError> {
    let home = env::var_os(HOME_ENV).map(PathBuf::from);
    let base = home.clone().unwrap_or_else(Config::default_base_dir);
    let manager = ConfigManager::with_base_dir(base)?;
    let config = manager.load()?;
    crate::init_with_filter(&config.log_filter);

    let flag_path = match (&config.flag_store_path, home) {
        (None, Some(home)) => home.join("milestones.json"),
        _ => config.resolve_flag_store_path(),
    };
    let flags = JsonFlagStore::open(flag_path)?;

    let services = Services::new(
        Arc::new(MemoryDocumentStore::new()),
        Arc::new(LocalAuth::new()),
        Arc::new(ConsoleNotifier),
        Arc::new(flags),
    );
    let app = App::init(config, services)?;
    let interactive = env::var_os(SCRIPT_ENV).is_none() && io::stdin().is_terminal();

    let mut context = ShellContext::new(app.clone(), manager);
    let outcome = run_loop(&mut context, interactive);
    App::teardown(app);
    outcome
}

fn run_loop(context: &mut ShellContext, interactive: bool) -> Result<(), CliError> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        if !context.running {
            break;
        }
        if interactive {
            print!("{}", context.prompt());
            io::stdout().flush()?;
        }
        let Some(line) = lines.next() else {
            if interactive {
                output::info("Exiting shell.");
            }
            break;
        };
        match handle_line(context, &line?) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => output::error(err),
        }
    }
    Ok(())
}

pub(crate) fn handle_line(
    context: &mut ShellContext,
    line: &str,
) -> Result<LoopControl, CommandError> {
    let tokens = match split(line) {
        Ok(tokens) => tokens,
        Err(err) => {
            output::warning(err);
            return Ok(LoopControl::Continue);
        }
    };
    let Some((first, rest)) = tokens.split_first() else {
        return Ok(LoopControl::Continue);
    };
    if first.starts_with('#') {
        return Ok(LoopControl::Continue);
    }

    let command = first.to_lowercase();
    let args: Vec<&str> = rest.iter().map(String::as_str).collect();
    match context.dispatch(&command, &args) {
        Ok(LoopControl::Exit) => {
            context.running = false;
            Ok(LoopControl::Exit)
        }
        other => other,
    }
}
