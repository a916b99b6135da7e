use colored::Colorize;
use std::fmt;

use flowzi_core::BudgetStatus;

/// Message categories used by the CLI output helpers.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
    Section,
    Notice,
}

fn label(kind: MessageKind) -> &'static str {
    match kind {
        MessageKind::Info => "[i]",
        MessageKind::Success => "[ok]",
        MessageKind::Warning => "[!]",
        MessageKind::Error => "[x]",
        MessageKind::Notice => "[*]",
        MessageKind::Section => "",
    }
}

fn apply_style(kind: MessageKind, message: impl fmt::Display) -> String {
    let text = message.to_string();
    let base = match kind {
        MessageKind::Section => format!("=== {} ===", text.trim()),
        _ => format!("{} {}", label(kind), text),
    };
    match kind {
        MessageKind::Success => base.bright_green().to_string(),
        MessageKind::Warning => base.bright_yellow().to_string(),
        MessageKind::Error => base.bright_red().to_string(),
        MessageKind::Notice => base.bright_cyan().to_string(),
        MessageKind::Section => base.bold().to_string(),
        MessageKind::Info => base,
    }
}

pub fn print(kind: MessageKind, message: impl fmt::Display) {
    let formatted = apply_style(kind, message);
    match kind {
        MessageKind::Section => println!("\n{}", formatted),
        _ => println!("{}", formatted),
    }
}

pub fn info(message: impl fmt::Display) {
    print(MessageKind::Info, message);
}

pub fn success(message: impl fmt::Display) {
    print(MessageKind::Success, message);
}

pub fn warning(message: impl fmt::Display) {
    print(MessageKind::Warning, message);
}

pub fn error(message: impl fmt::Display) {
    print(MessageKind::Error, message);
}

pub fn notice(message: impl fmt::Display) {
    print(MessageKind::Notice, message);
}

pub fn section(title: impl fmt::Display) {
    print(MessageKind::Section, title);
}

/// Plain row, no label.
pub fn line(message: impl fmt::Display) {
    println!("  {}", message);
}

/// Budget status coloured by tier.
pub fn status(status: BudgetStatus) -> String {
    let text = status.to_string();
    match status {
        BudgetStatus::OnTrack => text.green().to_string(),
        BudgetStatus::Warning => text.yellow().to_string(),
        BudgetStatus::OverBudget => text.red().bold().to_string(),
    }
}
