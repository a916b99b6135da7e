use thiserror::Error;

use flowzi_config::ConfigError;
use flowzi_core::{
    CoreError, CurrencyPreferences, NewBill, NewGoal, NewTransaction, SummaryService,
    TransactionFilter,
};
use flowzi_domain::{IncomeFrequency, SymbolPosition, TransactionType};

use crate::{cli::output, cli::shell::ShellContext, errors::FlowziError, utils::build_info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Unknown command `{0}`. Type `help` to list commands.")]
    Unknown(String),
    #[error("Usage: {0}")]
    Usage(&'static str),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("{0}")]
    Auth(String),
    #[error(transparent)]
    App(#[from] FlowziError),
}

impl From<CoreError> for CommandError {
    fn from(err: CoreError) -> Self {
        CommandError::App(FlowziError::Core(err))
    }
}

impl From<ConfigError> for CommandError {
    fn from(err: ConfigError) -> Self {
        CommandError::App(FlowziError::Config(err))
    }
}

pub type CommandResult = Result<LoopControl, CommandError>;

pub type CommandHandler = fn(&mut ShellContext, &[&str]) -> CommandResult;

pub struct CommandEntry {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub handler: CommandHandler,
}

impl CommandEntry {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        usage: &'static str,
        handler: CommandHandler,
    ) -> Self {
        Self {
            name,
            description,
            usage,
            handler,
        }
    }
}

/// Commands in registration order.
#[derive(Default)]
pub struct CommandRegistry {
    entries: Vec<CommandEntry>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for entry in default_commands() {
            registry.register(entry);
        }
        registry
    }

    /// Later registrations replace earlier ones with the same name.
    pub fn register(&mut self, entry: CommandEntry) {
        match self.entries.iter_mut().find(|existing| existing.name == entry.name) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn get(&self, name: &str) -> Option<&CommandEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    pub fn list(&self) -> &[CommandEntry] {
        &self.entries
    }

    pub fn handler(&self, name: &str) -> Option<CommandHandler> {
        match name {
            "quit" => self.get("exit"),
            other => self.get(other),
        }
        .map(|entry| entry.handler)
    }
}

fn default_commands() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new("help", "List commands", "help", cmd_help),
        CommandEntry::new("version", "Show build information", "version", cmd_version),
        CommandEntry::new("register", "Create an account and sign in", "register <email> <password>", cmd_register),
        CommandEntry::new("login", "Sign in", "login <email> <password>", cmd_login),
        CommandEntry::new("logout", "Sign out", "logout", cmd_logout),
        CommandEntry::new("reset-password", "Request a password reset", "reset-password <email>", cmd_reset_password),
        CommandEntry::new("currency", "Set display currency", "currency <code> [cents|no-cents] [before|after]", cmd_currency),
        CommandEntry::new("income", "Set income from settings", "income <amount> [weekly|monthly|yearly]", cmd_income),
        CommandEntry::new("add", "Record a transaction", "add <income|expense> <category> <amount> [side|regular|misc] [note]", cmd_add),
        CommandEntry::new("goal", "Create a savings goal", "goal <name> <target> <months>", cmd_goal),
        CommandEntry::new("edit-goal", "Change a savings goal", "edit-goal <id> <name> <target> <months>", cmd_edit_goal),
        CommandEntry::new("bill", "Track a bill and schedule reminders", "bill <name> <amount> <days-until-due>", cmd_bill),
        CommandEntry::new("remove", "Delete a record", "remove <transaction|goal|bill> <id>", cmd_remove),
        CommandEntry::new("summary", "Income, expenses and balance", "summary", cmd_summary),
        CommandEntry::new("transactions", "List transactions", "transactions [all|income|expenses|regular|side] [search]", cmd_transactions),
        CommandEntry::new("goals", "Goal progress", "goals", cmd_goals),
        CommandEntry::new("budget", "Budget vs. actual", "budget [profile]", cmd_budget),
        CommandEntry::new("bills", "Upcoming bills", "bills", cmd_bills),
        CommandEntry::new("clear", "Delete all transactions, goals and bills", "clear", cmd_clear),
        CommandEntry::new("config", "View, save and back up the configuration", CONFIG_USAGE, cmd_config),
        CommandEntry::new("exit", "Leave the shell", "exit", cmd_exit),
    ]
}

const CONFIG_USAGE: &str = "config [show|save|backup [note]|backups|restore <name>]";

fn parse_amount(value: &str) -> Result<f64, CommandError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite())
        .ok_or_else(|| CommandError::InvalidArgument(format!("`{value}` is not a number")))
}

fn parse_int<T: std::str::FromStr>(value: &str) -> Result<T, CommandError> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| CommandError::InvalidArgument(format!("`{value}` is not a whole number")))
}

fn parse_frequency(value: &str) -> Result<IncomeFrequency, CommandError> {
    match value.to_ascii_lowercase().as_str() {
        "weekly" => Ok(IncomeFrequency::Weekly),
        "monthly" => Ok(IncomeFrequency::Monthly),
        "yearly" => Ok(IncomeFrequency::Yearly),
        other => Err(CommandError::InvalidArgument(format!(
            "unknown frequency `{other}`"
        ))),
    }
}

fn auth_result(outcome: flowzi_core::AuthOutcome, success: &str) -> CommandResult {
    if outcome.success {
        output::success(success);
        Ok(LoopControl::Continue)
    } else {
        Err(CommandError::Auth(
            outcome.error.unwrap_or_else(|| "Authentication failed.".into()),
        ))
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (action, rest) = match args.split_first() {
        Some((action, rest)) => (action.to_ascii_lowercase(), rest),
        None => ("show".to_string(), args),
    };
    let manager = context.config_manager();
    let config = context.app.config();

    match action.as_str() {
        "show" => {
            let profiles: Vec<&str> = config
                .budget_profiles
                .iter()
                .map(|profile| profile.name.as_str())
                .collect();
            output::section("Configuration");
            output::line(format!("File             {}", manager.config_path().display()));
            output::line(format!("Backups          {}", manager.backups_dir().display()));
            output::line(format!("Log filter       {}", config.log_filter));
            output::line(format!("Budget profiles  {}", profiles.join(", ")));
            output::line(format!("Notifications    {}", on_off(config.notifications.enabled)));
            output::line(format!("  weekly summary {}", on_off(config.notifications.weekly_summary)));
            output::line(format!("  welcome        {}", on_off(config.notifications.welcome_messages)));
            output::line(format!("  bill reminders {}", on_off(config.notifications.bill_reminders)));
        }
        "save" => {
            manager.save(config)?;
            output::success(format!(
                "Configuration saved to {}.",
                manager.config_path().display()
            ));
        }
        "backup" => {
            let note = (!rest.is_empty()).then(|| rest.join(" "));
            let name = manager.backup(config, note.as_deref())?;
            output::success(format!("Configuration backup created: {name}"));
        }
        "backups" => {
            let names = manager.list_backups()?;
            output::section("Configuration backups");
            if names.is_empty() {
                output::info("No backups yet.");
            }
            for name in names {
                output::line(name);
            }
        }
        "restore" => {
            let [name] = rest else {
                return Err(CommandError::Usage("config restore <name>"));
            };
            manager.restore(name)?;
            output::success(format!("Restored {name}. Restart the shell to apply it."));
        }
        _ => return Err(CommandError::Usage(CONFIG_USAGE)),
    }
    Ok(LoopControl::Continue)
}

fn cmd_help(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    output::section("Commands");
    for entry in context.registry().list() {
        output::line(format!("{:<16} {}", entry.name, entry.description));
        output::line(format!("{:<16} {}", "", entry.usage));
    }
    Ok(LoopControl::Continue)
}

fn cmd_version(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    output::info(build_info::current().summary());
    Ok(LoopControl::Continue)
}

fn cmd_register(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [email, password] = args else {
        return Err(CommandError::Usage("register <email> <password>"));
    };
    auth_result(context.app.register(email, password), "Account created.")
}

fn cmd_login(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [email, password] = args else {
        return Err(CommandError::Usage("login <email> <password>"));
    };
    auth_result(context.app.login(email, password), "Signed in.")
}

fn cmd_logout(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    auth_result(context.app.logout(), "Signed out.")
}

fn cmd_reset_password(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [email] = args else {
        return Err(CommandError::Usage("reset-password <email>"));
    };
    auth_result(
        context.app.reset_password(email),
        "Password reset email sent.",
    )
}

fn cmd_currency(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((code, options)) = args.split_first() else {
        return Err(CommandError::Usage(
            "currency <code> [cents|no-cents] [before|after]",
        ));
    };
    let code = code.to_ascii_uppercase();
    if context.app.config().currencies.entry(&code).is_none() {
        return Err(CommandError::InvalidArgument(format!(
            "unknown currency `{code}`"
        )));
    }
    let mut prefs = CurrencyPreferences {
        currency: code,
        ..context.app.overview().preferences
    };
    for option in options {
        match option.to_ascii_lowercase().as_str() {
            "cents" => prefs.show_cents = true,
            "no-cents" => prefs.show_cents = false,
            "before" | "after" => prefs.symbol_position = SymbolPosition::from_str(option),
            other => {
                return Err(CommandError::InvalidArgument(format!(
                    "unknown currency option `{other}`"
                )))
            }
        }
    }
    context.app.save_preferences(&prefs)?;
    output::success(format!("Currency set to {}.", prefs.currency));
    Ok(LoopControl::Continue)
}

fn cmd_income(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (amount, frequency) = match args {
        [amount] => (parse_amount(amount)?, IncomeFrequency::Monthly),
        [amount, frequency] => (parse_amount(amount)?, parse_frequency(frequency)?),
        _ => return Err(CommandError::Usage("income <amount> [weekly|monthly|yearly]")),
    };
    let monthly = context.app.save_income(amount, frequency)?;
    let formatter = context.app.formatter();
    output::success(format!("Monthly income set to {}.", formatter.format(monthly)));
    Ok(LoopControl::Continue)
}

fn cmd_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    const USAGE: &str = "add <income|expense> <category> <amount> [side|regular|misc] [note]";
    let [kind, category, amount, rest @ ..] = args else {
        return Err(CommandError::Usage(USAGE));
    };
    let amount = parse_amount(amount)?;
    let mut input = match kind.to_ascii_lowercase().as_str() {
        "income" => NewTransaction::income(*category, amount),
        "expense" => NewTransaction::expense(*category, amount),
        _ => return Err(CommandError::Usage(USAGE)),
    };
    if let Some((tag, note)) = rest.split_first() {
        let transaction_type = match tag.to_ascii_lowercase().as_str() {
            "side" => TransactionType::SideIncome,
            "regular" => TransactionType::RegularExpense,
            "misc" => TransactionType::Miscellaneous,
            other => {
                return Err(CommandError::InvalidArgument(format!(
                    "unknown transaction type `{other}`"
                )))
            }
        };
        input = input.with_type(transaction_type).with_note(note.join(" "));
    }
    let txn = context.app.add_transaction(&input)?;
    let formatter = context.app.formatter();
    output::success(format!(
        "Transaction added: {} {} [{}]",
        txn.category,
        formatter.format(txn.amount),
        txn.id
    ));
    Ok(LoopControl::Continue)
}

fn goal_input(name: &str, target: &str, months: &str) -> Result<NewGoal, CommandError> {
    Ok(NewGoal::new(name, parse_amount(target)?, parse_int(months)?))
}

fn cmd_goal(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [name, target, months] = args else {
        return Err(CommandError::Usage("goal <name> <target> <months>"));
    };
    let goal = context.app.add_goal(&goal_input(name, target, months)?)?;
    output::success(format!("Goal created: {} [{}]", goal.name, goal.id));
    Ok(LoopControl::Continue)
}

fn cmd_edit_goal(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [id, name, target, months] = args else {
        return Err(CommandError::Usage("edit-goal <id> <name> <target> <months>"));
    };
    let goal = context
        .app
        .update_goal(id, &goal_input(name, target, months)?)?;
    output::success(format!("Goal updated: {}", goal.name));
    Ok(LoopControl::Continue)
}

fn cmd_bill(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [name, amount, days] = args else {
        return Err(CommandError::Usage("bill <name> <amount> <days-until-due>"));
    };
    let input = NewBill::new(*name, parse_amount(amount)?, parse_int(days)?);
    let bill = context.app.add_bill(&input)?;
    output::success(format!("Bill added: {} [{}]", bill.name, bill.id));
    Ok(LoopControl::Continue)
}

fn cmd_remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [kind, id] = args else {
        return Err(CommandError::Usage("remove <transaction|goal|bill> <id>"));
    };
    match kind.to_ascii_lowercase().as_str() {
        "transaction" => context.app.delete_transaction(id)?,
        "goal" => context.app.delete_goal(id)?,
        "bill" => context.app.delete_bill(id)?,
        _ => return Err(CommandError::Usage("remove <transaction|goal|bill> <id>")),
    }
    output::success(format!("Removed {kind} {id}."));
    Ok(LoopControl::Continue)
}

fn cmd_summary(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let overview = context.app.overview();
    let formatter = context.app.formatter();
    let summary = &overview.summary;

    output::section("Summary");
    output::line(format!("Total income     {}", formatter.format(summary.combined_income())));
    output::line(format!("  primary        {}", formatter.format(summary.primary_income)));
    output::line(format!("  side           {}", formatter.format(summary.side_income)));
    output::line(format!("  from settings  {}", formatter.format(summary.monthly_income)));
    output::line(format!("Total expenses   {}", formatter.format(summary.total_expenses)));
    output::line(format!("  regular        {}", formatter.format(summary.regular_expenses)));
    output::line(format!("  miscellaneous  {}", formatter.format(summary.miscellaneous_expenses)));
    output::line(format!("Balance          {}", formatter.format(summary.total_balance)));
    for (category, spent) in &summary.expenses_by_category {
        output::line(format!("  {:<15}{}", category, formatter.format(*spent)));
    }
    if let Some(badge) = &overview.achievement_badge {
        output::success(badge);
    }
    output::info(overview.savings_message(&formatter));
    Ok(LoopControl::Continue)
}

fn cmd_transactions(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let filter = match args.first() {
        Some(name) => TransactionFilter::from_str(name).ok_or_else(|| {
            CommandError::InvalidArgument(format!("unknown filter `{name}`"))
        })?,
        None => TransactionFilter::All,
    };
    let search = args.get(1..).map(|rest| rest.join(" ")).unwrap_or_default();
    let transactions = context.app.transactions();
    let formatter = context.app.formatter();

    output::section(format!("Transactions ({filter})"));
    let matches = SummaryService::filter(&transactions, filter, &search);
    if matches.is_empty() {
        output::info("No transactions found.");
    }
    for txn in matches {
        output::line(format!(
            "{} {:<14} {:>12} {:<16} {} [{}]",
            txn.date,
            txn.category,
            formatter.format(txn.amount),
            txn.transaction_type,
            txn.note,
            txn.id
        ));
    }
    Ok(LoopControl::Continue)
}

fn cmd_goals(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let overview = context.app.overview();
    let formatter = context.app.formatter();

    output::section("Goals");
    if overview.goals.is_empty() {
        output::info("No goals yet.");
    }
    for entry in &overview.goals {
        output::line(format!(
            "{}: {} of {} ({:.1}%), {} per month, {} per week, {} [{}]",
            entry.goal.name,
            formatter.format(entry.saved),
            formatter.format(entry.goal.target_amount),
            entry.progress,
            formatter.format(entry.monthly_target),
            formatter.format(entry.weekly_target),
            entry.pace,
            entry.goal.id
        ));
    }
    output::line(format!(
        "Remaining after goals: {}",
        formatter.format(overview.remaining_after_goals)
    ));
    Ok(LoopControl::Continue)
}

fn cmd_budget(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let overview = context.app.overview();
    let formatter = context.app.formatter();
    let plan = match args.first() {
        Some(name) => overview.budget(name).ok_or_else(|| {
            CommandError::InvalidArgument(format!("unknown budget profile `{name}`"))
        })?,
        None => overview
            .budgets
            .first()
            .ok_or_else(|| CommandError::InvalidArgument("no budget profiles configured".into()))?,
    };

    output::section(format!("Budget ({})", plan.profile));
    output::line(format!(
        "Budget {} of income {} (saving {})",
        formatter.format(plan.total_budget),
        formatter.format(plan.monthly_income),
        formatter.format(plan.mandatory_savings)
    ));
    for line in &plan.lines {
        output::line(format!(
            "{:<18} {:>12} / {:>12} {:>5.0}% {}",
            line.category,
            formatter.format(line.spent),
            formatter.format(line.budgeted),
            line.spent_percentage,
            output::status(line.status)
        ));
    }
    output::line(format!(
        "Spent {}, remaining {}",
        formatter.format(plan.total_spent),
        formatter.format(plan.total_remaining)
    ));
    Ok(LoopControl::Continue)
}

fn cmd_bills(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let overview = context.app.overview();
    let formatter = context.app.formatter();

    output::section("Bills");
    if overview.upcoming_bills.is_empty() {
        output::info("No bills tracked.");
    }
    for bill in &overview.upcoming_bills {
        output::line(format!(
            "{} {} due in {} days [{}]",
            bill.name,
            formatter.format(bill.amount),
            bill.days,
            bill.id
        ));
    }
    Ok(LoopControl::Continue)
}

fn cmd_clear(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let removed = context.app.clear_all_data()?;
    output::success(format!("Cleared {removed} records."));
    Ok(LoopControl::Continue)
}

fn cmd_exit(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    Ok(LoopControl::Exit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quit_aliases_exit() {
        let registry = CommandRegistry::with_defaults();
        assert!(registry.handler("quit").is_some());
        assert!(registry.handler("nope").is_none());
        assert_eq!(registry.list().first().map(|entry| entry.name), Some("help"));
    }

    #[test]
    fn argument_parsers_reject_garbage() {
        assert_eq!(parse_amount(" 12.5 ").unwrap(), 12.5);
        assert!(parse_amount("NaN").is_err());
        assert!(parse_int::<u32>("-3").is_err());
        assert_eq!(parse_frequency("Weekly").unwrap(), IncomeFrequency::Weekly);
    }
}
