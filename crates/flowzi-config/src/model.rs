use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use flowzi_domain::{
    default_profiles, AllocationProfile, CurrencyTable, InsightRules, MilestoneRules,
    ReminderRules,
};

/// Application configuration. Every section is optional on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub currencies: CurrencyTable,
    /// Allocation tables in display order. The first one drives savings suggestions.
    #[serde(default = "default_profiles")]
    pub budget_profiles: Vec<AllocationProfile>,
    #[serde(default)]
    pub milestones: MilestoneRules,
    #[serde(default)]
    pub insights: InsightRules,
    #[serde(default)]
    pub reminders: ReminderRules,
    #[serde(default)]
    pub notifications: NotificationSettings,
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    #[serde(default = "Config::default_log_filter")]
    pub log_filter: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Optional location of the milestone flag file. Defaults to the user data directory.
    pub flag_store_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currencies: CurrencyTable::default(),
            budget_profiles: default_profiles(),
            milestones: MilestoneRules::default(),
            insights: InsightRules::default(),
            reminders: ReminderRules::default(),
            notifications: NotificationSettings::default(),
            log_filter: Self::default_log_filter(),
            flag_store_path: None,
        }
    }
}

impl Config {
    pub fn default_log_filter() -> String {
        "flowzi=info".into()
    }

    pub fn profile(&self, name: &str) -> Option<&AllocationProfile> {
        self.budget_profiles
            .iter()
            .find(|profile| profile.name.eq_ignore_ascii_case(name))
    }

    pub fn resolve_flag_store_path(&self) -> PathBuf {
        if let Some(path) = &self.flag_store_path {
            return path.clone();
        }

        let base = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        base.join("flowzi").join("milestones.json")
    }

    /// Default directory for `ConfigManager::with_base_dir`.
    pub fn default_base_dir() -> PathBuf {
        dirs::config_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("flowzi")
    }
}

/// Switches for notification families that are not tied to a computation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationSettings {
    #[serde(default = "NotificationSettings::enabled_by_default")]
    pub enabled: bool,
    #[serde(default = "NotificationSettings::enabled_by_default")]
    pub weekly_summary: bool,
    #[serde(default = "NotificationSettings::enabled_by_default")]
    pub welcome_messages: bool,
    #[serde(default = "NotificationSettings::enabled_by_default")]
    pub bill_reminders: bool,
}

impl NotificationSettings {
    pub fn enabled_by_default() -> bool {
        true
    }
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            weekly_summary: true,
            welcome_messages: true,
            bill_reminders: true,
        }
    }
}
