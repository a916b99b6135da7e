//! Tunable thresholds for notifications. Defaults mirror the shipped behaviour.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct MilestoneRules {
    /// Prefix milestone flags with the user id. Off by default so existing
    /// `milestone_{goalId}_{threshold}` flags stay valid.
    #[serde(default)]
    pub scope_by_user: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InsightRules {
    /// Savings rate (percent) above which a positive insight is offered.
    #[serde(default = "InsightRules::default_positive_rate")]
    pub positive_rate: f64,
    /// Savings rate (percent) below which a cautionary insight is offered.
    #[serde(default = "InsightRules::default_caution_rate")]
    pub caution_rate: f64,
    /// Goal progress (percent) above which the best goal is highlighted.
    #[serde(default = "InsightRules::default_goal_highlight")]
    pub goal_highlight: f64,
    /// Share of monthly income (percent) a single category may take before it is flagged.
    #[serde(default = "InsightRules::default_category_share")]
    pub category_share: f64,
    #[serde(default = "InsightRules::default_delay_seconds")]
    pub delay_seconds: u64,
}

impl InsightRules {
    pub fn default_positive_rate() -> f64 {
        20.0
    }

    pub fn default_caution_rate() -> f64 {
        10.0
    }

    pub fn default_goal_highlight() -> f64 {
        80.0
    }

    pub fn default_category_share() -> f64 {
        30.0
    }

    pub fn default_delay_seconds() -> u64 {
        60
    }
}

impl Default for InsightRules {
    fn default() -> Self {
        Self {
            positive_rate: Self::default_positive_rate(),
            caution_rate: Self::default_caution_rate(),
            goal_highlight: Self::default_goal_highlight(),
            category_share: Self::default_category_share(),
            delay_seconds: Self::default_delay_seconds(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReminderRules {
    /// Days before the due date at which a reminder fires.
    #[serde(default = "ReminderRules::default_offsets")]
    pub offsets_days: Vec<i64>,
}

impl ReminderRules {
    pub fn default_offsets() -> Vec<i64> {
        vec![7, 3, 1]
    }
}

impl Default for ReminderRules {
    fn default() -> Self {
        Self {
            offsets_days: Self::default_offsets(),
        }
    }
}
