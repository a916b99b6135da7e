//! Savings goals. Progress is always derived from transactions, never stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    #[serde(default)]
    pub id: String,
    pub name: String,
    /// Join key against `Transaction::category`.
    pub category: String,
    pub target_amount: f64,
    /// Number of months the goal should be reached in.
    pub timeframe: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Goal {
    /// Creates a goal whose category mirrors its name.
    pub fn new(name: impl Into<String>, target_amount: f64, timeframe: u32) -> Self {
        let name = name.into();
        Self {
            id: String::new(),
            category: name.clone(),
            name,
            target_amount,
            timeframe,
            created_at: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }
}
