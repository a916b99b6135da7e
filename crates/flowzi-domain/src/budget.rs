//! Fixed-percentage allocation tables used by the budget planner.

use serde::{Deserialize, Serialize};

pub const DASHBOARD_PROFILE: &str = "dashboard";
pub const GOALS_PROFILE: &str = "goals";
/// Line of the goals profile that funds savings goals.
pub const GOAL_SAVINGS_LINE: &str = "Saving for Goals";

/// One budget line: a category and its share of the budgetable income.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Allocation {
    pub category: String,
    pub share: f64,
}

impl Allocation {
    pub fn new(category: impl Into<String>, share: f64) -> Self {
        Self {
            category: category.into(),
            share,
        }
    }
}

/// A named allocation table. `reserve_ratio` of income is held back as
/// mandatory savings before the shares are applied.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AllocationProfile {
    pub name: String,
    #[serde(default = "AllocationProfile::default_reserve_ratio")]
    pub reserve_ratio: f64,
    pub allocations: Vec<Allocation>,
}

impl AllocationProfile {
    pub fn default_reserve_ratio() -> f64 {
        0.2
    }

    /// Rent / Food / Dining Out / Transport split shown on the dashboard.
    pub fn dashboard() -> Self {
        Self {
            name: DASHBOARD_PROFILE.into(),
            reserve_ratio: Self::default_reserve_ratio(),
            allocations: vec![
                Allocation::new("Rent", 0.4),
                Allocation::new("Food", 0.2),
                Allocation::new("Dining Out", 0.15),
                Allocation::new("Transport", 0.15),
            ],
        }
    }

    /// Needs / wants / goal-savings split shown next to the goals list.
    pub fn goals() -> Self {
        Self {
            name: GOALS_PROFILE.into(),
            reserve_ratio: Self::default_reserve_ratio(),
            allocations: vec![
                Allocation::new("Rent/Bills", 0.4),
                Allocation::new("Food/Groceries", 0.2),
                Allocation::new("Transport", 0.1),
                Allocation::new("Wants/Fun", 0.1),
                Allocation::new(GOAL_SAVINGS_LINE, 0.2),
            ],
        }
    }

    pub fn share_of(&self, category: &str) -> Option<f64> {
        self.allocations
            .iter()
            .find(|line| line.category == category)
            .map(|line| line.share)
    }
}

/// Returns the built-in profiles in display order.
pub fn default_profiles() -> Vec<AllocationProfile> {
    vec![AllocationProfile::dashboard(), AllocationProfile::goals()]
}
