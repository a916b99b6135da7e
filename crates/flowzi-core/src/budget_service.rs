//! Budget planner: applies an allocation profile to monthly income and compares
//! each line with actual spend.

use std::fmt;

use serde::Serialize;

use flowzi_domain::{AllocationProfile, Goal};

use crate::{format::MoneyFormatter, summary_service::FinancialSummary};

pub const NO_SAVINGS_MESSAGE: &str = "No savings opportunities available.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BudgetStatus {
    OnTrack,
    Warning,
    OverBudget,
}

impl BudgetStatus {
    /// Above 100 is over budget, above 80 a warning.
    pub fn from_percentage(spent_percentage: f64) -> Self {
        if spent_percentage > 100.0 {
            BudgetStatus::OverBudget
        } else if spent_percentage > 80.0 {
            BudgetStatus::Warning
        } else {
            BudgetStatus::OnTrack
        }
    }
}

impl fmt::Display for BudgetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BudgetStatus::OnTrack => "on track",
            BudgetStatus::Warning => "warning",
            BudgetStatus::OverBudget => "over budget",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetLine {
    pub category: String,
    pub share: f64,
    pub budgeted: f64,
    pub spent: f64,
    pub spent_percentage: f64,
    pub status: BudgetStatus,
}

impl BudgetLine {
    pub fn remaining(&self) -> f64 {
        self.budgeted - self.spent
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetPlan {
    pub profile: String,
    pub monthly_income: f64,
    /// Income held back before allocation.
    pub mandatory_savings: f64,
    pub total_budget: f64,
    pub lines: Vec<BudgetLine>,
    pub total_spent: f64,
    pub total_remaining: f64,
}

impl BudgetPlan {
    pub fn line(&self, category: &str) -> Option<&BudgetLine> {
        self.lines.iter().find(|line| line.category == category)
    }
}

/// Under-spent slack that could be redirected to a goal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavingsOpportunity {
    pub category: String,
    pub spent: f64,
    pub budgeted: f64,
    pub savings: f64,
    pub goal_name: String,
}

impl SavingsOpportunity {
    pub fn message(&self, formatter: &MoneyFormatter) -> String {
        format!(
            "You've only spent {} on {} vs. {} budgeted — transfer {} to your {} goal?",
            formatter.format(self.spent),
            self.category,
            formatter.format(self.budgeted),
            formatter.format(self.savings),
            self.goal_name
        )
    }
}

pub struct BudgetService;

impl BudgetService {
    /// Percentage of the budget consumed. An empty budget with no spend is 0%.
    pub fn spent_percentage(spent: f64, budgeted: f64) -> f64 {
        if budgeted == 0.0 && spent == 0.0 {
            0.0
        } else {
            spent / budgeted * 100.0
        }
    }

    pub fn plan(
        profile: &AllocationProfile,
        monthly_income: f64,
        summary: &FinancialSummary,
    ) -> BudgetPlan {
        let mandatory_savings = monthly_income * profile.reserve_ratio;
        let total_budget = monthly_income * (1.0 - profile.reserve_ratio);

        let lines: Vec<BudgetLine> = profile
            .allocations
            .iter()
            .map(|allocation| {
                let budgeted = total_budget * allocation.share;
                let spent = summary.spent_on(&allocation.category);
                let spent_percentage = Self::spent_percentage(spent, budgeted);
                BudgetLine {
                    category: allocation.category.clone(),
                    share: allocation.share,
                    budgeted,
                    spent,
                    spent_percentage,
                    status: BudgetStatus::from_percentage(spent_percentage),
                }
            })
            .collect();

        let total_spent: f64 = lines.iter().map(|line| line.spent).sum();
        BudgetPlan {
            profile: profile.name.clone(),
            monthly_income,
            mandatory_savings,
            total_budget,
            total_spent,
            total_remaining: total_budget - total_spent,
            lines,
        }
    }

    /// First line in table order with slack, paired with the first goal.
    pub fn savings_opportunity(plan: &BudgetPlan, goals: &[Goal]) -> Option<SavingsOpportunity> {
        let goal = goals.first()?;
        plan.lines
            .iter()
            .find(|line| line.spent < line.budgeted && line.remaining() > 0.0)
            .map(|line| SavingsOpportunity {
                category: line.category.clone(),
                spent: line.spent,
                budgeted: line.budgeted,
                savings: line.remaining(),
                goal_name: goal.name.clone(),
            })
    }

    pub fn savings_message(
        plan: &BudgetPlan,
        goals: &[Goal],
        formatter: &MoneyFormatter,
    ) -> String {
        Self::savings_opportunity(plan, goals)
            .map(|opportunity| opportunity.message(formatter))
            .unwrap_or_else(|| NO_SAVINGS_MESSAGE.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn summary_with(spend: &[(&str, f64)]) -> FinancialSummary {
        let expenses_by_category: BTreeMap<String, f64> = spend
            .iter()
            .map(|(category, amount)| (category.to_string(), *amount))
            .collect();
        FinancialSummary {
            expenses_by_category,
            ..FinancialSummary::default()
        }
    }

    #[test]
    fn status_tiers() {
        assert_eq!(
            BudgetStatus::from_percentage(BudgetService::spent_percentage(85.0, 100.0)),
            BudgetStatus::Warning
        );
        assert_eq!(
            BudgetStatus::from_percentage(BudgetService::spent_percentage(105.0, 100.0)),
            BudgetStatus::OverBudget
        );
        assert_eq!(
            BudgetStatus::from_percentage(BudgetService::spent_percentage(50.0, 100.0)),
            BudgetStatus::OnTrack
        );
        assert_eq!(BudgetStatus::from_percentage(80.0), BudgetStatus::OnTrack);
        assert_eq!(BudgetStatus::from_percentage(100.0), BudgetStatus::Warning);
    }

    #[test]
    fn zero_budget_edge_cases() {
        assert_eq!(BudgetService::spent_percentage(0.0, 0.0), 0.0);
        let over = BudgetService::spent_percentage(10.0, 0.0);
        assert!(over.is_infinite());
        assert_eq!(BudgetStatus::from_percentage(over), BudgetStatus::OverBudget);
    }

    #[test]
    fn dashboard_plan_allocates_after_reserve() {
        let summary = summary_with(&[("Rent", 1300.0), ("Food", 100.0)]);
        let plan = BudgetService::plan(&AllocationProfile::dashboard(), 5000.0, &summary);

        assert_eq!(plan.total_budget, 4000.0);
        assert_eq!(plan.mandatory_savings, 1000.0);
        let rent = plan.line("Rent").unwrap();
        assert_eq!(rent.budgeted, 1600.0);
        assert_eq!(rent.status, BudgetStatus::Warning);
        assert_eq!(plan.total_spent, 1400.0);
        assert_eq!(plan.total_remaining, 2600.0);
    }

    #[test]
    fn savings_opportunity_is_first_match_and_needs_a_goal() {
        let summary = summary_with(&[("Rent", 2000.0), ("Food", 100.0)]);
        let plan = BudgetService::plan(&AllocationProfile::dashboard(), 5000.0, &summary);
        let goals = vec![Goal::new("Trip", 500.0, 5), Goal::new("Car", 9000.0, 24)];

        let found = BudgetService::savings_opportunity(&plan, &goals).unwrap();
        assert_eq!(found.category, "Food");
        assert_eq!(found.savings, 700.0);
        assert_eq!(found.goal_name, "Trip");
        assert_eq!(
            found.message(&MoneyFormatter::default()),
            "You've only spent $100.00 on Food vs. $800.00 budgeted — transfer $700.00 to your Trip goal?"
        );

        assert_eq!(
            BudgetService::savings_message(&plan, &[], &MoneyFormatter::default()),
            NO_SAVINGS_MESSAGE
        );
    }
}
