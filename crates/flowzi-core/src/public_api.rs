//! Stable, public-facing helpers that wrap the internal service layer.
//!
//! Every view (dashboard, goals, reports, CLI) reads the same
//! [`FinancialOverview`], so the aggregation runs in exactly one place.

use serde::Serialize;

use flowzi_domain::{
    AllocationProfile, Bill, Goal, Transaction, UserSettings, GOAL_SAVINGS_LINE,
};

use crate::{
    budget_service::{BudgetPlan, BudgetService, SavingsOpportunity},
    format::{CurrencyPreferences, MoneyFormatter},
    goal_service::{GoalProgress, GoalService},
    summary_service::{FinancialSummary, SummaryService},
};

/// Snapshot inputs for one recompute. Collections still loading are empty.
#[derive(Debug, Clone, Default)]
pub struct OverviewInputs<'a> {
    pub transactions: &'a [Transaction],
    pub goals: &'a [Goal],
    pub bills: &'a [Bill],
    pub settings: Option<&'a UserSettings>,
    pub profiles: &'a [AllocationProfile],
}

/// Everything derived from one set of snapshots.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialOverview {
    pub summary: FinancialSummary,
    pub goals: Vec<GoalProgress>,
    pub budgets: Vec<BudgetPlan>,
    pub savings_opportunity: Option<SavingsOpportunity>,
    pub remaining_after_goals: f64,
    pub achievement_badge: Option<String>,
    pub upcoming_bills: Vec<Bill>,
    pub preferences: CurrencyPreferences,
}

impl FinancialOverview {
    pub fn budget(&self, profile: &str) -> Option<&BudgetPlan> {
        self.budgets.iter().find(|plan| plan.profile == profile)
    }

    pub fn savings_message(&self, formatter: &MoneyFormatter) -> String {
        self.savings_opportunity
            .as_ref()
            .map(|opportunity| opportunity.message(formatter))
            .unwrap_or_else(|| crate::budget_service::NO_SAVINGS_MESSAGE.to_string())
    }
}

impl Default for FinancialOverview {
    fn default() -> Self {
        financial_overview(&OverviewInputs::default())
    }
}

/// Recomputes every derived view from scratch.
pub fn financial_overview(inputs: &OverviewInputs<'_>) -> FinancialOverview {
    let defaults = UserSettings::default();
    let settings = inputs.settings.unwrap_or(&defaults);
    let monthly_income = settings.monthly_income;

    let summary = SummaryService::aggregate(inputs.transactions, monthly_income);
    let goals = GoalService::evaluate_all(inputs.goals, inputs.transactions);
    let budgets: Vec<BudgetPlan> = inputs
        .profiles
        .iter()
        .map(|profile| BudgetService::plan(profile, monthly_income, &summary))
        .collect();

    let savings_opportunity = budgets
        .first()
        .and_then(|plan| BudgetService::savings_opportunity(plan, inputs.goals));

    let goal_savings = budgets
        .iter()
        .find_map(|plan| plan.line(GOAL_SAVINGS_LINE))
        .map(|line| line.budgeted)
        .unwrap_or(0.0);

    let mut upcoming_bills = inputs.bills.to_vec();
    upcoming_bills.sort_by_key(|bill| bill.days);

    FinancialOverview {
        remaining_after_goals: GoalService::remaining_after_goals(goal_savings, inputs.goals),
        achievement_badge: GoalService::achievement_badge(&goals),
        summary,
        goals,
        budgets,
        savings_opportunity,
        upcoming_bills,
        preferences: CurrencyPreferences::from(settings),
    }
}
