use chrono::NaiveDate;

use crate::{
    budget_service::BudgetStatus,
    format::{format_amount, CurrencyPreferences, MoneyFormatter},
    goal_service::GoalService,
    public_api::{financial_overview, FinancialOverview, OverviewInputs},
    summary_service::SummaryService,
};
use flowzi_domain::{
    default_profiles, Bill, CurrencyTable, Goal, SymbolPosition, Transaction, TransactionType,
    UserSettings, DASHBOARD_PROFILE, GOALS_PROFILE,
};

fn on(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 4, day).unwrap()
}

fn txn(category: &str, amount: f64, kind: TransactionType) -> Transaction {
    Transaction::new(category, amount, on(1), kind)
}

#[test]
fn formatted_amount_parses_back_for_every_currency() {
    let table = CurrencyTable::default();
    for base in [0.01, 1.0, 13.418478, 250.5, 99_999.99] {
        for code in table.codes() {
            let display = crate::format::convert(&table, base, code);
            let rendered = format_amount(&table, display, code, true, SymbolPosition::After);
            let number: f64 = rendered
                .trim_end_matches(table.symbol(code))
                .parse()
                .expect("numeric body");
            assert!(
                (number - display).abs() <= 0.005 + 1e-9,
                "{} {} rendered as {}",
                base,
                code,
                rendered
            );
        }
    }
}

#[test]
fn income_and_expense_partitions_add_up() {
    let txns = vec![
        txn("Salary", 3000.0, TransactionType::Miscellaneous),
        txn("Etsy", 120.0, TransactionType::SideIncome),
        txn("Rent", -1200.0, TransactionType::RegularExpense),
        txn("Cinema", -30.0, TransactionType::Miscellaneous),
        txn("Refund", 0.0, TransactionType::RegularExpense),
    ];
    let summary = SummaryService::aggregate(&txns, 0.0);

    assert_eq!(summary.total_income, summary.primary_income + summary.side_income);
    assert_eq!(
        summary.total_expenses,
        summary.regular_expenses + summary.miscellaneous_expenses
    );
    let by_category: f64 = summary.expenses_by_category.values().sum();
    assert_eq!(by_category, summary.total_expenses);
}

#[test]
fn progress_never_drops_when_deposits_are_added() {
    let goal = Goal::new("House", 20_000.0, 36);
    let mut txns = Vec::new();
    let mut last = GoalService::progress(&goal, &txns);
    for amount in [0.0, 150.0, 1000.0, 0.5, 7000.0] {
        txns.push(txn("House", amount, TransactionType::Miscellaneous));
        let next = GoalService::progress(&goal, &txns);
        assert!(next >= last || last.is_nan());
        last = next;
    }
}

#[test]
fn empty_state_overview_is_all_zero() {
    let profiles = default_profiles();
    let overview = financial_overview(&OverviewInputs {
        profiles: &profiles,
        ..OverviewInputs::default()
    });

    assert_eq!(overview.summary.total_balance, 0.0);
    assert!(overview.goals.is_empty());
    assert_eq!(overview.savings_opportunity, None);
    assert_eq!(overview.achievement_badge, None);
    for plan in &overview.budgets {
        assert_eq!(plan.total_budget, 0.0);
        assert!(plan
            .lines
            .iter()
            .all(|line| line.status == BudgetStatus::OnTrack));
    }
    assert_eq!(
        overview.savings_message(&MoneyFormatter::default()),
        "No savings opportunities available."
    );
    assert_eq!(FinancialOverview::default().preferences, CurrencyPreferences::default());
}

#[test]
fn overview_combines_settings_goals_and_budgets() {
    let settings = UserSettings {
        monthly_income: 5000.0,
        ..UserSettings::default()
    };
    let txns = vec![
        txn("Salary", 2000.0, TransactionType::Miscellaneous),
        txn("Rent", -1500.0, TransactionType::RegularExpense),
        txn("Trip", 450.0, TransactionType::Miscellaneous),
    ];
    let goals = vec![Goal::new("Trip", 500.0, 5).with_id("g1")];
    let bills = vec![Bill::new("Phone", 40.0, 12), Bill::new("Water", 25.0, 2)];
    let profiles = default_profiles();

    let overview = financial_overview(&OverviewInputs {
        transactions: &txns,
        goals: &goals,
        bills: &bills,
        settings: Some(&settings),
        profiles: &profiles,
    });

    assert_eq!(overview.summary.combined_income(), 7450.0);
    assert_eq!(overview.summary.total_balance, 5950.0);
    assert_eq!(overview.goals[0].progress, 90.0);
    assert_eq!(
        overview.achievement_badge.as_deref(),
        Some("🔥 Trip 85% Funded! Keep going, you're almost there.")
    );

    let dashboard = overview.budget(DASHBOARD_PROFILE).unwrap();
    assert_eq!(dashboard.line("Rent").unwrap().status, BudgetStatus::Warning);
    let opportunity = overview.savings_opportunity.as_ref().unwrap();
    assert_eq!(opportunity.category, "Rent");
    assert_eq!(opportunity.savings, 100.0);

    let goals_plan = overview.budget(GOALS_PROFILE).unwrap();
    assert_eq!(goals_plan.line("Saving for Goals").unwrap().budgeted, 800.0);
    assert_eq!(overview.remaining_after_goals, 700.0);
    assert_eq!(overview.upcoming_bills[0].name, "Water");
}
