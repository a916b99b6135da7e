//! Savings insights derived from the current month's spending.

use chrono::{Datelike, NaiveDate};
use serde_json::json;

use flowzi_domain::{InsightRules, Transaction};

use crate::{
    format::MoneyFormatter,
    goal_service::{GoalProgress, GoalService},
    notify::{NotificationRequest, Trigger},
};

/// Chooses which of several candidate insights is surfaced.
pub trait InsightPicker: Send + Sync {
    /// Returns an index below `len`. Never called with `len == 0`.
    fn pick(&self, len: usize) -> usize;
}

/// Uniform choice drawn from a fresh v4 uuid.
///
/// A v4 uuid carries 122 random bits from the OS generator. Modulo bias over
/// that range is negligible for a handful of candidates.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPicker;

impl InsightPicker for RandomPicker {
    fn pick(&self, len: usize) -> usize {
        (uuid::Uuid::new_v4().as_u128() % len as u128) as usize
    }
}

/// Always the first candidate.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstPicker;

impl InsightPicker for FirstPicker {
    fn pick(&self, _len: usize) -> usize {
        0
    }
}

pub struct InsightService;

impl InsightService {
    fn same_month(date: NaiveDate, today: NaiveDate) -> bool {
        date.year() == today.year() && date.month() == today.month()
    }

    /// Absolute spend dated in the same calendar month as `today`.
    pub fn month_spent(transactions: &[Transaction], today: NaiveDate) -> f64 {
        transactions
            .iter()
            .filter(|txn| txn.is_expense() && Self::same_month(txn.date, today))
            .map(|txn| txn.amount.abs())
            .sum()
    }

    /// Savings rate as a percentage rounded to one decimal place.
    pub fn savings_rate(monthly_income: f64, spent: f64) -> f64 {
        let rate = (monthly_income - spent) / monthly_income * 100.0;
        (rate * 10.0).round() / 10.0
    }

    /// Every insight that applies right now, in a stable order.
    pub fn generate(
        transactions: &[Transaction],
        progress: &[GoalProgress],
        monthly_income: f64,
        today: NaiveDate,
        rules: &InsightRules,
        formatter: &MoneyFormatter,
    ) -> Vec<String> {
        let mut insights = Vec::new();

        if monthly_income > 0.0 {
            let spent = Self::month_spent(transactions, today);
            let rate = Self::savings_rate(monthly_income, spent);
            if rate > rules.positive_rate {
                insights.push(format!(
                    "Great job! You're saving {:.1}% of your income this month. Consider putting extra towards your goals.",
                    rate
                ));
            }
            if rate < rules.caution_rate {
                insights.push(format!(
                    "Your savings rate is {:.1}% this month. Try to aim for at least 20% to build financial security.",
                    rate
                ));
            }
        }

        if let Some(best) = GoalService::best_goal(progress) {
            if best.progress > rules.goal_highlight {
                insights.push(format!(
                    "Your {} goal is {:.0}% funded. It's your strongest goal right now!",
                    best.goal.name, best.progress
                ));
            }
        }

        if monthly_income > 0.0 {
            let limit = monthly_income * rules.category_share / 100.0;
            let mut by_category: Vec<(String, f64)> = Vec::new();
            for txn in transactions
                .iter()
                .filter(|txn| txn.is_expense() && Self::same_month(txn.date, today))
            {
                match by_category.iter_mut().find(|(name, _)| *name == txn.category) {
                    Some((_, total)) => *total += txn.amount.abs(),
                    None => by_category.push((txn.category.clone(), txn.amount.abs())),
                }
            }
            for (category, spent) in by_category.into_iter().filter(|(_, spent)| *spent > limit) {
                insights.push(format!(
                    "{} took {} this month, over {:.0}% of your income. Look for ways to trim it.",
                    category,
                    formatter.format(spent),
                    rules.category_share
                ));
            }
        }

        insights
    }

    /// Picks at most one insight.
    pub fn choose(insights: Vec<String>, picker: &dyn InsightPicker) -> Option<String> {
        if insights.is_empty() {
            return None;
        }
        let index = picker.pick(insights.len()).min(insights.len() - 1);
        insights.into_iter().nth(index)
    }

    pub fn notification(insight: String, timestamp_ms: i64, rules: &InsightRules) -> NotificationRequest {
        NotificationRequest::new(
            "💡 FLOWZI Insight",
            insight,
            json!({ "type": "insight", "timestamp": timestamp_ms }),
        )
        .with_trigger(Trigger::AfterSeconds(rules.delay_seconds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowzi_domain::{Goal, TransactionType};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 20).unwrap()
    }

    fn expense(category: &str, amount: f64, date: NaiveDate) -> Transaction {
        Transaction::new(category, -amount, date, TransactionType::Miscellaneous)
    }

    #[test]
    fn only_same_year_and_month_count() {
        let last_year = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let txns = vec![expense("Food", 100.0, today()), expense("Food", 900.0, last_year)];
        assert_eq!(InsightService::month_spent(&txns, today()), 100.0);
    }

    #[test]
    fn high_savings_rate_is_praised() {
        let txns = vec![expense("Food", 100.0, today())];
        let insights = InsightService::generate(
            &txns,
            &[],
            1000.0,
            today(),
            &InsightRules::default(),
            &MoneyFormatter::default(),
        );
        assert_eq!(
            insights,
            vec!["Great job! You're saving 90.0% of your income this month. Consider putting extra towards your goals.".to_string()]
        );
    }

    #[test]
    fn low_rate_and_heavy_category_are_flagged() {
        let txns = vec![expense("Rent", 950.0, today())];
        let insights = InsightService::generate(
            &txns,
            &[],
            1000.0,
            today(),
            &InsightRules::default(),
            &MoneyFormatter::default(),
        );
        assert_eq!(insights.len(), 2);
        assert!(insights[0].starts_with("Your savings rate is 5.0% this month."));
        assert!(insights[1].starts_with("Rent took $950.00 this month"));
    }

    #[test]
    fn zero_income_skips_rate_insights() {
        let txns = vec![expense("Rent", 950.0, today())];
        let insights = InsightService::generate(
            &txns,
            &[],
            0.0,
            today(),
            &InsightRules::default(),
            &MoneyFormatter::default(),
        );
        assert!(insights.is_empty());
    }

    #[test]
    fn strong_goal_is_highlighted() {
        let goal = Goal::new("Bike", 100.0, 1);
        let deposit = Transaction::new("Bike", 90.0, today(), TransactionType::Miscellaneous);
        let progress = GoalService::evaluate_all(&[goal], &[deposit]);
        let insights = InsightService::generate(
            &[],
            &progress,
            0.0,
            today(),
            &InsightRules::default(),
            &MoneyFormatter::default(),
        );
        assert_eq!(
            insights,
            vec!["Your Bike goal is 90% funded. It's your strongest goal right now!".to_string()]
        );
    }

    #[test]
    fn choose_returns_at_most_one() {
        assert_eq!(InsightService::choose(Vec::new(), &RandomPicker), None);
        let picked = InsightService::choose(vec!["a".into(), "b".into()], &FirstPicker);
        assert_eq!(picked.as_deref(), Some("a"));
        let random = InsightService::choose(vec!["a".into(), "b".into()], &RandomPicker);
        assert!(random.is_some());
    }

    #[test]
    fn random_picks_stay_in_range() {
        for len in 1..=5 {
            assert!((0..50).all(|_| RandomPicker.pick(len) < len));
        }
    }

    #[test]
    fn insight_notification_waits_a_minute() {
        let request = InsightService::notification("hi".into(), 42, &InsightRules::default());
        assert_eq!(request.trigger, Trigger::AfterSeconds(60));
        assert_eq!(request.data["type"], "insight");
    }
}
