//! Goal progress engine and the goal write path.
//!
//! Progress is derived on every pass from the full transaction list: the sum of
//! non-negative transactions whose category equals the goal's category,
//! divided by the target. A zero target yields an infinite or NaN percentage;
//! only [`GoalProgress::display_width`] clamps.

use std::fmt;

use serde::Serialize;
use serde_json::json;

use flowzi_domain::{collections, Goal, Transaction};

use crate::{
    format::MoneyFormatter,
    notify::NotificationRequest,
    storage::{to_document, DocumentStore},
    time::Clock,
    CoreError,
};

/// Threshold for the dashboard achievement badge.
pub const BADGE_PROGRESS: f64 = 85.0;

/// How actual progress compares to a uniform monthly pace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GoalPace {
    Ahead,
    Slipping,
    Behind,
}

impl GoalPace {
    /// `ratio` is actual progress over expected progress.
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio >= 1.0 {
            GoalPace::Ahead
        } else if ratio >= 0.8 {
            GoalPace::Slipping
        } else {
            GoalPace::Behind
        }
    }
}

impl fmt::Display for GoalPace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GoalPace::Ahead => "ahead",
            GoalPace::Slipping => "slipping",
            GoalPace::Behind => "behind",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalProgress {
    pub goal: Goal,
    pub saved: f64,
    /// Percentage, unclamped.
    pub progress: f64,
    pub monthly_target: f64,
    pub weekly_target: f64,
    /// Progress relative to one month of uniform pace, capped at 100. Stays
    /// NaN when progress is undefined.
    pub velocity: f64,
    pub pace: GoalPace,
}

impl GoalProgress {
    /// Progress clamped into `[0, 100]` for bar rendering. NaN renders empty.
    pub fn display_width(&self) -> f64 {
        if self.progress.is_nan() {
            0.0
        } else {
            self.progress.clamp(0.0, 100.0)
        }
    }
}

/// Validated input for creating or editing a goal. `target_amount` is in
/// display units.
#[derive(Debug, Clone, PartialEq)]
pub struct NewGoal {
    pub name: String,
    pub target_amount: f64,
    pub timeframe: u32,
}

impl NewGoal {
    pub fn new(name: impl Into<String>, target_amount: f64, timeframe: u32) -> Self {
        Self {
            name: name.into(),
            target_amount,
            timeframe,
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.name.trim().is_empty() {
            return Err(CoreError::Validation("Goal name is required.".into()));
        }
        if !(self.target_amount.is_finite() && self.target_amount > 0.0) {
            return Err(CoreError::Validation(
                "Goal cost must be a positive number.".into(),
            ));
        }
        if self.timeframe == 0 {
            return Err(CoreError::Validation(
                "Timeframe must be at least one month.".into(),
            ));
        }
        Ok(())
    }
}

pub struct GoalService;

impl GoalService {
    pub fn saved(goal: &Goal, transactions: &[Transaction]) -> f64 {
        transactions
            .iter()
            .filter(|txn| txn.category == goal.category && txn.is_income())
            .map(|txn| txn.amount)
            .sum()
    }

    pub fn progress(goal: &Goal, transactions: &[Transaction]) -> f64 {
        Self::saved(goal, transactions) / goal.target_amount * 100.0
    }

    /// Percentage expected after one month at uniform pace.
    pub fn expected_progress(goal: &Goal) -> f64 {
        (1.0 / goal.timeframe as f64) * 100.0
    }

    pub fn evaluate(goal: &Goal, transactions: &[Transaction]) -> GoalProgress {
        let saved = Self::saved(goal, transactions);
        let progress = saved / goal.target_amount * 100.0;
        let monthly_target = goal.target_amount / goal.timeframe as f64;
        let ratio = progress / Self::expected_progress(goal);
        // f64::min would turn NaN into the cap.
        let velocity = if ratio.is_nan() {
            f64::NAN
        } else {
            (ratio * 100.0).min(100.0)
        };
        GoalProgress {
            goal: goal.clone(),
            saved,
            progress,
            monthly_target,
            weekly_target: monthly_target / 4.0,
            velocity,
            pace: GoalPace::from_ratio(ratio),
        }
    }

    pub fn evaluate_all(goals: &[Goal], transactions: &[Transaction]) -> Vec<GoalProgress> {
        goals
            .iter()
            .map(|goal| Self::evaluate(goal, transactions))
            .collect()
    }

    /// Goal-savings allocation left after every goal's monthly target.
    pub fn remaining_after_goals(goal_savings: f64, goals: &[Goal]) -> f64 {
        let committed: f64 = goals
            .iter()
            .map(|goal| goal.target_amount / goal.timeframe as f64)
            .map(|target| if target.is_nan() { 0.0 } else { target })
            .sum();
        goal_savings - committed
    }

    /// Highest finite progress; the first goal wins ties.
    pub fn best_goal(progress: &[GoalProgress]) -> Option<&GoalProgress> {
        progress
            .iter()
            .filter(|entry| entry.progress.is_finite())
            .fold(None, |best: Option<&GoalProgress>, entry| match best {
                Some(current) if current.progress >= entry.progress => Some(current),
                _ => Some(entry),
            })
    }

    pub fn achievement_badge(progress: &[GoalProgress]) -> Option<String> {
        progress
            .iter()
            .find(|entry| entry.progress >= BADGE_PROGRESS)
            .map(|entry| {
                format!(
                    "🔥 {} 85% Funded! Keep going, you're almost there.",
                    entry.goal.name
                )
            })
    }

    /// Stores a new goal. The category mirrors the name and the target is normalized.
    pub fn create(
        store: &dyn DocumentStore,
        input: &NewGoal,
        formatter: &MoneyFormatter,
        clock: &dyn Clock,
    ) -> Result<Goal, CoreError> {
        input.validate()?;
        let mut goal = Goal::new(
            input.name.trim(),
            formatter.normalize(input.target_amount),
            input.timeframe,
        );
        goal.created_at = Some(clock.now());
        let mut fields = to_document(&goal)?;
        fields.remove("id");
        let id = store
            .add_document(collections::GOALS, fields)
            .inspect_err(|err| tracing::error!(error = %err, "failed to add goal"))?;
        tracing::info!(goal = %goal.name, id = %id, "goal created");
        Ok(goal.with_id(id))
    }

    /// Rewrites name, category, target and timeframe; `createdAt` is kept.
    pub fn update(
        store: &dyn DocumentStore,
        id: &str,
        input: &NewGoal,
        formatter: &MoneyFormatter,
    ) -> Result<Goal, CoreError> {
        input.validate()?;
        let goal = Goal::new(
            input.name.trim(),
            formatter.normalize(input.target_amount),
            input.timeframe,
        )
        .with_id(id);
        let mut fields = to_document(&goal)?;
        fields.remove("id");
        store
            .write_merge(collections::GOALS, id, fields)
            .inspect_err(|err| tracing::error!(error = %err, id, "failed to update goal"))?;
        tracing::info!(goal = %goal.name, id, "goal updated");
        Ok(goal)
    }

    pub fn delete(store: &dyn DocumentStore, id: &str) -> Result<(), CoreError> {
        store
            .delete_document(collections::GOALS, id)
            .inspect_err(|err| tracing::error!(error = %err, id, "failed to delete goal"))?;
        tracing::info!(id, "goal deleted");
        Ok(())
    }

    pub fn created_notification(goal: &Goal, formatter: &MoneyFormatter) -> NotificationRequest {
        NotificationRequest::new(
            "🎯 New Goal Created!",
            format!(
                "Your {} goal of {} has been set. Time to start saving!",
                goal.name,
                formatter.format(goal.target_amount)
            ),
            json!({
                "type": "goal_created",
                "goalName": goal.name,
                "targetAmount": goal.target_amount,
            }),
        )
    }

    pub fn updated_notification(goal: &Goal) -> NotificationRequest {
        NotificationRequest::new(
            "✏️ Goal Updated!",
            format!("Your {} goal has been updated successfully.", goal.name),
            json!({
                "type": "goal_updated",
                "goalName": goal.name,
                "targetAmount": goal.target_amount,
            }),
        )
    }

    pub fn deleted_notification(name: &str) -> NotificationRequest {
        NotificationRequest::new(
            "🗑️ Goal Deleted",
            format!("Your {} goal has been removed from your list.", name),
            json!({ "type": "goal_deleted", "goalName": name }),
        )
    }
}
