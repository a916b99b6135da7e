//! At-most-once milestone notifications backed by a durable flag store.
//!
//! For every goal the thresholds are walked in ascending order. A threshold
//! fires when progress has reached it and its flag is absent; the notification
//! and celebration go out first, then the flag is written. Failures are logged
//! per threshold and never abort the pass.

use std::sync::Arc;

use serde::Serialize;
use serde_json::json;

use flowzi_domain::{Goal, Milestone, Transaction};

use crate::{
    format::MoneyFormatter,
    goal_service::GoalService,
    notify::{CelebrationPrompt, NotificationRequest, Notifier},
    storage::FlagStore,
    CoreError,
};

/// Records a milestone that fired during a pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MilestoneEvent {
    pub goal_id: String,
    pub goal_name: String,
    pub milestone: Milestone,
    pub progress: f64,
}

pub struct MilestoneTracker {
    flags: Arc<dyn FlagStore>,
    user_scope: Option<String>,
}

impl MilestoneTracker {
    pub fn new(flags: Arc<dyn FlagStore>) -> Self {
        Self {
            flags,
            user_scope: None,
        }
    }

    /// Prefixes every flag key with `user_id`.
    pub fn scoped_to(mut self, user_id: impl Into<String>) -> Self {
        self.user_scope = Some(user_id.into());
        self
    }

    pub fn key(&self, goal_id: &str, milestone: Milestone) -> String {
        match &self.user_scope {
            Some(user) => format!("milestone_{}_{}_{}", user, goal_id, milestone.percent()),
            None => format!("milestone_{}_{}", goal_id, milestone.percent()),
        }
    }

    pub fn is_recorded(&self, goal_id: &str, milestone: Milestone) -> Result<bool, CoreError> {
        Ok(self.flags.get(&self.key(goal_id, milestone))?.is_some())
    }

    /// Runs one pass over all goals and returns the milestones that fired.
    pub fn check(
        &self,
        goals: &[Goal],
        transactions: &[Transaction],
        notifier: &dyn Notifier,
        formatter: &MoneyFormatter,
    ) -> Vec<MilestoneEvent> {
        if goals.is_empty() || transactions.is_empty() {
            return Vec::new();
        }

        let mut fired = Vec::new();
        for goal in goals {
            let progress = GoalService::progress(goal, transactions);
            for milestone in Milestone::ALL {
                if !milestone.is_reached(progress) {
                    continue;
                }
                match self.fire(goal, milestone, progress, notifier, formatter) {
                    Ok(true) => fired.push(MilestoneEvent {
                        goal_id: goal.id.clone(),
                        goal_name: goal.name.clone(),
                        milestone,
                        progress,
                    }),
                    Ok(false) => {}
                    Err(err) => {
                        tracing::warn!(goal = %goal.id, %milestone, error = %err, "milestone check failed");
                    }
                }
            }
        }
        fired
    }

    fn fire(
        &self,
        goal: &Goal,
        milestone: Milestone,
        progress: f64,
        notifier: &dyn Notifier,
        formatter: &MoneyFormatter,
    ) -> Result<bool, CoreError> {
        let key = self.key(&goal.id, milestone);
        if self.flags.get(&key)?.is_some() {
            return Ok(false);
        }

        let request = milestone_notification(goal, milestone, progress, formatter);
        if let Err(err) = notifier.schedule_local(request) {
            tracing::warn!(goal = %goal.id, %milestone, error = %err, "failed to send milestone notification");
        }
        if let Err(err) = notifier.celebrate(celebration(goal, milestone)) {
            tracing::warn!(goal = %goal.id, %milestone, error = %err, "failed to show milestone celebration");
        }

        self.flags.set(&key, "true")?;
        tracing::info!(goal = %goal.name, %milestone, "milestone recorded");
        Ok(true)
    }
}

pub fn milestone_notification(
    goal: &Goal,
    milestone: Milestone,
    progress: f64,
    formatter: &MoneyFormatter,
) -> NotificationRequest {
    let (title, body) = match milestone {
        Milestone::Quarter => (
            "🎯 Quarter Way There!",
            format!(
                "You've reached 25% of your {} goal! Keep up the great work!",
                goal.name
            ),
        ),
        Milestone::Half => (
            "🎉 Halfway Milestone!",
            format!(
                "Amazing! You're 50% towards your {} goal of {}!",
                goal.name,
                formatter.format(goal.target_amount)
            ),
        ),
        Milestone::ThreeQuarters => (
            "🚀 Three-Quarters Done!",
            format!(
                "You're 75% of the way to your {} goal! The finish line is in sight!",
                goal.name
            ),
        ),
        Milestone::Almost => (
            "🔥 Almost There!",
            format!(
                "90% complete! Your {} goal is within reach - just {} to go!",
                goal.name,
                formatter.format(goal.target_amount * 0.1)
            ),
        ),
        Milestone::Complete => (
            "🏆 Goal Achieved!",
            format!(
                "Congratulations! You've reached your {} goal of {}! 🎊",
                goal.name,
                formatter.format(goal.target_amount)
            ),
        ),
    };

    NotificationRequest::new(
        title,
        body,
        json!({
            "type": "milestone",
            "goalId": goal.id,
            "goalName": goal.name,
            "milestone": milestone.percent(),
            "actualProgress": format!("{:.1}", progress),
        }),
    )
}

pub fn celebration(goal: &Goal, milestone: Milestone) -> CelebrationPrompt {
    let headline = match milestone {
        Milestone::Quarter => "🎯 Quarter milestone reached!",
        Milestone::Half => "🎉 Halfway there!",
        Milestone::ThreeQuarters => "🚀 Three-quarters complete!",
        Milestone::Almost => "🔥 Almost done!",
        Milestone::Complete => "🏆 Goal achieved! Congratulations! 🎊",
    };
    CelebrationPrompt {
        title: "Milestone Achieved!".into(),
        message: format!("{}\n\n{}: {}% complete", headline, goal.name, milestone.percent()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use chrono::NaiveDate;
    use flowzi_domain::TransactionType;

    #[derive(Default)]
    struct MapFlags(Mutex<HashMap<String, String>>);

    impl FlagStore for MapFlags {
        fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
            Ok(self.0.lock().unwrap().get(key).cloned())
        }

        fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
            self.0.lock().unwrap().insert(key.into(), value.into());
            Ok(())
        }
    }

    #[derive(Default)]
    struct Recording(Mutex<Vec<NotificationRequest>>);

    impl Notifier for Recording {
        fn initialize(&self) -> Result<bool, CoreError> {
            Ok(true)
        }

        fn schedule_local(&self, request: NotificationRequest) -> Result<Option<String>, CoreError> {
            self.0.lock().unwrap().push(request);
            Ok(Some("n".into()))
        }

        fn cancel(&self, _id: &str) -> Result<(), CoreError> {
            Ok(())
        }

        fn cancel_all(&self) -> Result<(), CoreError> {
            Ok(())
        }
    }

    fn deposit(category: &str, amount: f64) -> Transaction {
        let date = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        Transaction::new(category, amount, date, TransactionType::Miscellaneous)
    }

    #[test]
    fn quarter_fires_once_across_passes() {
        let tracker = MilestoneTracker::new(Arc::new(MapFlags::default()));
        let notifier = Recording::default();
        let goals = vec![Goal::new("Trip", 500.0, 5).with_id("g1")];
        let txns = vec![deposit("Trip", 125.0)];
        let formatter = MoneyFormatter::default();

        let first = tracker.check(&goals, &txns, &notifier, &formatter);
        let second = tracker.check(&goals, &txns, &notifier, &formatter);

        assert_eq!(first.len(), 1);
        assert_eq!(first[0].milestone, Milestone::Quarter);
        assert!(second.is_empty());

        let sent = notifier.0.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].title, "🎯 Quarter Way There!");
        assert_eq!(sent[0].data["actualProgress"], "25.0");
        assert!(tracker.is_recorded("g1", Milestone::Quarter).unwrap());
    }

    #[test]
    fn scoped_keys_include_user() {
        let tracker = MilestoneTracker::new(Arc::new(MapFlags::default())).scoped_to("u1");
        assert_eq!(tracker.key("g1", Milestone::Half), "milestone_u1_g1_50");
        let plain = MilestoneTracker::new(Arc::new(MapFlags::default()));
        assert_eq!(plain.key("g1", Milestone::Complete), "milestone_g1_100");
    }

    #[test]
    fn empty_inputs_skip_the_pass() {
        let tracker = MilestoneTracker::new(Arc::new(MapFlags::default()));
        let notifier = Recording::default();
        let goals = vec![Goal::new("Trip", 1.0, 1).with_id("g1")];
        assert!(tracker
            .check(&goals, &[], &notifier, &MoneyFormatter::default())
            .is_empty());
        assert!(notifier.0.lock().unwrap().is_empty());
    }

    #[test]
    fn almost_there_mentions_last_tenth() {
        let goal = Goal::new("Car", 1000.0, 10).with_id("c");
        let request =
            milestone_notification(&goal, Milestone::Almost, 91.0, &MoneyFormatter::default());
        assert_eq!(
            request.body,
            "90% complete! Your Car goal is within reach - just $100.00 to go!"
        );
        assert_eq!(
            celebration(&goal, Milestone::Almost).message,
            "🔥 Almost done!\n\nCar: 90% complete"
        );
    }
}
