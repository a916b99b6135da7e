//! Bill-due reminders relative to the bill's days-until-due.

use serde_json::json;

use flowzi_domain::{Bill, ReminderRules};

use crate::{
    format::MoneyFormatter,
    notify::{NotificationRequest, Trigger},
};

const SECONDS_PER_DAY: i64 = 86_400;

pub struct ReminderService;

impl ReminderService {
    /// Seconds until the reminder `offset` days before the due date. Never below
    /// one and saturating for far-off dates.
    pub fn delay_seconds(days: i64, offset: i64) -> u64 {
        days.saturating_sub(offset)
            .saturating_mul(SECONDS_PER_DAY)
            .max(1) as u64
    }

    /// One request per configured offset the bill is still far enough away for.
    pub fn plan(bill: &Bill, rules: &ReminderRules, formatter: &MoneyFormatter) -> Vec<NotificationRequest> {
        if bill.days <= 0 {
            return Vec::new();
        }

        let amount = formatter.format(bill.amount);
        rules
            .offsets_days
            .iter()
            .copied()
            .filter(|offset| *offset > 0 && bill.days >= *offset)
            .map(|offset| {
                let (title, body) = Self::wording(&bill.name, &amount, offset);
                NotificationRequest::new(
                    title,
                    body,
                    json!({
                        "type": "bill_reminder",
                        "billName": bill.name,
                        "amount": bill.amount,
                        "daysUntilDue": offset,
                    }),
                )
                .with_trigger(Trigger::AfterSeconds(Self::delay_seconds(bill.days, offset)))
            })
            .collect()
    }

    fn wording(name: &str, amount: &str, offset: i64) -> (String, String) {
        match offset {
            7 => (
                "📅 Bill Reminder - 1 Week".into(),
                format!("{} payment of {} is due in 1 week", name, amount),
            ),
            1 => (
                "🚨 Bill Due Tomorrow".into(),
                format!("Don't forget: {} payment of {} is due tomorrow!", name, amount),
            ),
            3 => (
                "⚠️ Bill Reminder - 3 Days".into(),
                format!("{} payment of {} is due in 3 days", name, amount),
            ),
            days => (
                format!("⚠️ Bill Reminder - {} Days", days),
                format!("{} payment of {} is due in {} days", name, amount, days),
            ),
        }
    }
}
