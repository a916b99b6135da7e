use serde::{Deserialize, Serialize};

/// A recurring payment tracked for reminders.
///
/// `days` is the days-until-due captured when the bill was entered; it is a
/// snapshot and does not count down on its own.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bill {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub amount: f64,
    pub days: i64,
}

impl Bill {
    pub fn new(name: impl Into<String>, amount: f64, days: i64) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            amount,
            days,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }
}
