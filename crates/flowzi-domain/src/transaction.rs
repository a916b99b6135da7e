//! Domain models for income and expense transactions.

use std::fmt;

use chrono::NaiveDate;
use serde::{de::Deserializer, Deserialize, Serialize, Serializer};

/// A single income or expense record, stored in base-unit (USD) amounts.
///
/// The sign of `amount` decides whether the record counts as income; `kind` and
/// `transaction_type` are classification tags that travel with it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(default)]
    pub id: String,
    pub category: String,
    pub amount: f64,
    pub date: NaiveDate,
    #[serde(default)]
    pub note: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[serde(default)]
    pub transaction_type: TransactionType,
}

impl Transaction {
    pub fn new(
        category: impl Into<String>,
        amount: f64,
        date: NaiveDate,
        transaction_type: TransactionType,
    ) -> Self {
        Self {
            id: String::new(),
            category: category.into(),
            amount,
            date,
            note: String::new(),
            kind: TransactionKind::for_amount(amount),
            transaction_type,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    /// Income is any non-negative amount, regardless of the stored tag.
    pub fn is_income(&self) -> bool {
        self.amount >= 0.0
    }

    pub fn is_expense(&self) -> bool {
        !self.is_income()
    }

    /// Returns `true` when the `kind` tag agrees with the amount sign.
    pub fn is_consistent(&self) -> bool {
        self.is_income() == (self.kind == TransactionKind::Income)
    }
}

/// Top-level income/expense tag stored as `type`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum TransactionKind {
    #[default]
    Income,
    Expense,
}

impl TransactionKind {
    pub fn for_amount(amount: f64) -> Self {
        if amount >= 0.0 {
            TransactionKind::Income
        } else {
            TransactionKind::Expense
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionKind::Income => "Income",
            TransactionKind::Expense => "Expense",
        };
        f.write_str(label)
    }
}

/// Sub-classification stored as `transactionType`.
///
/// Unknown labels decode as [`TransactionType::Miscellaneous`], which is how the
/// aggregation treats anything that is neither side income nor a regular expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransactionType {
    SideIncome,
    RegularExpense,
    #[default]
    Miscellaneous,
}

impl TransactionType {
    pub fn label(self) -> &'static str {
        match self {
            TransactionType::SideIncome => "Side Income",
            TransactionType::RegularExpense => "Regular Expense",
            TransactionType::Miscellaneous => "Miscellaneous",
        }
    }

    pub fn from_label(value: &str) -> Self {
        match value.trim() {
            "Side Income" => TransactionType::SideIncome,
            "Regular Expense" => TransactionType::RegularExpense,
            _ => TransactionType::Miscellaneous,
        }
    }

    /// Side income only makes sense on income; expenses fall back to miscellaneous.
    pub fn coerce_for(self, kind: TransactionKind) -> Self {
        match (kind, self) {
            (TransactionKind::Expense, TransactionType::SideIncome) => {
                TransactionType::Miscellaneous
            }
            (_, other) => other,
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for TransactionType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for TransactionType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value
            .map(|label| TransactionType::from_label(&label))
            .unwrap_or_default())
    }
}
