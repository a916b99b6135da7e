//! Financial aggregation over a transaction snapshot.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use flowzi_domain::{Transaction, TransactionType};

/// Income/expense totals derived from one pass over the transactions.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FinancialSummary {
    pub total_income: f64,
    pub primary_income: f64,
    pub side_income: f64,
    pub total_expenses: f64,
    pub regular_expenses: f64,
    pub miscellaneous_expenses: f64,
    /// Absolute expense totals keyed by category.
    pub expenses_by_category: BTreeMap<String, f64>,
    /// Manually-entered income from settings, not part of `total_income`.
    pub monthly_income: f64,
    pub total_balance: f64,
}

impl FinancialSummary {
    /// Transaction income plus settings income.
    pub fn combined_income(&self) -> f64 {
        self.total_income + self.monthly_income
    }

    pub fn has_activity(&self) -> bool {
        self.total_income > 0.0 || self.total_expenses > 0.0
    }

    pub fn spent_on(&self, category: &str) -> f64 {
        self.expenses_by_category
            .get(category)
            .copied()
            .unwrap_or(0.0)
    }
}

/// Views over the transaction list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransactionFilter {
    #[default]
    All,
    /// Income that is not side income.
    Income,
    /// Expenses that are not regular.
    Expenses,
    Regular,
    SideIncome,
}

impl TransactionFilter {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Some(TransactionFilter::All),
            "income" => Some(TransactionFilter::Income),
            "expenses" | "expense" => Some(TransactionFilter::Expenses),
            "regular" => Some(TransactionFilter::Regular),
            "side" | "side-income" | "sideincome" => Some(TransactionFilter::SideIncome),
            _ => None,
        }
    }

    pub fn matches(self, txn: &Transaction) -> bool {
        let side = txn.transaction_type == TransactionType::SideIncome;
        let regular = txn.transaction_type == TransactionType::RegularExpense;
        match self {
            TransactionFilter::All => true,
            TransactionFilter::Income => txn.is_income() && !side,
            TransactionFilter::Expenses => txn.is_expense() && !regular,
            TransactionFilter::Regular => regular,
            TransactionFilter::SideIncome => side,
        }
    }
}

impl fmt::Display for TransactionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionFilter::All => "all",
            TransactionFilter::Income => "income",
            TransactionFilter::Expenses => "expenses",
            TransactionFilter::Regular => "regular",
            TransactionFilter::SideIncome => "side",
        };
        f.write_str(label)
    }
}

pub struct SummaryService;

impl SummaryService {
    pub fn aggregate(transactions: &[Transaction], monthly_income: f64) -> FinancialSummary {
        let mut summary = FinancialSummary {
            monthly_income,
            ..FinancialSummary::default()
        };

        for txn in transactions {
            if txn.is_income() {
                summary.total_income += txn.amount;
                if txn.transaction_type == TransactionType::SideIncome {
                    summary.side_income += txn.amount;
                } else {
                    summary.primary_income += txn.amount;
                }
            } else {
                let spent = txn.amount.abs();
                summary.total_expenses += spent;
                if txn.transaction_type == TransactionType::RegularExpense {
                    summary.regular_expenses += spent;
                } else {
                    summary.miscellaneous_expenses += spent;
                }
                *summary
                    .expenses_by_category
                    .entry(txn.category.clone())
                    .or_insert(0.0) += spent;
            }
        }

        summary.total_balance = summary.total_income + monthly_income - summary.total_expenses;
        summary
    }

    /// Applies a filter view and a case-insensitive search over category and note.
    pub fn filter<'a>(
        transactions: &'a [Transaction],
        filter: TransactionFilter,
        search: &str,
    ) -> Vec<&'a Transaction> {
        let needle = search.trim().to_lowercase();
        transactions
            .iter()
            .filter(|txn| filter.matches(txn))
            .filter(|txn| {
                needle.is_empty()
                    || txn.category.to_lowercase().contains(&needle)
                    || txn.note.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// The first `limit` transactions in delivery order.
    pub fn recent(transactions: &[Transaction], limit: usize) -> &[Transaction] {
        &transactions[..limit.min(transactions.len())]
    }
}
