//! Transaction write path: validation, normalization to base units, and deletion.
//! Transactions are never edited once stored.

use chrono::NaiveDate;

use flowzi_domain::{collections, Transaction, TransactionKind, TransactionType};

use crate::{
    format::MoneyFormatter,
    storage::{to_document, DocumentStore},
    CoreError,
};

/// Form input for a new transaction. `amount` is a positive figure in the
/// display currency; `kind` decides its sign.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub category: String,
    pub amount: Option<f64>,
    pub note: String,
    pub kind: TransactionKind,
    pub transaction_type: TransactionType,
}

impl NewTransaction {
    pub fn income(category: impl Into<String>, amount: f64) -> Self {
        Self {
            category: category.into(),
            amount: Some(amount),
            note: String::new(),
            kind: TransactionKind::Income,
            transaction_type: TransactionType::Miscellaneous,
        }
    }

    pub fn expense(category: impl Into<String>, amount: f64) -> Self {
        Self {
            kind: TransactionKind::Expense,
            ..Self::income(category, amount)
        }
    }

    pub fn with_type(mut self, transaction_type: TransactionType) -> Self {
        self.transaction_type = transaction_type;
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    pub fn validate(&self) -> Result<f64, CoreError> {
        let amount = match self.amount {
            Some(amount) if !self.category.trim().is_empty() => amount,
            _ => {
                return Err(CoreError::Validation(
                    "Please fill in all required fields (Category and Amount).".into(),
                ))
            }
        };
        if !amount.is_finite() || amount <= 0.0 {
            return Err(CoreError::Validation(
                "Amount must be a positive number.".into(),
            ));
        }
        Ok(amount)
    }
}

pub struct TransactionService;

impl TransactionService {
    /// Builds the stored record without touching the store.
    pub fn prepare(
        input: &NewTransaction,
        formatter: &MoneyFormatter,
        today: NaiveDate,
    ) -> Result<Transaction, CoreError> {
        let display_amount = input.validate()?;
        let base = formatter.normalize(display_amount);
        let signed = match input.kind {
            TransactionKind::Income => base,
            TransactionKind::Expense => -base,
        };
        let txn = Transaction::new(
            input.category.trim(),
            signed,
            today,
            input.transaction_type.coerce_for(input.kind),
        )
        .with_note(input.note.trim());
        Ok(txn)
    }

    pub fn add(
        store: &dyn DocumentStore,
        input: &NewTransaction,
        formatter: &MoneyFormatter,
        today: NaiveDate,
    ) -> Result<Transaction, CoreError> {
        let txn = Self::prepare(input, formatter, today)?;
        let mut fields = to_document(&txn)?;
        fields.remove("id");
        let id = store
            .add_document(collections::TRANSACTIONS, fields)
            .inspect_err(|err| tracing::error!(error = %err, "failed to add transaction"))?;
        tracing::info!(id = %id, category = %txn.category, "transaction added");
        Ok(txn.with_id(id))
    }

    pub fn delete(store: &dyn DocumentStore, id: &str) -> Result<(), CoreError> {
        store
            .delete_document(collections::TRANSACTIONS, id)
            .inspect_err(|err| tracing::error!(error = %err, id, "failed to delete transaction"))?;
        tracing::info!(id, "transaction deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::CurrencyPreferences;
    use flowzi_domain::{CurrencyTable, SymbolPosition};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 4).unwrap()
    }

    #[test]
    fn expense_is_negated_and_normalized() {
        let formatter = MoneyFormatter::new(
            CurrencyTable::default(),
            CurrencyPreferences {
                currency: "EUR".into(),
                show_cents: true,
                symbol_position: SymbolPosition::Before,
            },
        );
        let input = NewTransaction::expense("  Food ", 92.0)
            .with_type(TransactionType::SideIncome)
            .with_note("  lunch ");
        let txn = TransactionService::prepare(&input, &formatter, today()).unwrap();

        assert_eq!(txn.category, "Food");
        assert!((txn.amount + 100.0).abs() < 1e-9);
        assert_eq!(txn.kind, TransactionKind::Expense);
        assert_eq!(txn.transaction_type, TransactionType::Miscellaneous);
        assert_eq!(txn.note, "lunch");
        assert_eq!(txn.date, today());
    }

    #[test]
    fn rejects_missing_and_non_positive_amounts() {
        let formatter = MoneyFormatter::default();
        let mut missing = NewTransaction::income("Salary", 1.0);
        missing.amount = None;
        let err = TransactionService::prepare(&missing, &formatter, today()).unwrap_err();
        assert!(err.to_string().contains("Category and Amount"));

        let blank = NewTransaction::income("   ", 10.0);
        assert!(TransactionService::prepare(&blank, &formatter, today()).is_err());

        let zero = NewTransaction::income("Salary", 0.0);
        let err = TransactionService::prepare(&zero, &formatter, today()).unwrap_err();
        assert!(err.to_string().contains("positive"));

        let unbounded = NewTransaction::expense("Rent", f64::INFINITY);
        let err = TransactionService::prepare(&unbounded, &formatter, today()).unwrap_err();
        assert!(err.to_string().contains("positive"));
    }
}
