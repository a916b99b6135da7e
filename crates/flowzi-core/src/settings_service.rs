//! Settings document writes: income, currency preferences, defaults and the
//! clear-all reset.

use serde_json::{json, Value};

use flowzi_domain::{collections, CurrencyTable, IncomeFrequency, UserSettings};

use crate::{
    format::{normalize, CurrencyPreferences},
    storage::{to_document, Document, DocumentRef, DocumentStore},
    CoreError,
};

fn fields(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        _ => Document::new(),
    }
}

pub struct SettingsService;

impl SettingsService {
    /// Monthly base-unit income for an amount typed in `currency` at `frequency`.
    pub fn monthly_income(
        table: &CurrencyTable,
        income_amount: f64,
        currency: &str,
        frequency: IncomeFrequency,
    ) -> f64 {
        frequency.to_monthly(normalize(table, income_amount, currency))
    }

    /// Writes the raw figure, its frequency and the derived monthly income.
    pub fn save_income(
        store: &dyn DocumentStore,
        user_id: &str,
        table: &CurrencyTable,
        currency: &str,
        income_amount: f64,
        frequency: IncomeFrequency,
    ) -> Result<f64, CoreError> {
        if !income_amount.is_finite() || income_amount < 0.0 {
            return Err(CoreError::Validation(
                "Income must be a non-negative number.".into(),
            ));
        }
        let monthly = Self::monthly_income(table, income_amount, currency, frequency);
        let update = json!({
            "incomeAmount": income_amount,
            "incomeFrequency": frequency,
            "monthlyIncome": monthly,
        });
        store
            .write_merge(collections::USERS, user_id, fields(update))
            .inspect_err(|err| tracing::error!(error = %err, "failed to save income"))?;
        tracing::info!(monthly_income = monthly, "income saved");
        Ok(monthly)
    }

    pub fn save_preferences(
        store: &dyn DocumentStore,
        user_id: &str,
        prefs: &CurrencyPreferences,
    ) -> Result<(), CoreError> {
        let update = json!({
            "currency": prefs.currency,
            "showCents": prefs.show_cents,
            "symbolPosition": prefs.symbol_position.to_string(),
        });
        store
            .write_merge(collections::USERS, user_id, fields(update))
            .inspect_err(|err| tracing::error!(error = %err, "failed to save currency preferences"))?;
        Ok(())
    }

    /// Settings from a users snapshot, or `None` when the user has no document yet.
    pub fn find(documents: &[Document], user_id: &str) -> Option<UserSettings> {
        let document = documents
            .iter()
            .find(|doc| doc.get("id").and_then(Value::as_str) == Some(user_id))?;
        match serde_json::from_value(Value::Object(document.clone())) {
            Ok(settings) => Some(settings),
            Err(err) => {
                tracing::warn!(error = %err, "settings document malformed, using defaults");
                Some(UserSettings::default())
            }
        }
    }

    /// Creates the settings document with defaults unless it already exists.
    /// Returns whether a document was written.
    pub fn ensure_defaults(store: &dyn DocumentStore, user_id: &str) -> Result<bool, CoreError> {
        let existing = store.list(collections::USERS)?;
        if Self::find(&existing, user_id).is_some() {
            return Ok(false);
        }
        store.write_merge(
            collections::USERS,
            user_id,
            to_document(&UserSettings::default())?,
        )?;
        tracing::debug!(user = user_id, "default settings created");
        Ok(true)
    }

    /// Deletes every transaction, goal and bill in one batch, then resets the
    /// income and currency fields of the settings document.
    pub fn clear_all_data(store: &dyn DocumentStore, user_id: &str) -> Result<usize, CoreError> {
        let mut refs = Vec::new();
        for collection in [collections::TRANSACTIONS, collections::GOALS, collections::BILLS] {
            for document in store.list(collection)? {
                if let Some(id) = document.get("id").and_then(Value::as_str) {
                    refs.push(DocumentRef::new(collection, id));
                }
            }
        }
        store
            .batch_delete(&refs)
            .inspect_err(|err| tracing::error!(error = %err, "failed to clear data"))?;
        tracing::info!(deleted = refs.len(), "cleared transactions, goals and bills");

        let reset = json!({
            "monthlyIncome": 0,
            "incomeAmount": 0,
            "incomeFrequency": "monthly",
            "currency": "USD",
            "showCents": true,
            "symbolPosition": "before",
        });
        store.write_merge(collections::USERS, user_id, fields(reset))?;
        Ok(refs.len())
    }
}
