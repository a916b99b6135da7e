use flowzi_domain::{collections, Bill};

use crate::{
    format::MoneyFormatter,
    storage::{to_document, DocumentStore},
    CoreError,
};

/// Furthest due date a bill may be entered with, in days.
pub const MAX_BILL_DAYS: i64 = 36_500;

/// Form input for a bill. `amount` is in the display currency.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBill {
    pub name: String,
    pub amount: Option<f64>,
    pub days: Option<i64>,
}

impl NewBill {
    pub fn new(name: impl Into<String>, amount: f64, days: i64) -> Self {
        Self {
            name: name.into(),
            amount: Some(amount),
            days: Some(days),
        }
    }

    pub fn validate(&self) -> Result<(f64, i64), CoreError> {
        let (amount, days) = match (self.amount, self.days) {
            (Some(amount), Some(days)) if !self.name.trim().is_empty() => (amount, days),
            _ => {
                return Err(CoreError::Validation(
                    "Please fill in all required fields.".into(),
                ))
            }
        };
        if !amount.is_finite() || amount <= 0.0 {
            return Err(CoreError::Validation(
                "Bill amount must be a positive number.".into(),
            ));
        }
        if days < 0 {
            return Err(CoreError::Validation(
                "Days until due must be a non-negative number.".into(),
            ));
        }
        if days > MAX_BILL_DAYS {
            return Err(CoreError::Validation(format!(
                "Days until due must be at most {MAX_BILL_DAYS}."
            )));
        }
        Ok((amount, days))
    }
}

pub struct BillService;

impl BillService {
    pub fn prepare(input: &NewBill, formatter: &MoneyFormatter) -> Result<Bill, CoreError> {
        let (amount, days) = input.validate()?;
        Ok(Bill::new(input.name.trim(), formatter.normalize(amount), days))
    }

    pub fn add(
        store: &dyn DocumentStore,
        input: &NewBill,
        formatter: &MoneyFormatter,
    ) -> Result<Bill, CoreError> {
        let bill = Self::prepare(input, formatter)?;
        let mut fields = to_document(&bill)?;
        fields.remove("id");
        let id = store
            .add_document(collections::BILLS, fields)
            .inspect_err(|err| tracing::error!(error = %err, "failed to add bill"))?;
        tracing::info!(id = %id, bill = %bill.name, "bill added");
        Ok(bill.with_id(id))
    }

    pub fn delete(store: &dyn DocumentStore, id: &str) -> Result<(), CoreError> {
        store
            .delete_document(collections::BILLS, id)
            .inspect_err(|err| tracing::error!(error = %err, id, "failed to delete bill"))?;
        tracing::info!(id, "bill deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bill_validation_messages() {
        let formatter = MoneyFormatter::default();
        let negative_days = NewBill::new("Water", 30.0, -1);
        let err = BillService::prepare(&negative_days, &formatter).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: Days until due must be a non-negative number."
        );

        let free = NewBill::new("Water", 0.0, 3);
        assert!(BillService::prepare(&free, &formatter).is_err());

        let endless = NewBill::new("Water", f64::INFINITY, 3);
        assert!(BillService::prepare(&endless, &formatter).is_err());

        let distant = NewBill::new("Water", 30.0, MAX_BILL_DAYS + 1);
        assert_eq!(
            BillService::prepare(&distant, &formatter).unwrap_err().to_string(),
            "Validation failed: Days until due must be at most 36500."
        );
        assert!(BillService::prepare(&NewBill::new("Water", 30.0, MAX_BILL_DAYS), &formatter).is_ok());

        let due_today = BillService::prepare(&NewBill::new(" Water ", 30.0, 0), &formatter).unwrap();
        assert_eq!(due_today.name, "Water");
        assert_eq!(due_today.days, 0);
    }
}
