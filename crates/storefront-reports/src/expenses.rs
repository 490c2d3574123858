//! Expense entry form

use serde::Serialize;

use crate::error::ValidationError;
use crate::purchases::{numeric, required};

/// Raw expense form input
#[derive(Debug, Clone, Default)]
pub struct ExpenseForm {
    pub date: String,
    pub category: String,
    pub description: String,
    pub amount: String,
}

/// JSON body posted to `/api/expenses`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpensePayload {
    pub date: String,
    pub category: String,
    pub description: String,
    pub amount: f64,
}

impl ExpenseForm {
    /// Every field is required and the amount must be numeric
    pub fn validate(&self) -> Result<ExpensePayload, ValidationError> {
        Ok(ExpensePayload {
            date: required(&self.date, "date")?,
            category: required(&self.category, "category")?,
            description: required(&self.description, "description")?,
            amount: numeric(&self.amount, "amount")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> ExpenseForm {
        ExpenseForm {
            date: "2024-04-01".into(),
            category: "Rent".into(),
            description: "April rent".into(),
            amount: "15000".into(),
        }
    }

    #[test]
    fn test_valid_expense() {
        let payload = filled().validate().unwrap();
        assert_eq!(payload.amount, 15000.0);
        assert_eq!(payload.category, "Rent");
    }

    #[test]
    fn test_missing_fields() {
        let form = ExpenseForm { description: String::new(), ..filled() };
        assert_eq!(form.validate(), Err(ValidationError::Missing("description")));

        let form = ExpenseForm { date: " ".into(), ..filled() };
        assert_eq!(form.validate(), Err(ValidationError::Missing("date")));
    }

    #[test]
    fn test_amount_not_numeric() {
        let form = ExpenseForm { amount: "lots".into(), ..filled() };
        assert_eq!(form.validate(), Err(ValidationError::NotNumeric("amount")));

        let form = ExpenseForm { amount: "NaN".into(), ..filled() };
        assert_eq!(form.validate(), Err(ValidationError::NotNumeric("amount")));
    }
}
