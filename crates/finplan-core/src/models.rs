//! Core data models for the ledger
//!
//! Entities can only be built through their validating constructors, so a
//! stored value always satisfies its invariants: amounts are strictly
//! positive and required text is never blank.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::error::{CoreError, CoreResult};
use super::types::Category;

fn require_text(field: &str, value: String) -> CoreResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::validation(field, "must not be blank"));
    }
    if trimmed.len() == value.len() {
        Ok(value)
    } else {
        Ok(trimmed.to_string())
    }
}

/// Largest accepted amount. Sums of any number of records held in memory stay
/// far below `Decimal::MAX` (about 7.9e28), so totals never overflow.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

fn require_positive(field: &str, value: Decimal) -> CoreResult<Decimal> {
    if value <= Decimal::ZERO {
        return Err(CoreError::validation(
            field,
            format!("must be greater than 0 (got {})", value),
        ));
    }
    if value > MAX_AMOUNT {
        return Err(CoreError::validation(
            field,
            format!("must not exceed {} (got {})", MAX_AMOUNT, value),
        ));
    }
    Ok(value)
}

/// Money received
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Income {
    date: NaiveDate,
    source: String,
    amount: Decimal,
}

impl Income {
    pub fn new(date: NaiveDate, source: impl Into<String>, amount: Decimal) -> CoreResult<Self> {
        Ok(Self {
            date,
            source: require_text("source", source.into())?,
            amount: require_positive("amount", amount)?,
        })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }
}

/// Money spent
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    date: NaiveDate,
    category: Category,
    amount: Decimal,
    note: String,
}

impl Expense {
    pub fn new(
        date: NaiveDate,
        category: Category,
        amount: Decimal,
        note: impl Into<String>,
    ) -> CoreResult<Self> {
        Ok(Self {
            date,
            category,
            amount: require_positive("amount", amount)?,
            note: require_text("note", note.into())?,
        })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn note(&self) -> &str {
        &self.note
    }
}

/// A recurring monthly charge
///
/// Name, price and start date are fixed at construction. The active flag is
/// the only field that may change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    name: String,
    monthly_price: Decimal,
    start_date: NaiveDate,
    is_active: bool,
}

impl Subscription {
    pub fn new(
        name: impl Into<String>,
        monthly_price: Decimal,
        start_date: NaiveDate,
        is_active: bool,
    ) -> CoreResult<Self> {
        Ok(Self {
            name: require_text("name", name.into())?,
            monthly_price: require_positive("monthlyPrice", monthly_price)?,
            start_date,
            is_active,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn monthly_price(&self) -> Decimal {
        self.monthly_price
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn set_active(&mut self, active: bool) {
        self.is_active = active;
    }

    /// Flip the active flag and return the new value
    pub fn toggle_active(&mut self) -> bool {
        self.is_active = !self.is_active;
        self.is_active
    }

    /// Whether this subscription is charged in a period ending on `period_end`
    pub fn is_billed_by(&self, period_end: NaiveDate) -> bool {
        self.is_active && self.start_date <= period_end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use rust_decimal_macros::dec;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_income_valid() {
        let income = Income::new(day(2025, 9, 1), "Salary", dec!(1000)).unwrap();
        assert_eq!(income.source(), "Salary");
        assert_eq!(income.amount(), dec!(1000));
        assert_eq!(income.date(), day(2025, 9, 1));
    }

    #[test]
    fn test_income_rejects_non_positive_amount() {
        let err = Income::new(day(2025, 9, 1), "Salary", dec!(0)).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationError);
        assert!(Income::new(day(2025, 9, 1), "Salary", dec!(-5)).is_err());
    }

    #[test]
    fn test_amounts_are_capped() {
        assert_eq!(MAX_AMOUNT, dec!(1000000000000000));
        assert!(Income::new(day(2025, 9, 1), "Salary", MAX_AMOUNT).is_ok());

        let err = Income::new(day(2025, 9, 1), "Salary", dec!(50000000000000000000000000000))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationError);
        assert!(err.to_string().contains("must not exceed"));
        let over = MAX_AMOUNT + dec!(0.01);
        assert!(Subscription::new("Yacht", over, day(2025, 1, 1), true).is_err());
    }

    #[test]
    fn test_income_rejects_blank_source() {
        let err = Income::new(day(2025, 9, 1), "   ", dec!(10)).unwrap_err();
        assert_eq!(err, CoreError::validation("source", "must not be blank"));
    }

    #[test]
    fn test_text_is_trimmed() {
        let expense = Expense::new(day(2025, 9, 5), Category::Food, dec!(5), "  lunch ").unwrap();
        assert_eq!(expense.note(), "lunch");
    }

    #[test]
    fn test_expense_validation() {
        assert!(Expense::new(day(2025, 9, 5), Category::Food, dec!(0.01), "gum").is_ok());
        assert!(Expense::new(day(2025, 9, 5), Category::Food, dec!(-1), "gum").is_err());
        assert!(Expense::new(day(2025, 9, 5), Category::Food, dec!(3), "").is_err());
    }

    #[test]
    fn test_subscription_validation() {
        let err = Subscription::new("Music", dec!(0), day(2025, 1, 1), true).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationError);
        assert!(Subscription::new("", dec!(9.99), day(2025, 1, 1), true).is_err());
    }

    #[test]
    fn test_subscription_toggle_twice_restores_flag() {
        let mut sub = Subscription::new("Music", dec!(9.99), day(2025, 1, 1), true).unwrap();
        assert!(!sub.toggle_active());
        assert!(sub.toggle_active());
        assert!(sub.is_active());
    }

    #[test]
    fn test_subscription_billed_by() {
        let mut sub = Subscription::new("Gym", dec!(30), day(2025, 8, 15), true).unwrap();
        assert!(sub.is_billed_by(day(2025, 8, 31)));
        assert!(sub.is_billed_by(day(2025, 8, 15)));
        assert!(!sub.is_billed_by(day(2025, 7, 31)));
        sub.set_active(false);
        assert!(!sub.is_billed_by(day(2025, 8, 31)));
    }
}
