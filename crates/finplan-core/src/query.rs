//! Selection and aggregation over ledger records
//!
//! Everything here is side-effect free. Functions borrow their input and
//! return borrowed selections, so a filtered view still points at the very
//! records (and handles) held by the store.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::models::{Expense, Income, Subscription};
use crate::types::Category;

/// Inclusive calendar-day range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Check if a date is within the range, both bounds included
    pub fn contains(&self, date: &NaiveDate) -> bool {
        *date >= self.start && *date <= self.end
    }

    /// Number of days covered, 0 when start is after end
    pub fn days(&self) -> i64 {
        if self.start > self.end {
            0
        } else {
            (self.end - self.start).num_days() + 1
        }
    }

    pub fn description(&self) -> String {
        format!("{} to {}", self.start, self.end)
    }
}

/// Records that sit on a calendar day
pub trait Dated {
    fn record_date(&self) -> NaiveDate;
}

impl Dated for Income {
    fn record_date(&self) -> NaiveDate {
        self.date()
    }
}

impl Dated for Expense {
    fn record_date(&self) -> NaiveDate {
        self.date()
    }
}

/// Subscriptions are placed on their start date
impl Dated for Subscription {
    fn record_date(&self) -> NaiveDate {
        self.start_date()
    }
}

impl<T: Dated> Dated for &T {
    fn record_date(&self) -> NaiveDate {
        (**self).record_date()
    }
}

/// Select records whose date falls inside `range`
pub fn by_date_range<'a, T, I>(records: I, range: &DateRange) -> Vec<&'a T>
where
    T: Dated + 'a,
    I: IntoIterator<Item = &'a T>,
{
    records
        .into_iter()
        .filter(|r| range.contains(&r.record_date()))
        .collect()
}

/// Select expenses of exactly one category
pub fn by_category<'a, T, I>(expenses: I, category: Category) -> Vec<&'a T>
where
    T: AsRef<Expense> + 'a,
    I: IntoIterator<Item = &'a T>,
{
    expenses
        .into_iter()
        .filter(|e| e.as_ref().category() == category)
        .collect()
}

/// Sum the selected amount of every record; 0 for no records
pub fn sum<'a, T, I, F>(records: I, amount: F) -> Decimal
where
    T: 'a,
    I: IntoIterator<Item = &'a T>,
    F: Fn(&T) -> Decimal,
{
    records
        .into_iter()
        .fold(Decimal::ZERO, |acc, r| acc + amount(r))
}

/// Newest first. Records sharing a date keep their original relative order.
pub fn sorted_descending_by_date<'a, T, I>(records: I) -> Vec<&'a T>
where
    T: Dated + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut sorted: Vec<&'a T> = records.into_iter().collect();
    // `sort_by` is stable
    sorted.sort_by(|a, b| b.record_date().cmp(&a.record_date()));
    sorted
}

/// `a / b`, or 0 when `b` is 0
pub fn safe_divide(a: Decimal, b: Decimal) -> Decimal {
    if b.is_zero() {
        return Decimal::ZERO;
    }
    a.checked_div(b).unwrap_or(Decimal::ZERO)
}

/// Share of `part` in `total` as a percentage rounded to 2 places, half to even.
/// A zero total gives 0.
pub fn percentage(part: Decimal, total: Decimal) -> Decimal {
    if total.is_zero() {
        return Decimal::ZERO;
    }
    (safe_divide(part, total) * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
}

impl AsRef<Expense> for Expense {
    fn as_ref(&self) -> &Expense {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn expense(date: NaiveDate, category: Category, amount: Decimal, note: &str) -> Expense {
        Expense::new(date, category, amount, note).unwrap()
    }

    #[test]
    fn test_date_range_contains_is_inclusive() {
        let range = DateRange::new(day(2025, 9, 1), day(2025, 9, 30));
        assert!(range.contains(&day(2025, 9, 1)));
        assert!(range.contains(&day(2025, 9, 30)));
        assert!(!range.contains(&day(2025, 8, 31)));
        assert!(!range.contains(&day(2025, 10, 1)));
        assert_eq!(range.days(), 30);
        assert_eq!(range.description(), "2025-09-01 to 2025-09-30");
    }

    #[test]
    fn test_inverted_range_selects_nothing() {
        let range = DateRange::new(day(2025, 9, 30), day(2025, 9, 1));
        let expenses = vec![expense(day(2025, 9, 10), Category::Fun, dec!(3), "x")];
        assert!(by_date_range(&expenses, &range).is_empty());
        assert_eq!(range.days(), 0);
    }

    #[test]
    fn test_by_date_range() {
        let incomes = vec![
            Income::new(day(2025, 8, 31), "Late", dec!(1)).unwrap(),
            Income::new(day(2025, 9, 1), "Salary", dec!(1000)).unwrap(),
            Income::new(day(2025, 9, 30), "Bonus", dec!(50)).unwrap(),
        ];
        let range = DateRange::new(day(2025, 9, 1), day(2025, 9, 30));
        let selected = by_date_range(&incomes, &range);
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].source(), "Salary");
        assert_eq!(selected[1].source(), "Bonus");
    }

    #[test]
    fn test_by_category() {
        let expenses = vec![
            expense(day(2025, 9, 5), Category::Food, dec!(50), "lunch"),
            expense(day(2025, 9, 10), Category::Fun, dec!(30), "movie"),
            expense(day(2025, 9, 11), Category::Food, dec!(7), "coffee"),
        ];
        let food = by_category(&expenses, Category::Food);
        assert_eq!(food.len(), 2);
        assert!(by_category(&expenses, Category::School).is_empty());
    }

    #[test]
    fn test_sum_empty_is_zero() {
        let none: Vec<Income> = vec![];
        assert_eq!(sum(&none, |i: &Income| i.amount()), Decimal::ZERO);
    }

    #[test]
    fn test_sum_is_order_independent() {
        let mut expenses = vec![
            expense(day(2025, 9, 5), Category::Food, dec!(0.10), "a"),
            expense(day(2025, 9, 6), Category::Food, dec!(0.20), "b"),
            expense(day(2025, 9, 7), Category::Food, dec!(12.35), "c"),
        ];
        let forward = sum(&expenses, |e: &Expense| e.amount());
        expenses.reverse();
        let backward = sum(&expenses, |e: &Expense| e.amount());
        assert_eq!(forward, dec!(12.65));
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_sorted_descending_is_stable_for_equal_dates() {
        let expenses = vec![
            expense(day(2025, 9, 5), Category::Food, dec!(1), "first"),
            expense(day(2025, 9, 7), Category::Food, dec!(2), "newest"),
            expense(day(2025, 9, 5), Category::Food, dec!(3), "second"),
            expense(day(2025, 9, 5), Category::Food, dec!(4), "third"),
        ];
        let notes: Vec<&str> = sorted_descending_by_date(&expenses)
            .into_iter()
            .map(|e| e.note())
            .collect();
        assert_eq!(notes, vec!["newest", "first", "second", "third"]);
    }

    #[test]
    fn test_safe_divide() {
        assert_eq!(safe_divide(dec!(80), dec!(0)), Decimal::ZERO);
        assert_eq!(safe_divide(dec!(80), dec!(40)), dec!(2));
    }

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(dec!(50), dec!(80)), dec!(62.5));
        assert_eq!(percentage(dec!(30), dec!(80)), dec!(37.5));
        assert_eq!(percentage(dec!(1), dec!(3)), dec!(33.33));
        assert_eq!(percentage(dec!(2), dec!(3)), dec!(66.67));
        assert_eq!(percentage(dec!(10), dec!(0)), Decimal::ZERO);
        assert_eq!(percentage(dec!(0), dec!(0)), Decimal::ZERO);
    }

    #[test]
    fn test_percentage_rounds_half_to_even() {
        // 0.125% and 0.135% sit exactly on the midpoint
        assert_eq!(percentage(dec!(1), dec!(800)), dec!(0.12));
        assert_eq!(percentage(dec!(27), dec!(20000)), dec!(0.14));
    }

    #[test]
    fn test_percentage_bounds() {
        let total = dec!(7);
        for part in [dec!(0), dec!(1), dec!(3.5), dec!(6.99), dec!(7)] {
            let p = percentage(part, total);
            assert!(p >= Decimal::ZERO && p <= Decimal::ONE_HUNDRED, "{} out of bounds", p);
        }
    }
}
