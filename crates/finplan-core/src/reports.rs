//! Monthly summary report

use chrono::{Months, NaiveDate};
use log::debug;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::{CoreError, CoreResult};
use crate::models::{Expense, Income, Subscription};
use crate::query::{by_category, by_date_range, percentage, safe_divide, sum, DateRange};
use crate::types::Category;

/// A validated calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearMonth {
    year: i32,
    month: u32,
    first_day: NaiveDate,
    last_day: NaiveDate,
}

impl YearMonth {
    /// Build a month; `month` must be 1..=12
    pub fn new(year: i32, month: u32) -> CoreResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(CoreError::input_range(
                "month",
                format!("{} is not between 1 and 12", month),
            ));
        }
        let first_day = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
            CoreError::input_range("year", format!("{} is not a supported year", year))
        })?;
        // last day = first day + 1 month - 1 day
        let last_day = first_day
            .checked_add_months(Months::new(1))
            .and_then(|d| d.pred_opt())
            .ok_or_else(|| {
                CoreError::input_range("year", format!("{} is not a supported year", year))
            })?;
        Ok(Self {
            year,
            month,
            first_day,
            last_day,
        })
    }

    /// Parse `YYYY-MM`.
    ///
    /// Text that is not shaped like a year and month is a parse error; a
    /// well-formed month number outside 1..=12 is a range error.
    pub fn parse(input: &str) -> CoreResult<Self> {
        let input = input.trim();
        let malformed = || CoreError::parse(format!("'{}' is not in YYYY-MM format", input));

        let (year, month) = input.split_once('-').ok_or_else(malformed)?;
        let digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
        if year.len() != 4 || !digits(year) || month.len() > 2 || !digits(month) {
            return Err(malformed());
        }
        let year: i32 = year.parse().map_err(|_| malformed())?;
        let month: u32 = month.parse().map_err(|_| malformed())?;
        Self::new(year, month)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    pub fn last_day(&self) -> NaiveDate {
        self.last_day
    }

    pub fn range(&self) -> DateRange {
        DateRange::new(self.first_day, self.last_day)
    }

    pub fn days(&self) -> i64 {
        self.range().days()
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Expense total for one category within a period
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBreakdown {
    pub category: Category,
    pub amount: Decimal,
    /// Share of the period's expense total, 2 decimal places
    pub percentage: Decimal,
    pub count: usize,
}

/// Monthly summary report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyReport {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub days_in_period: i64,
    pub income_total: Decimal,
    pub expense_total: Decimal,
    pub subscription_total: Decimal,
    pub net: Decimal,
    pub income_count: usize,
    pub expense_count: usize,
    pub active_subscription_count: usize,
    pub category_breakdown: Vec<CategoryBreakdown>,
    pub largest_expense: Option<Expense>,
    pub average_daily_spend: Decimal,
}

/// Compute the report for `period`.
///
/// Subscriptions have no end date: every active subscription that started on
/// or before the last day of the period is charged in full, based on its
/// current active flag.
pub fn monthly_report<'a, I, E, S>(
    incomes: I,
    expenses: E,
    subscriptions: S,
    period: YearMonth,
) -> MonthlyReport
where
    I: IntoIterator<Item = &'a Income>,
    E: IntoIterator<Item = &'a Expense>,
    S: IntoIterator<Item = &'a Subscription>,
{
    let range = period.range();

    let incomes = by_date_range(incomes, &range);
    let income_total = sum(incomes.iter().copied(), Income::amount);

    let expenses = by_date_range(expenses, &range);
    let expense_total = sum(expenses.iter().copied(), Expense::amount);

    // strict comparison keeps the first of equal maxima
    let mut largest: Option<&Expense> = None;
    for &expense in &expenses {
        if largest.map_or(true, |l| expense.amount() > l.amount()) {
            largest = Some(expense);
        }
    }

    // categories in order of first appearance
    let mut seen: Vec<Category> = Vec::new();
    for &expense in &expenses {
        if !seen.contains(&expense.category()) {
            seen.push(expense.category());
        }
    }
    let totals: Vec<(Category, Decimal, usize)> = seen
        .into_iter()
        .map(|category| {
            let members = by_category(expenses.iter().copied(), category);
            (category, sum(members.iter().copied(), Expense::amount), members.len())
        })
        .collect();

    let billed: Vec<&Subscription> = subscriptions
        .into_iter()
        .filter(|s| s.is_billed_by(period.last_day()))
        .collect();
    let subscription_total = sum(billed.iter().copied(), Subscription::monthly_price);

    let category_breakdown = totals
        .into_iter()
        .map(|(category, amount, count)| CategoryBreakdown {
            category,
            amount,
            percentage: percentage(amount, expense_total),
            count,
        })
        .collect();

    let days = period.days();
    let report = MonthlyReport {
        period_start: period.first_day(),
        period_end: period.last_day(),
        days_in_period: days,
        income_total,
        expense_total,
        subscription_total,
        net: income_total - expense_total - subscription_total,
        income_count: incomes.len(),
        expense_count: expenses.len(),
        active_subscription_count: billed.len(),
        category_breakdown,
        largest_expense: largest.cloned(),
        average_daily_spend: safe_divide(expense_total, Decimal::from(days)),
    };

    debug!(
        "Monthly report {}: income={} expenses={} subscriptions={} net={}",
        period, report.income_total, report.expense_total, report.subscription_total, report.net
    );

    report
}
