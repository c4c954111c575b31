//! Core ledger: entities, the in-memory store, filters and monthly reports

pub mod error;
pub mod models;
pub mod query;
pub mod reports;
pub mod types;

use chrono::NaiveDate;
use log::{debug, info, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use error::{CoreError, CoreResult, ErrorCode, ErrorDetails, ErrorSeverity};
pub use models::{Expense, Income, Subscription, MAX_AMOUNT};
pub use query::{DateRange, Dated};
pub use reports::{CategoryBreakdown, MonthlyReport, YearMonth};
pub use types::{Category, EntityKind};

/// Opaque handle to a stored record.
///
/// Handles are assigned by the [`Ledger`] and never reused within a process,
/// so two records with identical fields are still told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(u64);

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A stored record together with its handle
#[derive(Debug, Clone, PartialEq)]
pub struct Entry<T> {
    id: RecordId,
    record: T,
}

impl<T> Entry<T> {
    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn record(&self) -> &T {
        &self.record
    }
}

impl<T> std::ops::Deref for Entry<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.record
    }
}

impl<T: Dated> Dated for Entry<T> {
    fn record_date(&self) -> NaiveDate {
        self.record.record_date()
    }
}

impl AsRef<Expense> for Entry<Expense> {
    fn as_ref(&self) -> &Expense {
        &self.record
    }
}

/// In-memory ledger data
#[derive(Debug, Default, Clone)]
pub struct LedgerData {
    incomes: Vec<Entry<Income>>,
    expenses: Vec<Entry<Expense>>,
    subscriptions: Vec<Entry<Subscription>>,
}

/// Record counts per collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LedgerSummary {
    pub incomes: usize,
    pub expenses: usize,
    pub subscriptions: usize,
}

impl LedgerSummary {
    pub fn total(&self) -> usize {
        self.incomes + self.expenses + self.subscriptions
    }
}

/// Incomes and expenses inside a date range, newest first
#[derive(Debug, Clone)]
pub struct RangeSummary<'a> {
    pub range: DateRange,
    pub incomes: Vec<&'a Entry<Income>>,
    pub expenses: Vec<&'a Entry<Expense>>,
    pub income_total: Decimal,
    pub expense_total: Decimal,
}

/// Expenses of one category, newest first
#[derive(Debug, Clone)]
pub struct CategorySummary<'a> {
    pub category: Category,
    pub expenses: Vec<&'a Entry<Expense>>,
    pub total: Decimal,
}

/// Borrowed record of any kind
#[derive(Debug, Clone, Copy)]
pub enum RecordRef<'a> {
    Income(&'a Income),
    Expense(&'a Expense),
    Subscription(&'a Subscription),
}

impl RecordRef<'_> {
    pub fn kind(&self) -> EntityKind {
        match self {
            RecordRef::Income(_) => EntityKind::Income,
            RecordRef::Expense(_) => EntityKind::Expense,
            RecordRef::Subscription(_) => EntityKind::Subscription,
        }
    }
}

/// One row of the combined view
#[derive(Debug, Clone, Copy)]
pub struct TimelineEntry<'a> {
    pub id: RecordId,
    pub date: NaiveDate,
    pub record: RecordRef<'a>,
}

impl Dated for TimelineEntry<'_> {
    fn record_date(&self) -> NaiveDate {
        self.date
    }
}

/// Main ledger structure
#[derive(Debug, Default)]
pub struct Ledger {
    data: LedgerData,
    next_id: u64,
}

fn remove_entry<T>(entries: &mut Vec<Entry<T>>, id: RecordId, kind: EntityKind) -> CoreResult<T> {
    match entries.iter().position(|e| e.id == id) {
        Some(index) => Ok(entries.remove(index).record),
        None => {
            warn!("Delete ignored: {} {} does not exist", kind, id);
            Err(CoreError::not_found(kind.to_string(), id))
        }
    }
}

fn resolve_display_index<T: Dated>(
    entries: &[Entry<T>],
    index: usize,
    kind: EntityKind,
) -> CoreResult<RecordId> {
    let sorted = query::sorted_descending_by_date(entries);
    index
        .checked_sub(1)
        .and_then(|i| sorted.get(i))
        .map(|e| e.id)
        .ok_or_else(|| {
            CoreError::input_range(
                format!("{} number", kind),
                format!("{} is not between 1 and {}", index, sorted.len()),
            )
        })
}

impl Ledger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> RecordId {
        self.next_id += 1;
        RecordId(self.next_id)
    }

    fn wrap<T>(&mut self, record: T) -> Entry<T> {
        Entry {
            id: self.allocate_id(),
            record,
        }
    }

    // ==================== Mutators ====================

    /// Append an income; the value was validated when it was constructed
    pub fn add_income(&mut self, income: Income) -> RecordId {
        let entry = self.wrap(income);
        let id = entry.id;
        info!("Added income {} ({} from {})", id, entry.amount(), entry.source());
        self.data.incomes.push(entry);
        id
    }

    pub fn add_expense(&mut self, expense: Expense) -> RecordId {
        let entry = self.wrap(expense);
        let id = entry.id;
        info!("Added expense {} ({} {})", id, entry.category(), entry.amount());
        self.data.expenses.push(entry);
        id
    }

    pub fn add_subscription(&mut self, subscription: Subscription) -> RecordId {
        let entry = self.wrap(subscription);
        let id = entry.id;
        info!("Added subscription {} ({})", id, entry.name());
        self.data.subscriptions.push(entry);
        id
    }

    /// Remove exactly the income behind `id`; the store is unchanged if it is gone
    pub fn delete_income(&mut self, id: RecordId) -> CoreResult<Income> {
        let removed = remove_entry(&mut self.data.incomes, id, EntityKind::Income)?;
        info!("Deleted income {}", id);
        Ok(removed)
    }

    pub fn delete_expense(&mut self, id: RecordId) -> CoreResult<Expense> {
        let removed = remove_entry(&mut self.data.expenses, id, EntityKind::Expense)?;
        info!("Deleted expense {}", id);
        Ok(removed)
    }

    pub fn delete_subscription(&mut self, id: RecordId) -> CoreResult<Subscription> {
        let removed = remove_entry(&mut self.data.subscriptions, id, EntityKind::Subscription)?;
        info!("Deleted subscription {}", id);
        Ok(removed)
    }

    /// Flip the active flag of a subscription, returning the new value
    pub fn toggle_subscription_active(&mut self, id: RecordId) -> CoreResult<bool> {
        let entry = self
            .data
            .subscriptions
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| CoreError::not_found(EntityKind::Subscription.to_string(), id))?;
        let active = entry.record.toggle_active();
        info!(
            "Subscription {} '{}' is now {}",
            id,
            entry.record.name(),
            if active { "active" } else { "inactive" }
        );
        Ok(active)
    }

    /// Swap in a complete new data set.
    ///
    /// Every record must already have passed validation. The previous
    /// contents are dropped; nothing is merged. The new collections are built
    /// first and installed with a single assignment.
    pub fn replace_all(
        &mut self,
        incomes: Vec<Income>,
        expenses: Vec<Expense>,
        subscriptions: Vec<Subscription>,
    ) -> LedgerSummary {
        let staged = LedgerData {
            incomes: incomes.into_iter().map(|r| self.wrap(r)).collect(),
            expenses: expenses.into_iter().map(|r| self.wrap(r)).collect(),
            subscriptions: subscriptions.into_iter().map(|r| self.wrap(r)).collect(),
        };
        let previous = self.summary();
        self.data = staged;
        let current = self.summary();
        info!(
            "Replaced ledger contents: {} records dropped, {} loaded \
             ({} incomes, {} expenses, {} subscriptions)",
            previous.total(),
            current.total(),
            current.incomes,
            current.expenses,
            current.subscriptions
        );
        current
    }

    // ==================== Accessors ====================

    pub fn incomes(&self) -> &[Entry<Income>] {
        &self.data.incomes
    }

    pub fn expenses(&self) -> &[Entry<Expense>] {
        &self.data.expenses
    }

    pub fn subscriptions(&self) -> &[Entry<Subscription>] {
        &self.data.subscriptions
    }

    pub fn income(&self, id: RecordId) -> Option<&Income> {
        self.data.incomes.iter().find(|e| e.id == id).map(Entry::record)
    }

    pub fn expense(&self, id: RecordId) -> Option<&Expense> {
        self.data.expenses.iter().find(|e| e.id == id).map(Entry::record)
    }

    pub fn subscription(&self, id: RecordId) -> Option<&Subscription> {
        self.data.subscriptions.iter().find(|e| e.id == id).map(Entry::record)
    }

    pub fn summary(&self) -> LedgerSummary {
        LedgerSummary {
            incomes: self.data.incomes.len(),
            expenses: self.data.expenses.len(),
            subscriptions: self.data.subscriptions.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.summary().total() == 0
    }

    // ==================== Display order ====================

    /// Incomes newest first, equal dates in insertion order
    pub fn incomes_for_display(&self) -> Vec<&Entry<Income>> {
        query::sorted_descending_by_date(&self.data.incomes)
    }

    pub fn expenses_for_display(&self) -> Vec<&Entry<Expense>> {
        query::sorted_descending_by_date(&self.data.expenses)
    }

    /// Subscriptions by start date, newest first
    pub fn subscriptions_for_display(&self) -> Vec<&Entry<Subscription>> {
        query::sorted_descending_by_date(&self.data.subscriptions)
    }

    /// Map a 1-based row number of [`Ledger::incomes_for_display`] to its handle
    pub fn resolve_income_display_index(&self, index: usize) -> CoreResult<RecordId> {
        resolve_display_index(&self.data.incomes, index, EntityKind::Income)
    }

    pub fn resolve_expense_display_index(&self, index: usize) -> CoreResult<RecordId> {
        resolve_display_index(&self.data.expenses, index, EntityKind::Expense)
    }

    pub fn resolve_subscription_display_index(&self, index: usize) -> CoreResult<RecordId> {
        resolve_display_index(&self.data.subscriptions, index, EntityKind::Subscription)
    }

    // ==================== Queries ====================

    /// Incomes and expenses whose date lies in `[from, to]`, with totals
    pub fn range_summary(&self, from: NaiveDate, to: NaiveDate) -> RangeSummary<'_> {
        let range = DateRange::new(from, to);
        let incomes =
            query::sorted_descending_by_date(query::by_date_range(&self.data.incomes, &range));
        let expenses =
            query::sorted_descending_by_date(query::by_date_range(&self.data.expenses, &range));
        let income_total = query::sum(incomes.iter().copied(), |e: &Entry<Income>| e.amount());
        let expense_total = query::sum(expenses.iter().copied(), |e: &Entry<Expense>| e.amount());
        debug!(
            "Range {}: {} incomes, {} expenses",
            range.description(),
            incomes.len(),
            expenses.len()
        );
        RangeSummary {
            range,
            incomes,
            expenses,
            income_total,
            expense_total,
        }
    }

    /// Expenses of `category`, with their total
    pub fn category_summary(&self, category: Category) -> CategorySummary<'_> {
        let expenses =
            query::sorted_descending_by_date(query::by_category(&self.data.expenses, category));
        let total = query::sum(expenses.iter().copied(), |e: &Entry<Expense>| e.amount());
        debug!("Category {}: {} expenses", category, expenses.len());
        CategorySummary {
            category,
            expenses,
            total,
        }
    }

    /// Every record in one list, newest first; subscriptions sit on their start date
    pub fn timeline(&self) -> Vec<TimelineEntry<'_>> {
        let incomes = self.data.incomes.iter().map(|e| TimelineEntry {
            id: e.id,
            date: e.date(),
            record: RecordRef::Income(&e.record),
        });
        let expenses = self.data.expenses.iter().map(|e| TimelineEntry {
            id: e.id,
            date: e.date(),
            record: RecordRef::Expense(&e.record),
        });
        let subscriptions = self.data.subscriptions.iter().map(|e| TimelineEntry {
            id: e.id,
            date: e.start_date(),
            record: RecordRef::Subscription(&e.record),
        });
        let combined: Vec<TimelineEntry<'_>> =
            incomes.chain(expenses).chain(subscriptions).collect();
        query::sorted_descending_by_date(&combined)
            .into_iter()
            .copied()
            .collect()
    }

    /// Summary report for one calendar month
    pub fn monthly_report(&self, year: i32, month: u32) -> CoreResult<MonthlyReport> {
        let period = YearMonth::new(year, month)?;
        Ok(self.report_for(period))
    }

    pub fn report_for(&self, period: YearMonth) -> MonthlyReport {
        reports::monthly_report(
            self.data.incomes.iter().map(Entry::record),
            self.data.expenses.iter().map(Entry::record),
            self.data.subscriptions.iter().map(Entry::record),
            period,
        )
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_ledger() -> Ledger {
        let mut ledger = Ledger::new();
        ledger.add_income(Income::new(day(2025, 9, 1), "Salary", dec!(1000)).unwrap());
        ledger.add_expense(
            Expense::new(day(2025, 9, 5), Category::Food, dec!(50), "lunch").unwrap(),
        );
        ledger.add_expense(
            Expense::new(day(2025, 9, 10), Category::Fun, dec!(30), "movie").unwrap(),
        );
        ledger.add_subscription(
            Subscription::new("Music", dec!(10), day(2025, 8, 1), true).unwrap(),
        );
        ledger
    }

    #[test]
    fn test_add_and_summary() {
        let ledger = sample_ledger();
        assert_eq!(
            ledger.summary(),
            LedgerSummary {
                incomes: 1,
                expenses: 2,
                subscriptions: 1
            }
        );
        assert!(!ledger.is_empty());
        assert!(Ledger::new().is_empty());
    }

    #[test]
    fn test_record_ids_are_unique() {
        let mut ledger = Ledger::new();
        let a = ledger.add_income(Income::new(day(2025, 1, 1), "Gift", dec!(5)).unwrap());
        let b = ledger.add_income(Income::new(day(2025, 1, 1), "Gift", dec!(5)).unwrap());
        assert_ne!(a, b);
    }

    #[test]
    fn test_delete_removes_exact_entry_among_duplicates() {
        let mut ledger = Ledger::new();
        let twin = || Expense::new(day(2025, 9, 5), Category::Food, dec!(5), "coffee").unwrap();
        let first = ledger.add_expense(twin());
        let second = ledger.add_expense(twin());

        ledger.delete_expense(second).unwrap();
        assert_eq!(ledger.expenses().len(), 1);
        assert_eq!(ledger.expenses()[0].id(), first);
    }

    #[test]
    fn test_delete_missing_is_reported_and_store_unchanged() {
        let mut ledger = sample_ledger();
        let id = ledger.resolve_income_display_index(1).unwrap();
        ledger.delete_income(id).unwrap();

        let err = ledger.delete_income(id).unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
        assert_eq!(ledger.summary().expenses, 2);
        assert_eq!(ledger.summary().incomes, 0);
    }

    #[test]
    fn test_delete_by_display_index() {
        let mut ledger = Ledger::new();
        ledger.add_expense(Expense::new(day(2025, 9, 1), Category::Food, dec!(1), "old").unwrap());
        ledger.add_expense(Expense::new(day(2025, 9, 9), Category::Food, dec!(2), "new").unwrap());
        ledger.add_expense(
            Expense::new(day(2025, 9, 1), Category::Food, dec!(3), "old too").unwrap(),
        );

        let notes: Vec<&str> = ledger.expenses_for_display().iter().map(|e| e.note()).collect();
        assert_eq!(notes, vec!["new", "old", "old too"]);

        // row 3 is the second record dated 2025-09-01
        let id = ledger.resolve_expense_display_index(3).unwrap();
        let removed = ledger.delete_expense(id).unwrap();
        assert_eq!(removed.note(), "old too");
    }

    #[test]
    fn test_resolve_display_index_out_of_range() {
        let ledger = sample_ledger();
        assert_eq!(
            ledger.resolve_expense_display_index(0).unwrap_err().code(),
            ErrorCode::InputRange
        );
        assert_eq!(
            ledger.resolve_expense_display_index(3).unwrap_err().code(),
            ErrorCode::InputRange
        );
        assert!(ledger.resolve_subscription_display_index(1).is_ok());
    }

    #[test]
    fn test_toggle_subscription_twice() {
        let mut ledger = sample_ledger();
        let id = ledger.resolve_subscription_display_index(1).unwrap();
        assert!(!ledger.toggle_subscription_active(id).unwrap());
        assert!(!ledger.subscription(id).unwrap().is_active());
        assert!(ledger.toggle_subscription_active(id).unwrap());
        assert!(ledger.subscription(id).unwrap().is_active());
    }

    #[test]
    fn test_toggle_missing_subscription() {
        let mut ledger = sample_ledger();
        let id = ledger.resolve_subscription_display_index(1).unwrap();
        ledger.delete_subscription(id).unwrap();
        assert_eq!(
            ledger.toggle_subscription_active(id).unwrap_err().code(),
            ErrorCode::NotFound
        );
    }

    #[test]
    fn test_replace_all_discards_previous_contents() {
        let mut ledger = sample_ledger();
        let old_id = ledger.incomes()[0].id();

        let summary = ledger.replace_all(
            vec![Income::new(day(2024, 1, 1), "Refund", dec!(12)).unwrap()],
            vec![],
            vec![],
        );

        assert_eq!(summary.total(), 1);
        assert_eq!(ledger.incomes()[0].source(), "Refund");
        assert!(ledger.expenses().is_empty());
        assert!(ledger.income(old_id).is_none());
    }

    #[test]
    fn test_range_summary() {
        let mut ledger = sample_ledger();
        ledger.add_expense(
            Expense::new(day(2025, 10, 2), Category::School, dec!(15), "books").unwrap(),
        );

        let summary = ledger.range_summary(day(2025, 9, 5), day(2025, 9, 30));
        assert!(summary.incomes.is_empty());
        assert_eq!(summary.income_total, Decimal::ZERO);
        assert_eq!(summary.expenses.len(), 2);
        assert_eq!(summary.expenses[0].note(), "movie");
        assert_eq!(summary.expense_total, dec!(80));
    }

    #[test]
    fn test_category_summary() {
        let mut ledger = sample_ledger();
        ledger.add_expense(
            Expense::new(day(2025, 10, 2), Category::Food, dec!(15), "dinner").unwrap(),
        );

        let food = ledger.category_summary(Category::Food);
        assert_eq!(food.expenses.len(), 2);
        assert_eq!(food.expenses[0].note(), "dinner");
        assert_eq!(food.total, dec!(65));
        assert_eq!(ledger.category_summary(Category::Other).total, Decimal::ZERO);
    }

    #[test]
    fn test_timeline_orders_all_kinds() {
        let ledger = sample_ledger();
        let kinds: Vec<EntityKind> = ledger.timeline().iter().map(|e| e.record.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                EntityKind::Expense,
                EntityKind::Expense,
                EntityKind::Income,
                EntityKind::Subscription,
            ]
        );
    }

    #[test]
    fn test_monthly_report_through_ledger() {
        let ledger = sample_ledger();
        let report = ledger.monthly_report(2025, 9).unwrap();
        assert_eq!(report.net, dec!(910));
        assert_eq!(
            ledger.monthly_report(2025, 13).unwrap_err().code(),
            ErrorCode::InputRange
        );
    }
}
