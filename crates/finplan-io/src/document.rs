//! The JSON document: one object holding `incomes`, `expenses` and
//! `subscriptions` arrays.

use chrono::NaiveDate;
use finplan_core::{
    Category, CoreError, CoreResult, Expense, Income, Ledger, LedgerSummary, Subscription,
};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::CodecError;
use crate::fields::{lowercase_keys, Fields};

pub const INCOMES: &str = "incomes";
pub const EXPENSES: &str = "expenses";
pub const SUBSCRIPTIONS: &str = "subscriptions";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IncomeRecord<'a> {
    date: NaiveDate,
    source: &'a str,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    amount: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExpenseRecord<'a> {
    date: NaiveDate,
    category: Category,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    amount: Decimal,
    note: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubscriptionRecord<'a> {
    name: &'a str,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    monthly_price: Decimal,
    start_date: NaiveDate,
    is_active: bool,
}

/// Serializable view of a whole ledger
#[derive(Debug, Serialize)]
pub(crate) struct LedgerDocument<'a> {
    incomes: Vec<IncomeRecord<'a>>,
    expenses: Vec<ExpenseRecord<'a>>,
    subscriptions: Vec<SubscriptionRecord<'a>>,
}

impl<'a> LedgerDocument<'a> {
    pub(crate) fn from_ledger(ledger: &'a Ledger) -> Self {
        Self {
            incomes: ledger
                .incomes()
                .iter()
                .map(|i| IncomeRecord {
                    date: i.date(),
                    source: i.source(),
                    amount: i.amount(),
                })
                .collect(),
            expenses: ledger
                .expenses()
                .iter()
                .map(|e| ExpenseRecord {
                    date: e.date(),
                    category: e.category(),
                    amount: e.amount(),
                    note: e.note(),
                })
                .collect(),
            subscriptions: ledger
                .subscriptions()
                .iter()
                .map(|s| SubscriptionRecord {
                    name: s.name(),
                    monthly_price: s.monthly_price(),
                    start_date: s.start_date(),
                    is_active: s.is_active(),
                })
                .collect(),
        }
    }
}

/// A fully validated data set that has not touched any ledger yet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StagedImport {
    pub incomes: Vec<Income>,
    pub expenses: Vec<Expense>,
    pub subscriptions: Vec<Subscription>,
}

impl StagedImport {
    pub fn summary(&self) -> LedgerSummary {
        LedgerSummary {
            incomes: self.incomes.len(),
            expenses: self.expenses.len(),
            subscriptions: self.subscriptions.len(),
        }
    }

    /// Replace the ledger's contents with this data set
    pub fn commit(self, ledger: &mut Ledger) -> LedgerSummary {
        ledger.replace_all(self.incomes, self.expenses, self.subscriptions)
    }
}

fn income_from(fields: &Fields<'_>) -> CoreResult<Income> {
    Income::new(fields.date("date")?, fields.text("source")?, fields.amount("amount")?)
}

fn expense_from(fields: &Fields<'_>) -> CoreResult<Expense> {
    Expense::new(
        fields.date("date")?,
        fields.category("category")?,
        fields.amount("amount")?,
        fields.text("note")?,
    )
}

fn subscription_from(fields: &Fields<'_>) -> CoreResult<Subscription> {
    Subscription::new(
        fields.text("name")?,
        fields.amount("monthlyPrice")?,
        fields.date("startDate")?,
        fields.flag("isActive", true)?,
    )
}

/// Build every record of one collection, collecting each failure
fn stage_collection<T>(
    root: &Map<String, Value>,
    collection: &str,
    build: fn(&Fields<'_>) -> CoreResult<T>,
    errors: &mut Vec<CoreError>,
) -> Result<Vec<T>, CodecError> {
    let items = match root.get(collection) {
        None => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(_) => {
            return Err(CodecError::structure(format!(
                "'{}' must be an array",
                collection
            )))
        }
    };

    let mut staged = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let location = format!("{}[{}]", collection, index);
        match item {
            Value::Object(map) => match build(&Fields::new(map)) {
                Ok(record) => staged.push(record),
                Err(e) => errors.push(e.within(&location)),
            },
            _ => errors.push(CoreError::validation(location, "expected an object")),
        }
    }
    Ok(staged)
}

/// Parse and validate a document without touching any ledger
pub(crate) fn stage(text: &str) -> Result<StagedImport, CodecError> {
    if text.trim().is_empty() {
        return Err(CodecError::Empty);
    }

    let root = match lowercase_keys(serde_json::from_str::<Value>(text)?)? {
        Value::Object(map) => map,
        Value::Null => return Err(CodecError::structure("document is null")),
        _ => return Err(CodecError::structure("root must be a JSON object")),
    };

    let mut errors = Vec::new();
    let staged = StagedImport {
        incomes: stage_collection(&root, INCOMES, income_from, &mut errors)?,
        expenses: stage_collection(&root, EXPENSES, expense_from, &mut errors)?,
        subscriptions: stage_collection(&root, SUBSCRIPTIONS, subscription_from, &mut errors)?,
    };

    if errors.is_empty() {
        Ok(staged)
    } else {
        Err(CodecError::Rejected { errors })
    }
}
