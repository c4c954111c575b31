//! Basic types for the core ledger module

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Expense category enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    /// Groceries, eating out
    Food,
    /// Tickets, fuel, taxis
    Transport,
    /// Entertainment and hobbies
    Fun,
    /// Books, fees, supplies
    School,
    /// Anything else
    Other,
}

impl Category {
    /// All categories in ordinal order
    pub const ALL: [Category; 5] = [
        Category::Food,
        Category::Transport,
        Category::Fun,
        Category::School,
        Category::Other,
    ];

    /// Zero-based ordinal (Food = 0 .. Other = 4)
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// Look up a category by ordinal
    pub fn from_ordinal(ordinal: i64) -> Result<Self, CoreError> {
        usize::try_from(ordinal)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .ok_or_else(|| {
                CoreError::input_range("category", format!("{} is not between 0 and 4", ordinal))
            })
    }
}

impl std::str::FromStr for Category {
    type Err = CoreError;

    /// Accepts a name (any case) or an ordinal
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(ordinal) = s.parse::<i64>() {
            return Self::from_ordinal(ordinal);
        }
        match s.to_lowercase().as_str() {
            "food" => Ok(Category::Food),
            "transport" => Ok(Category::Transport),
            "fun" => Ok(Category::Fun),
            "school" => Ok(Category::School),
            "other" => Ok(Category::Other),
            _ => Err(CoreError::input_range(
                "category",
                format!("unknown category '{}'", s),
            )),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Food => write!(f, "Food"),
            Category::Transport => write!(f, "Transport"),
            Category::Fun => write!(f, "Fun"),
            Category::School => write!(f, "School"),
            Category::Other => write!(f, "Other"),
        }
    }
}

/// The three kinds of stored entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Income,
    Expense,
    Subscription,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Income => write!(f, "income"),
            EntityKind::Expense => write!(f, "expense"),
            EntityKind::Subscription => write!(f, "subscription"),
        }
    }
}
