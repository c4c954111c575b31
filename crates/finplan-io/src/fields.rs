//! Field readers for imported records
//!
//! Each reader turns one JSON value into a typed field or reports a
//! validation error naming the field. Range and blank checks are left to the
//! entity constructors so both entry paths share one set of rules.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use finplan_core::{Category, CoreError, CoreResult};
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use crate::error::CodecError;

/// A JSON object whose keys have been lowercased
pub(crate) struct Fields<'a> {
    map: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    pub(crate) fn new(map: &'a Map<String, Value>) -> Self {
        Self { map }
    }

    /// Look up a field by its exported name, ignoring case
    fn get(&self, name: &str) -> Option<&'a Value> {
        match self.map.get(&name.to_lowercase()) {
            None | Some(Value::Null) => None,
            Some(value) => Some(value),
        }
    }

    fn required(&self, name: &str) -> CoreResult<&'a Value> {
        self.get(name)
            .ok_or_else(|| CoreError::validation(name, "is required"))
    }

    pub(crate) fn text(&self, name: &str) -> CoreResult<String> {
        match self.required(name)? {
            Value::String(s) => Ok(s.clone()),
            _ => Err(CoreError::validation(name, "must be text")),
        }
    }

    pub(crate) fn date(&self, name: &str) -> CoreResult<NaiveDate> {
        match self.required(name)? {
            Value::String(s) => parse_date(s)
                .ok_or_else(|| CoreError::validation(name, format!("'{}' is not a valid date", s))),
            _ => Err(CoreError::validation(name, "must be a date string")),
        }
    }

    pub(crate) fn amount(&self, name: &str) -> CoreResult<Decimal> {
        let parsed = match self.required(name)? {
            Value::Number(n) => parse_decimal(&n.to_string()),
            Value::String(s) => parse_decimal(s.trim()),
            _ => None,
        };
        parsed.ok_or_else(|| CoreError::validation(name, "must be a number"))
    }

    pub(crate) fn category(&self, name: &str) -> CoreResult<Category> {
        match self.required(name)? {
            Value::Number(n) => match n.as_i64() {
                Some(ordinal) => Category::from_ordinal(ordinal),
                None => Err(CoreError::input_range(name, format!("{} is not between 0 and 4", n))),
            },
            Value::String(s) => Category::from_str(s),
            _ => Err(CoreError::validation(name, "must be a category name or number")),
        }
    }

    /// Boolean flag, `default` when absent
    pub(crate) fn flag(&self, name: &str, default: bool) -> CoreResult<bool> {
        match self.get(name) {
            None => Ok(default),
            Some(Value::Bool(b)) => Ok(*b),
            Some(_) => Err(CoreError::validation(name, "must be true or false")),
        }
    }
}

/// Accepts `YYYY-MM-DD` or an ISO 8601 date-time; any time of day is dropped
pub(crate) fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(input).ok().map(|dt| dt.date_naive()))
}

fn parse_decimal(input: &str) -> Option<Decimal> {
    Decimal::from_str(input)
        .or_else(|_| Decimal::from_scientific(input))
        .ok()
}

/// Copy of `value` with every object key lowercased.
///
/// Two keys of one object that differ only in case are rejected.
pub(crate) fn lowercase_keys(value: Value) -> Result<Value, CodecError> {
    match value {
        Value::Object(map) => {
            let mut lowered = Map::with_capacity(map.len());
            for (key, item) in map {
                let lower = key.to_lowercase();
                if lowered.contains_key(&lower) {
                    return Err(CodecError::structure(format!(
                        "duplicate key '{}' (keys are matched ignoring case)",
                        key
                    )));
                }
                lowered.insert(lower, lowercase_keys(item)?);
            }
            Ok(Value::Object(lowered))
        }
        Value::Array(items) => items
            .into_iter()
            .map(lowercase_keys)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        other => Ok(other),
    }
}
