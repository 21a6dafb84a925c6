//! Normalising deserializers for backend payloads
//!
//! The accounting backend is inconsistent about JSON types: flags arrive as
//! `true`, `1` or `"1"`, balances as numbers or strings, ids as either. Every
//! such field is converted to one canonical Rust type here, so nothing past
//! the deserialisation boundary ever compares loosely typed values.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::de::{self, Deserialize, Deserializer};
use serde_json::Value;
use std::str::FromStr;

/// Which end of a month a bare `YYYY-MM` value resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthEdge {
    Start,
    End,
}

/// Interpret a JSON value as a boolean flag
pub fn bool_from_value(value: &Value) -> Option<bool> {
    match value {
        Value::Null => Some(false),
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n
            .as_i64()
            .map(|i| i != 0)
            .or_else(|| n.as_u64().map(|u| u != 0)),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "y" | "on" => Some(true),
            "0" | "false" | "no" | "n" | "off" | "" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Interpret a JSON value as a decimal amount
pub fn decimal_from_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::Null => Some(Decimal::ZERO),
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s),
        _ => None,
    }
}

/// Parse a decimal, tolerating thousands commas and surrounding whitespace
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return Some(Decimal::ZERO);
    }
    Decimal::from_str(&cleaned)
        .ok()
        .or_else(|| Decimal::from_scientific(&cleaned).ok())
}

/// Parse the date forms the backend emits
///
/// Accepts `YYYY-MM-DD`, a datetime whose first ten characters are a date,
/// and a bare `YYYY-MM` which resolves according to `edge`.
pub fn parse_backend_date(raw: &str, edge: MonthEdge) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.len() >= 10 {
        if let Some(prefix) = raw.get(..10) {
            if let Ok(date) = NaiveDate::parse_from_str(prefix, "%Y-%m-%d") {
                return Some(date);
            }
        }
    }
    let first = NaiveDate::parse_from_str(&format!("{}-01", raw), "%Y-%m-%d").ok()?;
    match edge {
        MonthEdge::Start => Some(first),
        MonthEdge::End => last_day_of_month(first),
    }
}

/// Last calendar day of the month containing `date`
pub fn last_day_of_month(date: NaiveDate) -> Option<NaiveDate> {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).and_then(|d| d.pred_opt())
}

pub fn loose_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    bool_from_value(&value)
        .ok_or_else(|| de::Error::custom(format!("expected a boolean flag, got {}", value)))
}

pub fn loose_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    decimal_from_value(&value)
        .ok_or_else(|| de::Error::custom(format!("expected an amount, got {}", value)))
}

pub fn loose_decimal_opt<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    decimal_from_value(&value)
        .map(Some)
        .ok_or_else(|| de::Error::custom(format!("expected an amount, got {}", value)))
}

pub fn loose_decimal_vec<'de, D>(deserializer: D) -> Result<Vec<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    values
        .iter()
        .map(|v| {
            decimal_from_value(v)
                .ok_or_else(|| de::Error::custom(format!("expected an amount, got {}", v)))
        })
        .collect()
}

/// Ids and codes: numbers and strings both become strings, null becomes empty
pub fn loose_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(de::Error::custom(format!("expected a string or number, got {}", other))),
    }
}

fn date_with_edge<'de, D>(deserializer: D, edge: MonthEdge) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_backend_date(&raw, edge)
        .ok_or_else(|| de::Error::custom(format!("invalid date '{}'", raw)))
}

pub fn loose_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    date_with_edge(deserializer, MonthEdge::Start)
}

pub fn month_start<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    date_with_edge(deserializer, MonthEdge::Start)
}

pub fn month_end<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    date_with_edge(deserializer, MonthEdge::End)
}

pub fn loose_date_opt<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => parse_backend_date(&raw, MonthEdge::Start)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid date '{}'", raw))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_bool_forms() {
        for truthy in [json!(true), json!(1), json!("1"), json!("true"), json!("Yes")] {
            assert_eq!(bool_from_value(&truthy), Some(true), "{}", truthy);
        }
        for falsy in [json!(false), json!(0), json!("0"), json!("false"), json!(null), json!("")] {
            assert_eq!(bool_from_value(&falsy), Some(false), "{}", falsy);
        }
        assert_eq!(bool_from_value(&json!("maybe")), None);
        assert_eq!(bool_from_value(&json!([1])), None);
    }

    #[test]
    fn test_numeric_and_string_zero_agree() {
        assert_eq!(decimal_from_value(&json!(0)), decimal_from_value(&json!("0")));
        assert_eq!(decimal_from_value(&json!("0.00")), Some(Decimal::ZERO));
        assert_eq!(decimal_from_value(&json!(null)), Some(Decimal::ZERO));
    }

    #[test]
    fn test_decimal_forms() {
        assert_eq!(decimal_from_value(&json!("1,234.50")), Some(Decimal::new(123450, 2)));
        assert_eq!(decimal_from_value(&json!(-50.25)), Some(Decimal::new(-5025, 2)));
        assert_eq!(decimal_from_value(&json!("abc")), None);
        assert_eq!(parse_decimal("1e3"), Some(Decimal::new(1000, 0)));
    }

    #[test]
    fn test_backend_dates() {
        assert_eq!(parse_backend_date("2024-04-01", MonthEdge::End), Some(ymd(2024, 4, 1)));
        assert_eq!(parse_backend_date("2025-03-31T00:00:00.000000Z", MonthEdge::Start), Some(ymd(2025, 3, 31)));
        assert_eq!(parse_backend_date("2025-03-31 18:30:00", MonthEdge::Start), Some(ymd(2025, 3, 31)));
        assert_eq!(parse_backend_date("2024-04", MonthEdge::Start), Some(ymd(2024, 4, 1)));
        assert_eq!(parse_backend_date("2025-03", MonthEdge::End), Some(ymd(2025, 3, 31)));
        assert_eq!(parse_backend_date("2024-02", MonthEdge::End), Some(ymd(2024, 2, 29)));
        assert_eq!(parse_backend_date("2024-12", MonthEdge::End), Some(ymd(2024, 12, 31)));
        assert_eq!(parse_backend_date("April", MonthEdge::Start), None);
    }

    #[derive(Debug, serde::Deserialize)]
    struct Sample {
        #[serde(deserialize_with = "loose_string")]
        id: String,
        #[serde(default, deserialize_with = "loose_decimal_opt")]
        balance: Option<Decimal>,
        #[serde(default, deserialize_with = "loose_decimal_vec")]
        amounts: Vec<Decimal>,
        #[serde(default, deserialize_with = "loose_date_opt")]
        date: Option<NaiveDate>,
    }

    #[test]
    fn test_field_deserializers() {
        let sample: Sample = serde_json::from_value(json!({
            "id": 42,
            "balance": null,
            "amounts": [1, "2.5", null],
            "date": ""
        }))
        .unwrap();
        assert_eq!(sample.id, "42");
        assert_eq!(sample.balance, None);
        assert_eq!(sample.amounts, vec![Decimal::ONE, Decimal::new(25, 1), Decimal::ZERO]);
        assert_eq!(sample.date, None);

        let sample: Sample = serde_json::from_value(json!({ "id": "L-7" })).unwrap();
        assert_eq!(sample.id, "L-7");
        assert!(sample.amounts.is_empty());
    }
}
