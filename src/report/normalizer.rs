use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Value;

/// Columns whose reference value sits above this are treated as 0–100 scale.
fn unit_threshold() -> Decimal {
    Decimal::new(15, 1) // 1.5
}

/// Parse a raw payload value into a decimal. Numbers and numeric strings
/// parse; anything else (bool, null, garbage text) is absent.
pub fn parse_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => parse_str(&n.to_string()),
        Value::String(s) => parse_str(s.trim()),
        _ => None,
    }
}

fn parse_str(s: &str) -> Option<Decimal> {
    if s.is_empty() {
        return None;
    }
    Decimal::from_str(s)
        .ok()
        .or_else(|| Decimal::from_scientific(s).ok())
}

/// Parse a whole column of raw values.
pub fn parse_column(values: &[Value]) -> Vec<Option<Decimal>> {
    values.iter().map(parse_decimal).collect()
}

/// Scale factor that brings a ratio column into 0–1.
///
/// Only the first parseable value is inspected: above 1.5 means the column
/// is in whole percent.
pub fn infer_percent_scale(values: &[Option<Decimal>]) -> Decimal {
    match values.iter().flatten().next() {
        Some(first) if first.abs() > unit_threshold() => Decimal::new(1, 2),
        _ => Decimal::ONE,
    }
}

/// Scale factor that brings a price column into cents.
///
/// Uses the median of the parseable values: at or below 1.5 means the
/// column holds 0–1 fractions.
pub fn infer_cents_scale(values: &[Option<Decimal>]) -> Decimal {
    match median(values) {
        Some(m) if m <= unit_threshold() => Decimal::ONE_HUNDRED,
        _ => Decimal::ONE,
    }
}

pub fn normalize_percent(values: &[Option<Decimal>]) -> Vec<Option<Decimal>> {
    apply_scale(values, infer_percent_scale(values))
}

pub fn normalize_cents(values: &[Option<Decimal>]) -> Vec<Option<Decimal>> {
    apply_scale(values, infer_cents_scale(values))
}

/// A value whose scaled form does not fit in a `Decimal` becomes absent.
fn apply_scale(values: &[Option<Decimal>], factor: Decimal) -> Vec<Option<Decimal>> {
    values
        .iter()
        .map(|v| v.and_then(|x| x.checked_mul(factor)))
        .collect()
}

fn median(values: &[Option<Decimal>]) -> Option<Decimal> {
    let mut present: Vec<Decimal> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        return None;
    }
    present.sort();

    let mid = present.len() / 2;
    if present.len() % 2 == 0 {
        let (lo, hi) = (present[mid - 1], present[mid]);
        let mean = match lo.checked_add(hi) {
            Some(sum) => sum / Decimal::TWO,
            None => lo / Decimal::TWO + hi / Decimal::TWO,
        };
        Some(mean)
    } else {
        Some(present[mid])
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
