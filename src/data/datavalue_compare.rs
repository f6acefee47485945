//! Column-aware ordering of cell values.
//!
//! Three orderings exist: numeric, date and text. Invalid numbers and
//! unparsable dates sort after every valid value in ascending order.
//!
//! When a column carries no [`ColumnKind`], [`compare_values`] chooses the
//! ordering per call from the two operands: two numeric values compare
//! numerically, anything else compares as text.
//!
//! That per-pair rule is not a total order over a mixed column (`9 < 10`
//! numerically, yet `"10" < "5x" < "9"` as text), so sorting never uses it
//! directly. A sort first fixes one kind for the whole untyped column with
//! [`resolve_sort_kind`]: numeric when every non-blank value is a number,
//! text otherwise.

use crate::data::datatable::{ColumnKind, DataValue};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::cmp::Ordering;
use unicase::UniCase;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

/// Compare two values under an optional column kind
pub fn compare_values(a: &DataValue, b: &DataValue, kind: Option<ColumnKind>) -> Ordering {
    match kind {
        Some(ColumnKind::Number) => compare_numbers(numeric_value(a), numeric_value(b)),
        Some(ColumnKind::Date) => compare_dates(a, b),
        Some(ColumnKind::Text) => compare_text(&a.to_string(), &b.to_string()),
        None => match (a, b) {
            (DataValue::Integer(x), DataValue::Integer(y)) => x.cmp(y),
            _ => match (a.as_number(), b.as_number()) {
                (Some(x), Some(y)) => compare_numbers(x, y),
                _ => compare_text(&a.to_string(), &b.to_string()),
            },
        },
    }
}

/// The single ordering used to sort an untyped column: `Number` when every
/// non-blank value is numeric (blanks then sort last), `Text` otherwise.
pub fn resolve_sort_kind<'a, I>(values: I) -> ColumnKind
where
    I: IntoIterator<Item = &'a DataValue>,
{
    let all_numeric = values
        .into_iter()
        .filter(|v| !v.is_null() && !matches!(v, DataValue::String(s) if s.is_empty()))
        .all(DataValue::is_numeric);

    if all_numeric {
        ColumnKind::Number
    } else {
        ColumnKind::Text
    }
}

/// Absent cells compare like `Null`
pub fn compare_optional_values(
    a: Option<&DataValue>,
    b: Option<&DataValue>,
    kind: Option<ColumnKind>,
) -> Ordering {
    let a = a.unwrap_or(&DataValue::Null);
    let b = b.unwrap_or(&DataValue::Null);
    compare_values(a, b, kind)
}

/// NaN is greater than every number and equal to itself
pub fn compare_numbers(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

/// Unparsable dates are greater than every valid date
pub fn compare_dates(a: &DataValue, b: &DataValue) -> Ordering {
    match (date_value(a), date_value(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Locale-style text ordering: case-insensitive first, then lowercase
/// before uppercase, then code points.
pub fn compare_text(a: &str, b: &str) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }
    UniCase::new(a)
        .cmp(&UniCase::new(b))
        .then_with(|| case_tiebreak(a, b))
}

fn case_tiebreak(a: &str, b: &str) -> Ordering {
    for (x, y) in a.chars().zip(b.chars()) {
        if x != y {
            return match (x.is_lowercase(), y.is_lowercase()) {
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                _ => x.cmp(&y),
            };
        }
    }
    a.len().cmp(&b.len())
}

fn numeric_value(value: &DataValue) -> f64 {
    match value {
        DataValue::Integer(i) => *i as f64,
        DataValue::Float(f) => *f,
        DataValue::String(s) | DataValue::DateTime(s) => s.trim().parse().unwrap_or(f64::NAN),
        DataValue::Boolean(_) | DataValue::Null => f64::NAN,
    }
}

fn date_value(value: &DataValue) -> Option<NaiveDateTime> {
    match value {
        DataValue::String(s) | DataValue::DateTime(s) => parse_datetime(s),
        _ => None,
    }
}

/// Parse the date/time shapes that show up in report files and listings
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}
