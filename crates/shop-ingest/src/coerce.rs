//! Field coercion and shared row-level checks
//!
//! Empty cells and columns absent from the header both read as "no value";
//! the `required_*` accessors turn that into [`ValidationError::MissingField`].

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use shop_common::OrderStatus;

use crate::decoder::Row;
use crate::error::ValidationError;

type Result<T> = std::result::Result<T, ValidationError>;

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%#z"];
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Parse the timestamp shapes found in the exports.
///
/// Values without an offset are taken as UTC; a bare date is midnight UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in OFFSET_FORMATS {
        if let Ok(ts) = DateTime::parse_from_str(value, format) {
            return Some(ts.with_timezone(&Utc));
        }
    }

    let naive = value.strip_suffix(" UTC").unwrap_or(value);
    for format in NAIVE_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(naive, format) {
            return Some(ts.and_utc());
        }
    }

    NaiveDate::parse_from_str(naive, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|ts| ts.and_utc())
}

/// Typed accessors over a decoded row
pub struct Fields<'r> {
    row: &'r Row,
}

impl<'r> Fields<'r> {
    pub fn new(row: &'r Row) -> Self {
        Self { row }
    }

    fn cell(&self, field: &'static str) -> Option<&'r str> {
        self.row.get(field).filter(|v| !v.is_empty())
    }

    fn required(&self, field: &'static str) -> Result<&'r str> {
        self.cell(field)
            .ok_or(ValidationError::MissingField { field })
    }

    /// Free text, empty allowed
    pub fn text(&self, field: &'static str) -> String {
        self.cell(field).unwrap_or_default().to_string()
    }

    pub fn required_text(&self, field: &'static str) -> Result<String> {
        self.required(field).map(str::to_string)
    }

    pub fn integer(&self, field: &'static str) -> Result<i32> {
        parse_integer(field, self.required(field)?)
    }

    pub fn optional_integer(&self, field: &'static str) -> Result<Option<i32>> {
        self.cell(field).map(|v| parse_integer(field, v)).transpose()
    }

    pub fn number(&self, field: &'static str) -> Result<f64> {
        parse_number(field, self.required(field)?)
    }

    pub fn timestamp(&self, field: &'static str) -> Result<DateTime<Utc>> {
        to_timestamp(field, self.required(field)?)
    }

    pub fn optional_timestamp(&self, field: &'static str) -> Result<Option<DateTime<Utc>>> {
        self.cell(field).map(|v| to_timestamp(field, v)).transpose()
    }

    pub fn status(&self, field: &'static str) -> Result<OrderStatus> {
        let value = self.required(field)?;
        value
            .parse()
            .map_err(|_| ValidationError::InvalidStatus {
                field,
                value: value.to_string(),
            })
    }
}

fn parse_integer(field: &'static str, value: &str) -> Result<i32> {
    value.parse().map_err(|_| ValidationError::InvalidInteger {
        field,
        value: value.to_string(),
    })
}

fn parse_number(field: &'static str, value: &str) -> Result<f64> {
    match value.parse::<f64>() {
        Ok(number) if number.is_finite() => Ok(number),
        _ => Err(ValidationError::InvalidNumber {
            field,
            value: value.to_string(),
        }),
    }
}

fn to_timestamp(field: &'static str, value: &str) -> Result<DateTime<Utc>> {
    parse_timestamp(value).ok_or_else(|| ValidationError::InvalidTimestamp {
        field,
        value: value.to_string(),
    })
}

// ============================================================================
// Checks
// ============================================================================

pub fn latitude(field: &'static str, value: f64) -> Result<f64> {
    within(field, value, -90.0, 90.0, "[-90, 90]")
}

pub fn longitude(field: &'static str, value: f64) -> Result<f64> {
    within(field, value, -180.0, 180.0, "[-180, 180]")
}

pub fn non_negative(field: &'static str, value: f64) -> Result<f64> {
    if value < 0.0 {
        return Err(ValidationError::OutOfRange {
            field,
            value: value.to_string(),
            expected: "[0, ∞)",
        });
    }
    Ok(value)
}

pub fn non_negative_count(field: &'static str, value: i32) -> Result<i32> {
    if value < 0 {
        return Err(ValidationError::OutOfRange {
            field,
            value: value.to_string(),
            expected: "[0, ∞)",
        });
    }
    Ok(value)
}

fn within(field: &'static str, value: f64, min: f64, max: f64, expected: &'static str) -> Result<f64> {
    if !(min..=max).contains(&value) {
        return Err(ValidationError::OutOfRange {
            field,
            value: value.to_string(),
            expected,
        });
    }
    Ok(value)
}

/// `later` must not precede `earlier` when both are present
pub fn not_before(
    earlier: (&'static str, Option<DateTime<Utc>>),
    later: (&'static str, Option<DateTime<Utc>>),
) -> Result<()> {
    match (earlier.1, later.1) {
        (Some(first), Some(second)) if second < first => Err(ValidationError::OutOfOrder {
            earlier: earlier.0,
            later: later.0,
        }),
        _ => Ok(()),
    }
}

/// Check the created/shipped/delivered chain and the returned_at rule
pub fn lifecycle(
    status: OrderStatus,
    created_at: DateTime<Utc>,
    shipped_at: Option<DateTime<Utc>>,
    delivered_at: Option<DateTime<Utc>>,
    returned_at: Option<DateTime<Utc>>,
) -> Result<()> {
    not_before(("created_at", Some(created_at)), ("shipped_at", shipped_at))?;
    not_before(("created_at", Some(created_at)), ("delivered_at", delivered_at))?;
    not_before(("shipped_at", shipped_at), ("delivered_at", delivered_at))?;

    if returned_at.is_some() && status != OrderStatus::Returned {
        return Err(ValidationError::ReturnedWithoutReturnStatus { status });
    }
    Ok(())
}
