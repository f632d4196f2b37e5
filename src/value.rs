//! Cell value type shared by the record store, report builder and serializers.
//!
//! Mirrors the set of column types the admin exporter has to carry: nulls,
//! booleans, integers, floats, exact decimals, text, dates, datetimes and
//! json blobs. Every variant coerces to text without failing, so serializers
//! never reject a cell.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A single cell value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
	Null,
	Boolean(bool),
	Integer(i64),
	Float(f64),
	Decimal(Decimal),
	Text(String),
	Date(NaiveDate),
	DateTime(NaiveDateTime),
	Json(JsonValue),
}

impl Value {
	/// Convenience constructor for text cells
	pub fn text(s: impl Into<String>) -> Self {
		Value::Text(s.into())
	}

	/// Check for null
	pub fn is_null(&self) -> bool {
		matches!(self, Value::Null)
	}

	/// Best-effort text coercion; never fails.
	///
	/// Nulls render as the empty string, json values as their compact
	/// serialized form.
	///
	/// # Examples
	///
	/// ```
	/// use export_action::value::Value;
	///
	/// assert_eq!(Value::Null.to_text(), "");
	/// assert_eq!(Value::Integer(42).to_text(), "42");
	/// assert_eq!(Value::text("hi").to_text(), "hi");
	/// ```
	pub fn to_text(&self) -> String {
		match self {
			Value::Null => String::new(),
			Value::Boolean(b) => b.to_string(),
			Value::Integer(i) => i.to_string(),
			Value::Float(f) => f.to_string(),
			Value::Decimal(d) => d.to_string(),
			Value::Text(s) => s.clone(),
			Value::Date(d) => d.to_string(),
			Value::DateTime(dt) => dt.to_string(),
			Value::Json(j) => j.to_string(),
		}
	}

	/// Numeric view, if the value carries one (booleans count as 1/0)
	pub fn as_decimal(&self) -> Option<Decimal> {
		match self {
			Value::Boolean(b) => Some(Decimal::from(*b as i64)),
			Value::Integer(i) => Some(Decimal::from(*i)),
			Value::Float(f) => Decimal::from_f64(*f),
			Value::Decimal(d) => Some(*d),
			_ => None,
		}
	}

	/// Contribution of this cell to a running total.
	///
	/// Numeric values contribute their numeric value, booleans 1 or 0,
	/// non-numeric present values 1 (count-of-present), nulls and empty
	/// strings 0.
	pub fn total_contribution(&self) -> Decimal {
		if let Some(d) = self.as_decimal() {
			return d;
		}
		match self {
			Value::Null => Decimal::ZERO,
			Value::Text(s) if s.is_empty() => Decimal::ZERO,
			// float NaN falls through as_decimal
			Value::Float(_) => Decimal::ZERO,
			_ => Decimal::ONE,
		}
	}

	/// Total order used by the legacy post-hoc sort and by min/max
	/// aggregates. Nulls sort below every typed value, which gives them
	/// minimum-sentinel semantics (earliest date, empty string) under a
	/// stable ascending sort.
	pub fn sort_key(&self) -> SortKey {
		match self {
			Value::Null => SortKey::Missing,
			Value::Boolean(b) => SortKey::Number(Decimal::from(*b as i64)),
			Value::Integer(i) => SortKey::Number(Decimal::from(*i)),
			Value::Float(f) => Decimal::from_f64(*f).map_or(SortKey::Missing, SortKey::Number),
			Value::Decimal(d) => SortKey::Number(*d),
			Value::Date(d) => SortKey::Instant(d.and_hms_opt(0, 0, 0).unwrap_or_default()),
			Value::DateTime(dt) => SortKey::Instant(*dt),
			Value::Text(s) => SortKey::Text(s.clone()),
			Value::Json(j) => SortKey::Text(j.to_string()),
		}
	}
}

/// Comparable projection of a [`Value`].
///
/// Heterogeneous cells compare by variant rank, so sorting a mixed column
/// never panics.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey {
	Missing,
	Number(Decimal),
	Instant(NaiveDateTime),
	Text(String),
}
