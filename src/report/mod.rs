//! Report request and output types.
//!
//! A [`DisplayField`] names one output column: a relation-crossing field path
//! plus presentation metadata (aggregate, grouping, running total, choice
//! mapping, format string). The builder in [`builder`] turns a selection and
//! a list of display fields into a [`ReportMatrix`].

pub mod builder;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::schema::walker::PATH_SEPARATOR;
use crate::value::Value;

/// Aggregate function applied to a column once grouping is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Aggregate {
	Avg,
	Min,
	Max,
	Count,
	Sum,
}

impl Aggregate {
	/// Fold a column of grouped values into one cell.
	///
	/// Nulls are ignored, matching SQL aggregate semantics; an all-null
	/// group yields null (zero for `Count`).
	pub fn apply(&self, values: &[Value]) -> Value {
		let present: Vec<&Value> = values.iter().filter(|v| !v.is_null()).collect();
		match self {
			Aggregate::Count => Value::Integer(present.len() as i64),
			Aggregate::Min => present
				.iter()
				.min_by_key(|v| v.sort_key())
				.map(|v| (*v).clone())
				.unwrap_or(Value::Null),
			Aggregate::Max => present
				.iter()
				.max_by_key(|v| v.sort_key())
				.map(|v| (*v).clone())
				.unwrap_or(Value::Null),
			Aggregate::Sum => {
				let sum: Decimal = present.iter().filter_map(|v| v.as_decimal()).sum();
				Value::Decimal(sum)
			}
			Aggregate::Avg => {
				let numeric: Vec<Decimal> =
					present.iter().filter_map(|v| v.as_decimal()).collect();
				if numeric.is_empty() {
					Value::Null
				} else {
					let sum: Decimal = numeric.iter().sum();
					Value::Decimal(sum / Decimal::from(numeric.len() as i64))
				}
			}
		}
	}
}

/// One requested output column
///
/// # Examples
///
/// ```
/// use export_action::report::{Aggregate, DisplayField};
///
/// let field = DisplayField::new("reporter__first_name")
///     .with_aggregate(Aggregate::Count)
///     .with_total();
///
/// assert_eq!(field.split(), ("reporter__".to_string(), "first_name".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayField {
	/// Full `__`-joined field path
	pub path: String,
	/// Column label; falls back to the path
	pub label: Option<String>,
	/// Aggregate applied when grouping is active
	pub aggregate: Option<Aggregate>,
	/// Group rows by this column
	pub group: bool,
	/// Maintain a running total for this column
	pub total: bool,
	/// `(stored value, label)` substitution pairs
	pub choices: Option<Vec<(Value, String)>>,
	/// chrono format string applied to date and datetime cells
	pub format: Option<String>,
}

impl DisplayField {
	/// Create a display field for a path with no presentation metadata
	pub fn new(path: impl Into<String>) -> Self {
		Self {
			path: path.into(),
			label: None,
			aggregate: None,
			group: false,
			total: false,
			choices: None,
			format: None,
		}
	}

	/// Set the column label
	pub fn with_label(mut self, label: impl Into<String>) -> Self {
		self.label = Some(label.into());
		self
	}

	/// Set the aggregate function
	pub fn with_aggregate(mut self, aggregate: Aggregate) -> Self {
		self.aggregate = Some(aggregate);
		self
	}

	/// Mark as a group-by column
	pub fn with_group(mut self) -> Self {
		self.group = true;
		self
	}

	/// Mark for running-total accumulation
	pub fn with_total(mut self) -> Self {
		self.total = true;
		self
	}

	/// Attach a choice substitution set
	pub fn with_choices(mut self, choices: Vec<(Value, String)>) -> Self {
		self.choices = Some(choices);
		self
	}

	/// Attach a chrono format string for date/datetime cells
	pub fn with_format(mut self, format: impl Into<String>) -> Self {
		self.format = Some(format.into());
		self
	}

	/// Column label for the output header
	pub fn header(&self) -> &str {
		self.label.as_deref().unwrap_or(&self.path)
	}

	/// Split the path into `(relation prefix, terminal field name)`.
	///
	/// The prefix keeps its trailing separator, matching the stored legacy
	/// path format.
	pub fn split(&self) -> (String, String) {
		match self.path.rsplit_once(PATH_SEPARATOR) {
			Some((prefix, field)) => (format!("{prefix}{PATH_SEPARATOR}"), field.to_string()),
			None => (String::new(), self.path.clone()),
		}
	}
}

impl From<&str> for DisplayField {
	fn from(path: &str) -> Self {
		DisplayField::new(path)
	}
}

impl From<String> for DisplayField {
	fn from(path: String) -> Self {
		DisplayField::new(path)
	}
}

/// Execution switches for one report run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportOptions {
	/// Cap data rows at [`builder::PREVIEW_ROW_LIMIT`]
	pub preview: bool,
	/// Post-hoc stable sort: `(column index, descending)` pairs in
	/// declaration order
	pub sort: Vec<(usize, bool)>,
}

impl ReportOptions {
	/// Default options: full output, no sort
	pub fn new() -> Self {
		Self::default()
	}

	/// Enable the preview row cap
	pub fn with_preview(mut self) -> Self {
		self.preview = true;
		self
	}

	/// Add a sort directive on a column position
	pub fn with_sort(mut self, column: usize, descending: bool) -> Self {
		self.sort.push((column, descending));
		self
	}
}

/// Builder output: header, data rows and the optional trailing totals row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMatrix {
	/// Column labels for the surviving fields, in request order
	pub header: Vec<String>,
	/// Data rows, cells aligned to `header`; a totals run appends one
	/// trailing row carrying the sums and a `TOTALS` marker cell
	pub rows: Vec<Vec<Value>>,
}

impl ReportMatrix {
	/// An empty matrix with no columns
	pub fn empty() -> Self {
		Self {
			header: Vec::new(),
			rows: Vec::new(),
		}
	}
}
