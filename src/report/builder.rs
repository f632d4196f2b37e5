//! Report builder: one linear pipeline from a record selection to a
//! [`ReportMatrix`].
//!
//! Stages: root permission gate, path normalization, per-field
//! authorization, bulk projection, optional grouping with aggregates, choice
//! substitution, running totals, preview cap and the legacy post-hoc sort.
//! Only the root gate exits early; every later stage degrades by dropping a
//! field or row instead of aborting the export.

use std::fmt::Write as _;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::error::ExportResult;
use crate::permissions::PermissionCheck;
use crate::report::{Aggregate, DisplayField, ReportMatrix, ReportOptions};
use crate::schema::walker::resolve_path;
use crate::schema::{FieldDef, ModelSchema, SchemaRegistry};
use crate::store::RecordStore;
use crate::value::{SortKey, Value};

/// Data-row cap applied in preview mode
pub const PREVIEW_ROW_LIMIT: usize = 50;

/// Diagnostic returned when the root schema itself is denied
pub const PERMISSION_DENIED: &str = "Permission Denied";

/// Marker cell appended to the trailing totals row
pub const TOTALS_LABEL: &str = "TOTALS";

/// Build a report over the records selected by `ids`.
///
/// Returns the matrix plus a diagnostic string; the diagnostic is empty on a
/// clean run, `"Permission Denied"` when the root schema is denied (with an
/// empty matrix, and no store read), and accumulates one
/// `Error: Permission denied on access to <field>.` line per dropped column
/// otherwise.
///
/// A `model` name missing from the registry is a caller configuration error
/// and fails hard, unlike the recoverable denials above.
pub fn build_report(
	registry: &SchemaRegistry,
	store: &dyn RecordStore,
	model: &str,
	ids: &[i64],
	display_fields: &[DisplayField],
	check: &dyn PermissionCheck,
	options: &ReportOptions,
) -> ExportResult<(ReportMatrix, String)> {
	let root = registry.expect(model)?;

	if !check.can_access(root) {
		warn!(model, "root access denied, skipping export");
		return Ok((ReportMatrix::empty(), PERMISSION_DENIED.to_string()));
	}

	// Resolve each path prefix to the schema owning the terminal field and
	// drop the columns whose owner the caller may not read.
	let mut diagnostic = String::new();
	let mut survivors: Vec<(&DisplayField, &ModelSchema, String)> = Vec::new();
	for field in display_fields {
		let (prefix, name) = field.split();
		let owner = resolve_path(registry, root, &prefix);
		if check.can_access(owner) {
			survivors.push((field, owner, name));
		} else {
			warn!(owner = %owner.name, path = %field.path, "field dropped: permission denied");
			let _ = write!(
				diagnostic,
				"Error: Permission denied on access to {prefix}{name}."
			);
		}
	}

	let paths: Vec<String> = survivors.iter().map(|(f, _, _)| f.path.clone()).collect();
	let mut rows = store.values_list(root, ids, &paths)?;
	debug!(model, columns = paths.len(), rows = rows.len(), "projection read");

	if survivors.iter().any(|(f, _, _)| f.group) {
		rows = group_rows(&survivors, rows);
	}

	substitute_choices(&survivors, &mut rows);

	if options.preview {
		rows.truncate(PREVIEW_ROW_LIMIT);
	}

	for &(column, descending) in options.sort.iter().rev() {
		rows.sort_by(|a, b| {
			let ka = a.get(column).map_or(SortKey::Missing, Value::sort_key);
			let kb = b.get(column).map_or(SortKey::Missing, Value::sort_key);
			let ordering = ka.cmp(&kb);
			if descending { ordering.reverse() } else { ordering }
		});
	}

	append_totals(&survivors, &mut rows);

	let header = survivors
		.iter()
		.map(|(f, _, _)| f.header().to_string())
		.collect();
	Ok((ReportMatrix { header, rows }, diagnostic))
}

/// Group rows by the group-flagged columns and fold every other column with
/// its aggregate; columns without an explicit aggregate get `Max` once
/// grouping is active.
fn group_rows(
	survivors: &[(&DisplayField, &ModelSchema, String)],
	rows: Vec<Vec<Value>>,
) -> Vec<Vec<Value>> {
	let group_columns: Vec<usize> = survivors
		.iter()
		.enumerate()
		.filter(|(_, (f, _, _))| f.group)
		.map(|(i, _)| i)
		.collect();

	// First-seen key order keeps the grouped output deterministic.
	let mut groups: Vec<(Vec<Value>, Vec<Vec<Value>>)> = Vec::new();
	for row in rows {
		let key: Vec<Value> = group_columns
			.iter()
			.map(|&c| row.get(c).cloned().unwrap_or(Value::Null))
			.collect();
		match groups.iter().position(|(k, _)| *k == key) {
			Some(i) => groups[i].1.push(row),
			None => groups.push((key, vec![row])),
		}
	}

	groups
		.into_iter()
		.map(|(key, members)| {
			survivors
				.iter()
				.enumerate()
				.map(|(column, (field, _, _))| {
					if field.group {
						let position = group_columns.iter().position(|&c| c == column);
						position.map_or(Value::Null, |p| key[p].clone())
					} else {
						let aggregate = field.aggregate.unwrap_or(Aggregate::Max);
						let column_values: Vec<Value> = members
							.iter()
							.map(|row| row.get(column).cloned().unwrap_or(Value::Null))
							.collect();
						aggregate.apply(&column_values)
					}
				})
				.collect()
		})
		.collect()
}

/// Replace raw stored values with their choice labels and apply date format
/// strings. Unmapped and null values render as empty text, never an error.
fn substitute_choices(survivors: &[(&DisplayField, &ModelSchema, String)], rows: &mut [Vec<Value>]) {
	for (column, (field, owner, name)) in survivors.iter().enumerate() {
		let schema_choices = owner.field(name).and_then(FieldDef::choices);
		let choices = field.choices.as_deref().or(schema_choices);
		for row in rows.iter_mut() {
			let Some(cell) = row.get_mut(column) else {
				continue;
			};
			if let Some(choices) = choices {
				let label = choices
					.iter()
					.find(|(stored, _)| stored == cell)
					.map(|(_, label)| label.clone())
					.unwrap_or_default();
				*cell = Value::Text(label);
			} else if let Some(format) = &field.format {
				*cell = apply_format(cell, format);
			}
		}
	}
}

fn apply_format(cell: &Value, format: &str) -> Value {
	let formatted = match cell {
		Value::Date(d) => render_format(d.format(format)),
		Value::DateTime(dt) => render_format(dt.format(format)),
		_ => return cell.clone(),
	};
	match formatted {
		Some(text) => Value::Text(text),
		None => cell.clone(),
	}
}

// chrono reports bad specifiers through fmt::Error; capture instead of panic.
fn render_format(delayed: impl std::fmt::Display) -> Option<String> {
	let mut out = String::new();
	write!(out, "{delayed}").ok()?;
	Some(out)
}

/// Accumulate totals over the emitted rows and append the trailing labeled
/// row: sums under totaled columns, blanks elsewhere, plus a marker cell.
fn append_totals(survivors: &[(&DisplayField, &ModelSchema, String)], rows: &mut Vec<Vec<Value>>) {
	if !survivors.iter().any(|(f, _, _)| f.total) {
		return;
	}
	let mut sums = vec![Decimal::ZERO; survivors.len()];
	for row in rows.iter() {
		for (column, (field, _, _)) in survivors.iter().enumerate() {
			if field.total {
				if let Some(cell) = row.get(column) {
					sums[column] += cell.total_contribution();
				}
			}
		}
	}
	let mut totals_row: Vec<Value> = survivors
		.iter()
		.enumerate()
		.map(|(column, (field, _, _))| {
			if field.total {
				Value::Decimal(sums[column])
			} else {
				Value::text("")
			}
		})
		.collect();
	totals_row.push(Value::text(TOTALS_LABEL));
	rows.push(totals_row);
}
