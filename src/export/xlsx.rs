//! XLSX workbook serializer.
//!
//! A matrix serializes to one sheet; a list of named matrices becomes one
//! sheet per entry. Header rows are bold, column widths optional, sheet
//! names sanitized to what the workbook format accepts.

use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use tracing::warn;

use crate::error::{ExportError, ExportResult};
use crate::value::Value;

/// Workbook input: a single sheet or one sheet per named group
#[derive(Debug, Clone)]
pub enum SheetData {
	Single(Vec<Vec<Value>>),
	Named(Vec<(String, Vec<Vec<Value>>)>),
}

/// Strip non-word characters and truncate to the 30-character sheet-name
/// limit; an empty result falls back to `report`.
///
/// # Examples
///
/// ```
/// use export_action::export::xlsx::sanitize_sheet_name;
///
/// assert_eq!(sanitize_sheet_name("My Report (v2)!"), "MyReportv2");
/// assert_eq!(sanitize_sheet_name("***"), "report");
/// ```
pub fn sanitize_sheet_name(name: &str) -> String {
	let cleaned: String = name
		.chars()
		.filter(|c| c.is_alphanumeric() || *c == '_')
		.take(30)
		.collect();
	if cleaned.is_empty() {
		"report".to_string()
	} else {
		cleaned
	}
}

/// XLSX exporter
pub struct XlsxExporter;

impl XlsxExporter {
	/// Serialize to workbook bytes.
	///
	/// `widths` sets explicit column widths on single-sheet output; named
	/// groups share the header but size their own columns.
	pub fn export(
		data: &SheetData,
		title: &str,
		header: Option<&[String]>,
		widths: Option<&[f64]>,
	) -> ExportResult<Vec<u8>> {
		let mut workbook = Workbook::new();
		match data {
			SheetData::Single(rows) => {
				let worksheet = workbook.add_worksheet();
				build_sheet(worksheet, rows, title, header, widths)?;
			}
			SheetData::Named(sheets) => {
				for (name, rows) in sheets {
					let worksheet = workbook.add_worksheet();
					build_sheet(worksheet, rows, name, header, None)?;
				}
			}
		}
		workbook
			.save_to_buffer()
			.map_err(|e| ExportError::SerializationError(format!("workbook: {e}")))
	}
}

fn build_sheet(
	worksheet: &mut Worksheet,
	rows: &[Vec<Value>],
	name: &str,
	header: Option<&[String]>,
	widths: Option<&[f64]>,
) -> ExportResult<()> {
	worksheet
		.set_name(sanitize_sheet_name(name))
		.map_err(|e| ExportError::SerializationError(format!("sheet name: {e}")))?;

	let mut first_row = 0u32;
	if let Some(header) = header {
		let bold = Format::new().set_bold();
		for (col, cell) in header.iter().enumerate() {
			worksheet
				.write_string_with_format(0, col as u16, cell.as_str(), &bold)
				.map_err(|e| ExportError::SerializationError(format!("header: {e}")))?;
			if let Some(widths) = widths {
				if let Some(width) = widths.get(col) {
					worksheet
						.set_column_width(col as u16, *width)
						.map_err(|e| ExportError::SerializationError(format!("width: {e}")))?;
				}
			}
		}
		first_row = 1;
	}

	for (r, row) in rows.iter().enumerate() {
		let row_index = first_row + r as u32;
		for (c, cell) in row.iter().enumerate() {
			if let Err(e) = write_cell(worksheet, row_index, c as u16, cell) {
				// Best effort: a cell the writer rejects becomes an
				// error marker instead of failing the export.
				warn!(row = row_index, column = c, error = %e, "cell write failed");
				let _ = worksheet.write_string(row_index, c as u16, format!("Error: {e}"));
			}
		}
	}
	Ok(())
}

fn write_cell(
	worksheet: &mut Worksheet,
	row: u32,
	col: u16,
	cell: &Value,
) -> Result<(), XlsxError> {
	match cell {
		Value::Null => Ok(()),
		Value::Boolean(b) => worksheet.write_boolean(row, col, *b).map(|_| ()),
		Value::Integer(i) => worksheet.write_number(row, col, *i as f64).map(|_| ()),
		Value::Float(f) => worksheet.write_number(row, col, *f).map(|_| ()),
		Value::Decimal(d) => match d.to_f64() {
			Some(f) => worksheet.write_number(row, col, f).map(|_| ()),
			None => worksheet.write_string(row, col, d.to_string()).map(|_| ()),
		},
		other => worksheet.write_string(row, col, other.to_text()).map(|_| ()),
	}
}
