//! Export formats and response payloads.
//!
//! Serializers take a matrix of [`Value`](crate::value::Value) cells plus an
//! optional header and produce bytes; every cell goes through best-effort
//! text or number coercion, so an odd cell type never fails an export.

pub mod csv;
pub mod html;
pub mod xlsx;

use chrono::Local;
use serde::{Deserialize, Serialize};

/// Export output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExportFormat {
	/// Comma-separated values, UTF-8
	Csv,
	/// Spreadsheet workbook
	#[default]
	Xlsx,
	/// HTML table fragment
	Html,
}

impl ExportFormat {
	/// Parse the request's format selector; anything unrecognized falls
	/// back to the default workbook format.
	///
	/// # Examples
	///
	/// ```
	/// use export_action::export::ExportFormat;
	///
	/// assert_eq!(ExportFormat::from_param("csv"), ExportFormat::Csv);
	/// assert_eq!(ExportFormat::from_param("html"), ExportFormat::Html);
	/// assert_eq!(ExportFormat::from_param("anything"), ExportFormat::Xlsx);
	/// ```
	pub fn from_param(param: &str) -> Self {
		match param {
			"csv" => ExportFormat::Csv,
			"html" => ExportFormat::Html,
			_ => ExportFormat::Xlsx,
		}
	}

	/// File extension including the leading dot
	pub fn extension(&self) -> &'static str {
		match self {
			ExportFormat::Csv => ".csv",
			ExportFormat::Xlsx => ".xlsx",
			ExportFormat::Html => ".html",
		}
	}

	/// MIME type for the response
	pub fn mime_type(&self) -> &'static str {
		match self {
			ExportFormat::Csv => "text/csv; charset=UTF-8",
			ExportFormat::Xlsx => {
				"application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
			}
			ExportFormat::Html => "text/html; charset=UTF-8",
		}
	}
}

/// Download filename: `<title>_<YYYY-MM-DD_HHMM><ext>`.
///
/// Anything after the first `.` in the title is dropped and spaces become
/// underscores; the extension is appended only when missing.
pub fn generate_filename(title: &str, ends_with: &str) -> String {
	let stem = title.split('.').next().unwrap_or(title).replace(' ', "_");
	let mut filename = format!("{stem}_{}", Local::now().format("%Y-%m-%d_%H%M"));
	if !filename.ends_with(ends_with) {
		filename.push_str(ends_with);
	}
	filename
}

/// Serialized export ready to hand to a response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportPayload {
	/// Serialized bytes
	pub data: Vec<u8>,
	/// MIME type
	pub mime_type: String,
	/// Suggested download filename
	pub filename: String,
	/// Number of data rows exported
	pub row_count: usize,
}

impl ExportPayload {
	/// Payload size in bytes
	pub fn size_bytes(&self) -> usize {
		self.data.len()
	}
}
