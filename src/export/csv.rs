//! CSV serializer

use csv::WriterBuilder;

use crate::error::{ExportError, ExportResult};
use crate::value::Value;

/// CSV exporter
pub struct CsvExporter;

impl CsvExporter {
	/// Serialize rows to RFC 4180 CSV bytes, UTF-8 encoded.
	///
	/// # Examples
	///
	/// ```
	/// use export_action::export::csv::CsvExporter;
	/// use export_action::value::Value;
	///
	/// let header = vec!["title".to_string()];
	/// let rows = vec![vec![Value::text("A")], vec![Value::Integer(7)]];
	/// let bytes = CsvExporter::export(Some(&header), &rows).unwrap();
	/// assert_eq!(String::from_utf8(bytes).unwrap(), "title\nA\n7\n");
	/// ```
	pub fn export(header: Option<&[String]>, rows: &[Vec<Value>]) -> ExportResult<Vec<u8>> {
		// Flexible: a totals row carries one extra marker cell.
		let mut writer = WriterBuilder::new().flexible(true).from_writer(Vec::new());

		if let Some(header) = header {
			writer
				.write_record(header)
				.map_err(|e| ExportError::SerializationError(format!("CSV header: {e}")))?;
		}

		for row in rows {
			let cells: Vec<String> = row.iter().map(Value::to_text).collect();
			writer
				.write_record(&cells)
				.map_err(|e| ExportError::SerializationError(format!("CSV row: {e}")))?;
		}

		writer
			.into_inner()
			.map_err(|e| ExportError::SerializationError(format!("CSV flush: {e}")))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn quotes_cells_containing_delimiters() {
		let rows = vec![vec![Value::text("a,b"), Value::text("plain")]];
		let bytes = CsvExporter::export(None, &rows).unwrap();
		assert_eq!(String::from_utf8(bytes).unwrap(), "\"a,b\",plain\n");
	}

	#[test]
	fn non_text_cells_are_coerced() {
		let rows = vec![vec![
			Value::Null,
			Value::Boolean(true),
			Value::Json(serde_json::json!({"k": "v"})),
		]];
		let bytes = CsvExporter::export(None, &rows).unwrap();
		assert_eq!(
			String::from_utf8(bytes).unwrap(),
			",true,\"{\"\"k\"\":\"\"v\"\"}\"\n"
		);
	}
}
