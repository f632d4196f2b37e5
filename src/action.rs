//! Admin-action entry point: selection handoff and end-to-end export.
//!
//! List-view actions collect the checked record ids. Small selections travel
//! in the request by value; selections past [`SELECTION_HANDOFF_THRESHOLD`]
//! are stashed in a [`SelectionStore`] and the request carries only the
//! token, keeping redirect URLs bounded.

use std::collections::HashMap;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::{ExportError, ExportResult};
use crate::export::csv::CsvExporter;
use crate::export::html::HtmlExporter;
use crate::export::xlsx::{SheetData, XlsxExporter};
use crate::export::{ExportFormat, ExportPayload, generate_filename};
use crate::permissions::PermissionCheck;
use crate::report::builder::build_report;
use crate::report::{DisplayField, ReportOptions};
use crate::schema::SchemaRegistry;
use crate::store::RecordStore;

/// Selections larger than this are stored out-of-band
pub const SELECTION_HANDOFF_THRESHOLD: usize = 1000;

/// The record selection carried by an export request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selection {
	/// Ids passed by value
	Ids(Vec<i64>),
	/// Token referencing an out-of-band stored id list
	Stored(String),
}

/// Out-of-band storage for large id selections
pub trait SelectionStore {
	/// Store an id list and return its token
	fn put(&self, ids: Vec<i64>) -> String;

	/// Remove and return the id list for a token
	fn take(&self, token: &str) -> Option<Vec<i64>>;
}

/// In-process [`SelectionStore`]
#[derive(Debug, Default)]
pub struct MemorySelectionStore {
	entries: RwLock<HashMap<String, Vec<i64>>>,
}

impl MemorySelectionStore {
	/// Create an empty store
	pub fn new() -> Self {
		Self::default()
	}
}

impl SelectionStore for MemorySelectionStore {
	fn put(&self, ids: Vec<i64>) -> String {
		let token = format!("export_action_{}", Uuid::new_v4());
		self.entries.write().insert(token.clone(), ids);
		token
	}

	fn take(&self, token: &str) -> Option<Vec<i64>> {
		self.entries.write().remove(token)
	}
}

/// Turn a raw id selection into the request payload: pass-through by value
/// up to the handoff threshold, a stored token above it.
///
/// # Examples
///
/// ```
/// use export_action::action::{MemorySelectionStore, Selection, stash_selection};
///
/// let store = MemorySelectionStore::new();
/// assert!(matches!(stash_selection(&store, vec![1, 2, 3]), Selection::Ids(_)));
/// assert!(matches!(
///     stash_selection(&store, (0..1001).collect()),
///     Selection::Stored(_)
/// ));
/// ```
pub fn stash_selection(store: &dyn SelectionStore, ids: Vec<i64>) -> Selection {
	if ids.len() > SELECTION_HANDOFF_THRESHOLD {
		debug!(count = ids.len(), "selection stored out-of-band");
		Selection::Stored(store.put(ids))
	} else {
		Selection::Ids(ids)
	}
}

/// One export request, as posted from the field-selection form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportRequest {
	/// Root schema name
	pub model: String,
	/// Selected record ids, by value or by token
	pub selection: Selection,
	/// Requested output columns
	pub fields: Vec<DisplayField>,
	/// Output format; defaults to the workbook format
	pub format: ExportFormat,
	/// Cap output for interactive preview
	pub preview: bool,
	/// Report title used for the download filename
	pub title: String,
}

impl ExportRequest {
	/// Create a request with defaults: xlsx, full output, title `report`
	pub fn new(model: impl Into<String>, selection: Selection) -> Self {
		Self {
			model: model.into(),
			selection,
			fields: Vec::new(),
			format: ExportFormat::default(),
			preview: false,
			title: "report".to_string(),
		}
	}

	/// Add an output column
	pub fn with_field(mut self, field: impl Into<DisplayField>) -> Self {
		self.fields.push(field.into());
		self
	}

	/// Set the output format
	pub fn with_format(mut self, format: ExportFormat) -> Self {
		self.format = format;
		self
	}

	/// Enable preview mode
	pub fn with_preview(mut self) -> Self {
		self.preview = true;
		self
	}

	/// Set the report title
	pub fn with_title(mut self, title: impl Into<String>) -> Self {
		self.title = title.into();
		self
	}
}

/// Run one export end to end: resolve the selection, build the report and
/// serialize it. Returns the payload and the builder diagnostic.
pub fn run_export(
	registry: &SchemaRegistry,
	records: &dyn RecordStore,
	selections: &dyn SelectionStore,
	request: &ExportRequest,
	check: &dyn PermissionCheck,
) -> ExportResult<(ExportPayload, String)> {
	let ids = match &request.selection {
		Selection::Ids(ids) => ids.clone(),
		Selection::Stored(token) => selections
			.take(token)
			.ok_or_else(|| ExportError::SelectionNotFound(token.clone()))?,
	};

	let mut options = ReportOptions::new();
	options.preview = request.preview;

	let (matrix, diagnostic) = build_report(
		registry,
		records,
		&request.model,
		&ids,
		&request.fields,
		check,
		&options,
	)?;

	let row_count = matrix.rows.len();
	let data = match request.format {
		ExportFormat::Csv => CsvExporter::export(Some(&matrix.header), &matrix.rows)?,
		ExportFormat::Html => HtmlExporter::export(Some(&matrix.header), &matrix.rows).into_bytes(),
		ExportFormat::Xlsx => XlsxExporter::export(
			&SheetData::Single(matrix.rows),
			&request.title,
			Some(&matrix.header),
			None,
		)?,
	};

	let payload = ExportPayload {
		data,
		mime_type: request.format.mime_type().to_string(),
		filename: generate_filename(&request.title, request.format.extension()),
		row_count,
	};
	debug!(
		model = %request.model,
		rows = payload.row_count,
		bytes = payload.size_bytes(),
		"export complete"
	);
	Ok((payload, diagnostic))
}
