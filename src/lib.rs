//! # export-action
//!
//! Select records in an admin list view and export them, with related-field
//! drill-down, to XLSX, CSV, or HTML.
//!
//! The crate is the framework-independent core of that flow:
//! - **schema**: static model descriptions and the walker that partitions
//!   fields and resolves `__`-joined relation paths
//! - **report**: display fields (aggregates, grouping, totals, choices) and
//!   the builder pipeline with field-level permission checks
//! - **export**: CSV, XLSX-workbook and HTML-table serializers
//! - **action**: selection handoff and the end-to-end [`run_export`] entry
//!   point
//!
//! Backends are injected: a [`RecordStore`] for bulk projected reads, a
//! [`PermissionCheck`] oracle, and a [`SelectionStore`] for oversized id
//! selections. [`MemoryStore`] and [`MemorySelectionStore`] serve tests and
//! in-process embeddings.
//!
//! ## Examples
//!
//! ```
//! use export_action::prelude::*;
//!
//! let registry = SchemaRegistry::new().with_schema(
//!     ModelSchema::new("Publication", "news")
//!         .with_field(FieldDef::scalar("title", DataType::Text)),
//! );
//! let mut records = MemoryStore::new();
//! records.insert("Publication", StoredRecord::new(1).field("title", Value::text("A")));
//!
//! let selections = MemorySelectionStore::new();
//! let request = ExportRequest::new("Publication", stash_selection(&selections, vec![1]))
//!     .with_field("title")
//!     .with_format(ExportFormat::Csv);
//!
//! let (payload, diagnostic) =
//!     run_export(&registry, &records, &selections, &request, &AllowAll).unwrap();
//! assert_eq!(diagnostic, "");
//! assert_eq!(payload.row_count, 1);
//! ```

pub mod action;
pub mod error;
pub mod export;
pub mod permissions;
pub mod report;
pub mod schema;
pub mod store;
pub mod value;

pub use action::{
	ExportRequest, MemorySelectionStore, Selection, SelectionStore, run_export, stash_selection,
};
pub use error::{ExportError, ExportResult};
pub use export::{ExportFormat, ExportPayload};
pub use permissions::{AllowAll, PermissionCheck};
pub use report::builder::build_report;
pub use report::{Aggregate, DisplayField, ReportMatrix, ReportOptions};
pub use schema::{ModelSchema, SchemaRegistry};
pub use store::{MemoryStore, RecordStore, StoredRecord};
pub use value::Value;

/// Common imports for embedding the exporter
pub mod prelude {
	pub use crate::action::{
		ExportRequest, MemorySelectionStore, Selection, SelectionStore, run_export,
		stash_selection,
	};
	pub use crate::error::{ExportError, ExportResult};
	pub use crate::export::{ExportFormat, ExportPayload};
	pub use crate::permissions::{AllowAll, PermissionCheck};
	pub use crate::report::builder::build_report;
	pub use crate::report::{Aggregate, DisplayField, ReportMatrix, ReportOptions};
	pub use crate::schema::walker::{
		direct_fields, fields_at, fields_of, related_fields_at, relation_fields, resolve_path,
	};
	pub use crate::schema::{
		Cardinality, DataType, Direction, FieldDef, FieldKind, ModelSchema, SchemaRegistry,
	};
	pub use crate::store::{MemoryStore, RecordStore, StoredRecord};
	pub use crate::value::Value;
}
