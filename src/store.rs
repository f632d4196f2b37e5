//! Record store boundary.
//!
//! [`RecordStore::values_list`] is the single blocking read the report
//! builder performs: given a schema, an ordered id selection and the
//! surviving field paths, it returns one row per record (expanded across
//! to-many relations), columns aligned to the requested paths.
//!
//! [`MemoryStore`] is the in-process reference implementation used by tests
//! and simple embeddings. It mimics the left-join row expansion a relational
//! backend produces for projections that cross to-many relations.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::error::ExportResult;
use crate::schema::ModelSchema;
use crate::schema::walker::PATH_SEPARATOR;
use crate::value::Value;

/// Bulk projected read over a record backend
pub trait RecordStore {
	/// Read the records with the given ids, projecting exactly `paths`, in
	/// id order then relation order. Treated as atomic by the builder.
	fn values_list(
		&self,
		schema: &ModelSchema,
		ids: &[i64],
		paths: &[String],
	) -> ExportResult<Vec<Vec<Value>>>;
}

/// One stored record: scalar fields plus links to related records
#[derive(Debug, Clone, Default)]
pub struct StoredRecord {
	pub id: i64,
	fields: HashMap<String, Value>,
	links: HashMap<String, (String, Vec<i64>)>,
}

impl StoredRecord {
	/// Create a record with the given id
	pub fn new(id: i64) -> Self {
		Self {
			id,
			..Self::default()
		}
	}

	/// Set a scalar field
	pub fn field(mut self, name: impl Into<String>, value: Value) -> Self {
		self.fields.insert(name.into(), value);
		self
	}

	/// Link a relation field to records of `target_model`
	pub fn link(
		mut self,
		relation: impl Into<String>,
		target_model: impl Into<String>,
		ids: Vec<i64>,
	) -> Self {
		self.links.insert(relation.into(), (target_model.into(), ids));
		self
	}

	fn scalar(&self, name: &str) -> Value {
		if name == "id" || name == "pk" {
			return Value::Integer(self.id);
		}
		self.fields.get(name).cloned().unwrap_or(Value::Null)
	}
}

/// In-memory [`RecordStore`]
///
/// # Examples
///
/// ```
/// use export_action::store::{MemoryStore, StoredRecord};
/// use export_action::value::Value;
///
/// let mut store = MemoryStore::new();
/// store.insert("Publication", StoredRecord::new(1).field("title", Value::text("A")));
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
	records: HashMap<String, BTreeMap<i64, StoredRecord>>,
}

impl MemoryStore {
	/// Create an empty store
	pub fn new() -> Self {
		Self::default()
	}

	/// Insert a record under a model name
	pub fn insert(&mut self, model: impl Into<String>, record: StoredRecord) {
		self.records
			.entry(model.into())
			.or_default()
			.insert(record.id, record);
	}

	fn record(&self, model: &str, id: i64) -> Option<&StoredRecord> {
		self.records.get(model)?.get(&id)
	}

	/// Rows produced by one record for the given split paths, expanded
	/// across to-many links like a left join: no link yields a single row
	/// of nulls for that branch.
	fn project(&self, record: &StoredRecord, paths: &[Vec<&str>]) -> Vec<Vec<Value>> {
		// Column groups: scalars evaluate in place, multi-segment paths
		// group by their leading relation and expand recursively.
		let mut groups: Vec<(Option<&str>, Vec<usize>)> = Vec::new();
		for (col, path) in paths.iter().enumerate() {
			let head = if path.len() > 1 { Some(path[0]) } else { None };
			match groups.iter().position(|(h, _)| *h == head) {
				Some(i) => groups[i].1.push(col),
				None => groups.push((head, vec![col])),
			}
		}

		// Rows per group, over that group's column subset.
		let mut group_rows: Vec<(Vec<usize>, Vec<Vec<Value>>)> = Vec::new();
		for (head, cols) in groups {
			let rows = match head {
				None => {
					vec![
						cols.iter()
							.map(|&c| {
								paths[c].first().map_or(Value::Null, |name| record.scalar(name))
							})
							.collect(),
					]
				}
				Some(relation) => {
					let sub_paths: Vec<Vec<&str>> =
						cols.iter().map(|&c| paths[c][1..].to_vec()).collect();
					let mut rows = Vec::new();
					if let Some((target, ids)) = record.links.get(relation) {
						for id in ids {
							if let Some(linked) = self.record(target, *id) {
								rows.extend(self.project(linked, &sub_paths));
							}
						}
					}
					if rows.is_empty() {
						rows.push(vec![Value::Null; cols.len()]);
					}
					rows
				}
			};
			group_rows.push((cols, rows));
		}

		// Cartesian product across groups, cells put back in column order.
		let mut rows: Vec<Vec<Value>> = vec![vec![Value::Null; paths.len()]];
		for (cols, sub_rows) in group_rows {
			let mut expanded = Vec::with_capacity(rows.len() * sub_rows.len());
			for row in &rows {
				for sub_row in &sub_rows {
					let mut combined = row.clone();
					for (&col, cell) in cols.iter().zip(sub_row) {
						combined[col] = cell.clone();
					}
					expanded.push(combined);
				}
			}
			rows = expanded;
		}
		rows
	}
}

impl RecordStore for MemoryStore {
	fn values_list(
		&self,
		schema: &ModelSchema,
		ids: &[i64],
		paths: &[String],
	) -> ExportResult<Vec<Vec<Value>>> {
		let split: Vec<Vec<&str>> = paths
			.iter()
			.map(|p| p.split(PATH_SEPARATOR).filter(|s| !s.is_empty()).collect())
			.collect();
		let mut rows = Vec::new();
		for id in ids {
			if let Some(record) = self.record(&schema.name, *id) {
				rows.extend(self.project(record, &split));
			}
		}
		debug!(schema = %schema.name, selected = ids.len(), rows = rows.len(), "values_list read");
		Ok(rows)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::schema::{DataType, FieldDef, ModelSchema};

	fn publication_schema() -> ModelSchema {
		ModelSchema::new("Publication", "news")
			.with_field(FieldDef::scalar("title", DataType::Text))
	}

	#[test]
	fn projects_in_requested_order() {
		let mut store = MemoryStore::new();
		store.insert(
			"Publication",
			StoredRecord::new(1).field("title", Value::text("A")),
		);
		let rows = store
			.values_list(
				&publication_schema(),
				&[1],
				&["id".into(), "title".into()],
			)
			.unwrap();
		assert_eq!(rows, vec![vec![Value::Integer(1), Value::text("A")]]);
	}

	#[test]
	fn missing_ids_are_skipped() {
		let store = MemoryStore::new();
		let rows = store
			.values_list(&publication_schema(), &[7], &["title".into()])
			.unwrap();
		assert!(rows.is_empty());
	}

	#[test]
	fn to_many_paths_expand_rows() {
		let mut store = MemoryStore::new();
		store.insert("Tag", StoredRecord::new(1).field("name", Value::text("x")));
		store.insert("Tag", StoredRecord::new(2).field("name", Value::text("y")));
		store.insert(
			"Article",
			StoredRecord::new(10)
				.field("headline", Value::text("h"))
				.link("tags", "Tag", vec![1, 2]),
		);
		let schema = ModelSchema::new("Article", "news");
		let rows = store
			.values_list(&schema, &[10], &["headline".into(), "tags__name".into()])
			.unwrap();
		assert_eq!(
			rows,
			vec![
				vec![Value::text("h"), Value::text("x")],
				vec![Value::text("h"), Value::text("y")],
			]
		);
	}

	#[test]
	fn unlinked_relation_yields_null_cells() {
		let mut store = MemoryStore::new();
		store.insert(
			"Article",
			StoredRecord::new(10).field("headline", Value::text("h")),
		);
		let schema = ModelSchema::new("Article", "news");
		let rows = store
			.values_list(&schema, &[10], &["headline".into(), "tags__name".into()])
			.unwrap();
		assert_eq!(rows, vec![vec![Value::text("h"), Value::Null]]);
	}
}
