//! Static schema descriptions.
//!
//! A [`ModelSchema`] describes one record type: its scalar fields (with
//! declared type and optional choice set) and its relations (target schema,
//! cardinality, direction). Schemas are declared once, collected into a
//! [`SchemaRegistry`] and passed by shared reference per request; nothing in
//! this module mutates after registration.

pub mod walker;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{ExportError, ExportResult};
use crate::value::Value;

/// Declared type of a scalar field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
	Boolean,
	Integer,
	Float,
	Decimal,
	Text,
	Date,
	DateTime,
	Json,
}

/// Relation cardinality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cardinality {
	OneToOne,
	ManyToOne,
	OneToMany,
	ManyToMany,
}

/// Relation direction: declared on this schema or reaching back from the
/// related one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
	Forward,
	Reverse,
}

/// Field kind: scalar column or relation to another schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldKind {
	Scalar {
		data_type: DataType,
		/// Enumerated `(stored value, human label)` pairs
		choices: Option<Vec<(Value, String)>>,
	},
	Relation {
		/// Registry name of the related schema
		target: String,
		cardinality: Cardinality,
		direction: Direction,
	},
}

/// A single field of a [`ModelSchema`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
	pub name: String,
	pub verbose_name: Option<String>,
	pub kind: FieldKind,
}

impl FieldDef {
	/// Declare a scalar field
	///
	/// # Examples
	///
	/// ```
	/// use export_action::schema::{DataType, FieldDef};
	///
	/// let field = FieldDef::scalar("title", DataType::Text);
	/// assert!(!field.is_relation());
	/// ```
	pub fn scalar(name: impl Into<String>, data_type: DataType) -> Self {
		Self {
			name: name.into(),
			verbose_name: None,
			kind: FieldKind::Scalar {
				data_type,
				choices: None,
			},
		}
	}

	/// Declare a relation field
	pub fn relation(
		name: impl Into<String>,
		target: impl Into<String>,
		cardinality: Cardinality,
		direction: Direction,
	) -> Self {
		Self {
			name: name.into(),
			verbose_name: None,
			kind: FieldKind::Relation {
				target: target.into(),
				cardinality,
				direction,
			},
		}
	}

	/// Attach a choice set to a scalar field; no-op on relations
	pub fn with_choices(mut self, choices: Vec<(Value, String)>) -> Self {
		if let FieldKind::Scalar {
			choices: ref mut slot,
			..
		} = self.kind
		{
			*slot = Some(choices);
		}
		self
	}

	/// Set the human-readable name
	pub fn with_verbose_name(mut self, verbose_name: impl Into<String>) -> Self {
		self.verbose_name = Some(verbose_name.into());
		self
	}

	/// Check whether this field is a relation
	pub fn is_relation(&self) -> bool {
		matches!(self.kind, FieldKind::Relation { .. })
	}

	/// Choice set of a scalar field, if any
	pub fn choices(&self) -> Option<&[(Value, String)]> {
		match &self.kind {
			FieldKind::Scalar { choices, .. } => choices.as_deref(),
			FieldKind::Relation { .. } => None,
		}
	}
}

/// Structural description of one record type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSchema {
	pub name: String,
	pub app_label: String,
	pub fields: Vec<FieldDef>,
}

impl ModelSchema {
	/// Create a schema with no fields
	pub fn new(name: impl Into<String>, app_label: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			app_label: app_label.into(),
			fields: Vec::new(),
		}
	}

	/// Append a field
	pub fn with_field(mut self, field: FieldDef) -> Self {
		self.fields.push(field);
		self
	}

	/// Look up a field by name
	pub fn field(&self, name: &str) -> Option<&FieldDef> {
		self.fields.iter().find(|f| f.name == name)
	}
}

/// Read-only collection of registered schemas, built once and passed by
/// reference per request.
///
/// # Examples
///
/// ```
/// use export_action::schema::{DataType, FieldDef, ModelSchema, SchemaRegistry};
///
/// let registry = SchemaRegistry::new().with_schema(
///     ModelSchema::new("Publication", "news")
///         .with_field(FieldDef::scalar("title", DataType::Text)),
/// );
/// assert!(registry.get("Publication").is_some());
/// assert!(registry.get("Missing").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
	schemas: HashMap<String, ModelSchema>,
}

impl SchemaRegistry {
	/// Create an empty registry
	pub fn new() -> Self {
		Self::default()
	}

	/// Register a schema under its own name
	pub fn with_schema(mut self, schema: ModelSchema) -> Self {
		self.schemas.insert(schema.name.clone(), schema);
		self
	}

	/// Look up a schema by name
	pub fn get(&self, name: &str) -> Option<&ModelSchema> {
		self.schemas.get(name)
	}

	/// Look up a schema named by a caller; absence is a configuration
	/// error, unlike the tolerant path resolution in the walker.
	pub fn expect(&self, name: &str) -> ExportResult<&ModelSchema> {
		self.schemas
			.get(name)
			.ok_or_else(|| ExportError::ModelNotRegistered(name.to_string()))
	}
}
