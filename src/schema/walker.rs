//! Schema introspection: field partitioning and relation-path resolution.
//!
//! Field paths are `__`-joined segment strings (`reporter__first_name`).
//! Resolution is tolerant: an unknown segment stops the walk and yields the
//! last schema reached, and a relation whose target is missing from the
//! registry falls back to the owning schema. Stored legacy paths therefore
//! never make an export fail outright.

use tracing::debug;

use crate::permissions::PermissionCheck;
use crate::schema::{FieldDef, FieldKind, ModelSchema, SchemaRegistry};

/// Path separator between relation segments
pub const PATH_SEPARATOR: &str = "__";

/// Scalar fields of a schema.
///
/// A scalar named `<relation>_id` whose `<relation>` peer is a forward
/// relation on the same schema is the raw foreign-key column showing up next
/// to its accessor; it is suppressed so the pair surfaces as one field, keyed
/// by the accessor name.
pub fn direct_fields(schema: &ModelSchema) -> Vec<&FieldDef> {
	schema
		.fields
		.iter()
		.filter(|f| !f.is_relation())
		.filter(|f| !is_raw_fk_column(schema, &f.name))
		.collect()
}

/// Relation fields of a schema (forward and reverse, any cardinality)
pub fn relation_fields(schema: &ModelSchema) -> Vec<&FieldDef> {
	schema.fields.iter().filter(|f| f.is_relation()).collect()
}

/// Both halves of the field partition in one call
#[derive(Debug)]
pub struct FieldPartition<'r> {
	pub direct: Vec<&'r FieldDef>,
	pub relational: Vec<&'r FieldDef>,
}

/// Partition a schema's fields into direct and relational
pub fn fields_of(schema: &ModelSchema) -> FieldPartition<'_> {
	FieldPartition {
		direct: direct_fields(schema),
		relational: relation_fields(schema),
	}
}

fn is_raw_fk_column(schema: &ModelSchema, name: &str) -> bool {
	let Some(base) = name.strip_suffix("_id") else {
		return false;
	};
	matches!(
		schema.field(base).map(|f| &f.kind),
		Some(FieldKind::Relation { .. })
	)
}

/// Walk a `__`-joined relation path from `root` and return the schema it
/// lands on.
///
/// Scalar segments leave the current schema unchanged; relation segments
/// advance to the target schema; an unknown segment ends the walk at the
/// schema reached so far.
///
/// # Examples
///
/// ```
/// use export_action::schema::walker::resolve_path;
/// use export_action::schema::{
///     Cardinality, DataType, Direction, FieldDef, ModelSchema, SchemaRegistry,
/// };
///
/// let registry = SchemaRegistry::new()
///     .with_schema(ModelSchema::new("Article", "news").with_field(FieldDef::relation(
///         "reporter",
///         "Reporter",
///         Cardinality::ManyToOne,
///         Direction::Forward,
///     )))
///     .with_schema(
///         ModelSchema::new("Reporter", "news")
///             .with_field(FieldDef::scalar("email", DataType::Text)),
///     );
///
/// let root = registry.get("Article").unwrap();
/// assert_eq!(resolve_path(&registry, root, "reporter__email").name, "Reporter");
/// assert_eq!(resolve_path(&registry, root, "no_such__field").name, "Article");
/// ```
pub fn resolve_path<'r>(
	registry: &'r SchemaRegistry,
	root: &'r ModelSchema,
	path: &str,
) -> &'r ModelSchema {
	let mut current = root;
	for segment in path.split(PATH_SEPARATOR) {
		if segment.is_empty() {
			continue;
		}
		let Some(field) = current.field(segment) else {
			debug!(schema = %current.name, segment, "unknown path segment, keeping last schema");
			return current;
		};
		if let FieldKind::Relation { target, .. } = &field.kind {
			// Missing target metadata falls back to the owning schema.
			current = registry.get(target).unwrap_or(current);
		}
	}
	current
}

/// One hop down `field_name`, or `schema` itself when empty
fn hop<'r>(
	registry: &'r SchemaRegistry,
	schema: &'r ModelSchema,
	field_name: &str,
) -> &'r ModelSchema {
	if field_name.is_empty() {
		return schema;
	}
	match schema.field(field_name).map(|f| &f.kind) {
		Some(FieldKind::Relation { target, .. }) => registry.get(target).unwrap_or(schema),
		_ => schema,
	}
}

/// Direct fields one hop from `field_name`, plus picker metadata
#[derive(Debug)]
pub struct FieldListing<'r> {
	pub fields: Vec<&'r FieldDef>,
	/// Extended dotted path label, trailing separator included
	pub path: String,
	pub app_label: &'r str,
}

/// Direct fields reachable one hop down `field_name` off `schema`.
///
/// Extends `path` with `field_name` and a trailing separator, matching the
/// label format the progressive-disclosure field picker stores.
pub fn fields_at<'r>(
	registry: &'r SchemaRegistry,
	schema: &'r ModelSchema,
	field_name: &str,
	path: &str,
) -> FieldListing<'r> {
	let target = hop(registry, schema, field_name);
	FieldListing {
		fields: direct_fields(target),
		path: extend_path(path, field_name),
		app_label: &target.app_label,
	}
}

/// Relation fields reachable one hop down `field_name`, filtered to those
/// whose target schema passes the permission check, plus the extended path
/// label.
pub fn related_fields_at<'r>(
	registry: &'r SchemaRegistry,
	schema: &'r ModelSchema,
	field_name: &str,
	path: &str,
	check: &dyn PermissionCheck,
) -> (Vec<&'r FieldDef>, String) {
	let owner = hop(registry, schema, field_name);
	let fields = relation_fields(owner)
		.into_iter()
		.filter(|f| {
			let target = match &f.kind {
				FieldKind::Relation { target, .. } => registry.get(target).unwrap_or(owner),
				FieldKind::Scalar { .. } => owner,
			};
			check.can_access(target)
		})
		.collect();
	(fields, extend_path(path, field_name))
}

fn extend_path(path: &str, field_name: &str) -> String {
	if field_name.is_empty() {
		path.to_string()
	} else {
		format!("{path}{field_name}{PATH_SEPARATOR}")
	}
}
