//! Permission oracle injected into the report builder.
//!
//! The core never talks to an authorization backend directly; callers supply
//! a predicate answering "may the requesting user read this schema". Closures
//! implement the trait, so tests and simple embeddings can pass `|_| true`.

use crate::schema::ModelSchema;

/// Capability check for one schema
pub trait PermissionCheck {
	/// True if the current caller may read records of `schema`
	fn can_access(&self, schema: &ModelSchema) -> bool;
}

impl<F> PermissionCheck for F
where
	F: Fn(&ModelSchema) -> bool,
{
	fn can_access(&self, schema: &ModelSchema) -> bool {
		self(schema)
	}
}

/// Oracle that grants everything; useful in tests and trusted contexts
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl PermissionCheck for AllowAll {
	fn can_access(&self, _schema: &ModelSchema) -> bool {
		true
	}
}
