//! Error types for export operations

use thiserror::Error;

/// Export error type
#[derive(Debug, Error)]
pub enum ExportError {
	/// Model not present in the schema registry
	#[error("Model '{0}' is not registered")]
	ModelNotRegistered(String),

	/// Stored selection token did not resolve to an id list
	#[error("Selection '{0}' not found")]
	SelectionNotFound(String),

	/// Record store failure
	#[error("Store error: {0}")]
	StoreError(String),

	/// Serializer failure
	#[error("Serialization error: {0}")]
	SerializationError(String),
}

/// Result type for export operations
pub type ExportResult<T> = Result<T, ExportError>;
