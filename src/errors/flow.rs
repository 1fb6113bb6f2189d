//! Flow graph error types
//!
//! Raised while decoding a submitted flow payload, installing it into the
//! store, or reading a stored flow back.
//!
//! ```rust
//! use flowbuilder::errors::FlowError;
//!
//! let err = FlowError::UnknownNodeType {
//!     node: "n1".to_string(),
//!     node_type: "magic_node".to_string(),
//! };
//! assert!(err.is_client_error());
//! assert_eq!(err.error_code(), "VALIDATION_FAILED");
//! ```

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlowError {
    /// Project not found by ID
    #[error("Project {0} not found")]
    ProjectNotFound(i32),

    /// Payload is not a `{nodes, edges}` object or a field has the wrong shape
    #[error("Invalid flow payload: {0}")]
    InvalidPayload(String),

    /// Node `type` outside the supported set
    #[error("Node '{node}' has unknown type '{node_type}'")]
    UnknownNodeType { node: String, node_type: String },

    /// Two nodes in one payload share an identifier
    #[error("Node '{0}' appears more than once in the flow")]
    DuplicateNode(String),

    /// A stored node row is inconsistent with its payload tables
    #[error("Stored node '{node}' is corrupt: {reason}")]
    CorruptNode { node: String, reason: String },

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl FlowError {
    /// Check if this is a client error (400-series)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            FlowError::InvalidPayload(_)
                | FlowError::UnknownNodeType { .. }
                | FlowError::DuplicateNode(_)
        )
    }

    /// Check if this is a not found error (404)
    pub fn is_not_found(&self) -> bool {
        matches!(self, FlowError::ProjectNotFound(_))
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            FlowError::ProjectNotFound(_) => "NOT_FOUND",
            FlowError::InvalidPayload(_)
            | FlowError::UnknownNodeType { .. }
            | FlowError::DuplicateNode(_) => "VALIDATION_FAILED",
            FlowError::CorruptNode { .. } => "CORRUPT_DATA",
            FlowError::Database(_) => "DATABASE_ERROR",
        }
    }
}
