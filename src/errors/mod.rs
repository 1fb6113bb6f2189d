//! Domain-specific error types for flowbuilder
//!
//! # Error Categories
//!
//! - **FlowError**: flow payload decoding, replace-transaction and flow reads
//! - **ProjectError**: projects, slugs, language settings, users and client jobs
//! - **CoreError**: transport-neutral wrapper with a kind, a stable code and
//!   field-level detail, built from either domain error
//!
//! ```rust
//! use flowbuilder::errors::{CoreError, ProjectError};
//!
//! let err = ProjectError::InvalidSlug {
//!     slug: "Bad Slug".to_string(),
//!     reason: "only lowercase letters, numbers and hyphens".to_string(),
//! };
//! let core = CoreError::from(err);
//! assert_eq!(core.http_status(), 400);
//! ```

pub mod core_error;
pub mod flow;
pub mod project;

pub use core_error::{CoreError, CoreErrorKind};
pub use flow::FlowError;
pub use project::ProjectError;

/// Result type alias for flow operations
pub type FlowResult<T> = Result<T, FlowError>;

/// Result type alias for project, settings and client operations
pub type ProjectResult<T> = Result<T, ProjectError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_result_alias() {
        let result: FlowResult<i32> = Err(FlowError::ProjectNotFound(42));
        assert!(result.is_err());
    }

    #[test]
    fn test_project_result_alias() {
        let result: ProjectResult<()> = Err(ProjectError::JobNotFound(1));
        assert!(result.is_err());
    }
}
