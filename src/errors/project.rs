//! Project, settings and client-job error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProjectError {
    /// Project not found by ID
    #[error("Project {0} not found")]
    NotFound(i32),

    /// No project uses this slug
    #[error("Project '{0}' not found")]
    SlugNotFound(String),

    /// Slug does not match `^[a-z0-9-]+$` or is too long
    #[error("Invalid slug '{slug}': {reason}")]
    InvalidSlug { slug: String, reason: String },

    /// Slug already taken by another project
    #[error("Slug '{0}' is already in use")]
    DuplicateSlug(String),

    /// Field-level validation failure
    #[error("Invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Referenced user does not exist
    #[error("User {0} not found")]
    UserNotFound(i32),

    /// User exists but has the wrong role for the operation
    #[error("User {user_id} is not a {expected}")]
    WrongRole { user_id: i32, expected: String },

    /// Email already registered
    #[error("Email '{0}' is already registered")]
    DuplicateEmail(String),

    /// Client job not found
    #[error("Job {0} not found")]
    JobNotFound(i32),

    /// Default node seeding failed after the project row was created
    #[error("Project {project_id} created but default nodes could not be provisioned: {source}")]
    Provisioning {
        project_id: i32,
        #[source]
        source: sea_orm::DbErr,
    },

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl ProjectError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ProjectError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Check if this is a client error (400-series)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ProjectError::InvalidSlug { .. }
                | ProjectError::DuplicateSlug(_)
                | ProjectError::Validation { .. }
                | ProjectError::WrongRole { .. }
                | ProjectError::DuplicateEmail(_)
        )
    }

    /// Check if this is a not found error (404)
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ProjectError::NotFound(_)
                | ProjectError::SlugNotFound(_)
                | ProjectError::UserNotFound(_)
                | ProjectError::JobNotFound(_)
        )
    }

    /// Name of the offending input field, when there is one
    pub fn field(&self) -> Option<&str> {
        match self {
            ProjectError::InvalidSlug { .. } | ProjectError::DuplicateSlug(_) => Some("slug"),
            ProjectError::Validation { field, .. } => Some(field),
            ProjectError::DuplicateEmail(_) => Some("email"),
            _ => None,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ProjectError::NotFound(_)
            | ProjectError::SlugNotFound(_)
            | ProjectError::UserNotFound(_)
            | ProjectError::JobNotFound(_) => "NOT_FOUND",
            ProjectError::InvalidSlug { .. }
            | ProjectError::DuplicateSlug(_)
            | ProjectError::Validation { .. }
            | ProjectError::DuplicateEmail(_) => "VALIDATION_FAILED",
            ProjectError::WrongRole { .. } => "FORBIDDEN",
            ProjectError::Provisioning { .. } => "PROVISIONING_INCOMPLETE",
            ProjectError::Database(_) => "DATABASE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_slug() {
        let err = ProjectError::DuplicateSlug("my-project".to_string());
        assert_eq!(err.to_string(), "Slug 'my-project' is already in use");
        assert!(err.is_client_error());
        assert_eq!(err.field(), Some("slug"));
    }

    #[test]
    fn test_validation_carries_field() {
        let err = ProjectError::validation("language_ids", "must be a list");
        assert_eq!(err.to_string(), "Invalid language_ids: must be a list");
        assert_eq!(err.field(), Some("language_ids"));
        assert_eq!(err.error_code(), "VALIDATION_FAILED");
    }

    #[test]
    fn test_provisioning_is_server_side() {
        let err = ProjectError::Provisioning {
            project_id: 3,
            source: sea_orm::DbErr::Custom("disk full".to_string()),
        };
        assert!(!err.is_client_error());
        assert!(!err.is_not_found());
        assert_eq!(err.error_code(), "PROVISIONING_INCOMPLETE");
    }
}
