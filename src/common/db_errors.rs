//! Database error categorization
//!
//! Services use this to tell races on unique constraints apart from genuine
//! failures: a slug collision becomes a validation error, a concurrent
//! language association insert becomes a no-op, anything else propagates.
//!
//! ```rust
//! use flowbuilder::common::db_errors::DbErrorKind;
//! use sea_orm::DbErr;
//!
//! let err = DbErr::Custom("UNIQUE constraint failed: projects.slug".to_string());
//! assert_eq!(DbErrorKind::from_db_err(&err), DbErrorKind::UniqueViolation);
//! ```

use sea_orm::{DbErr, SqlErr};

/// Categories of database errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbErrorKind {
    /// Query returned no row where one was required
    NotFound,
    /// Unique constraint or index rejected the write
    UniqueViolation,
    /// Foreign key constraint rejected the write
    ForeignKeyViolation,
    /// Could not reach or keep a connection
    ConnectionError,
    /// Query or pool acquisition timed out
    Timeout,
    /// Lock contention (SQLite `database is locked`, deadlocks)
    Busy,
    /// Anything else
    Unknown,
}

impl DbErrorKind {
    /// Categorize a sea_orm database error
    pub fn from_db_err(err: &DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => return Self::UniqueViolation,
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => return Self::ForeignKeyViolation,
            _ => {}
        }

        match err {
            DbErr::RecordNotFound(_) => Self::NotFound,
            DbErr::Conn(_) => {
                if mentions_timeout(&err.to_string().to_lowercase()) {
                    Self::Timeout
                } else {
                    Self::ConnectionError
                }
            }
            _ => Self::from_message(&err.to_string()),
        }
    }

    fn from_message(message: &str) -> Self {
        let msg = message.to_lowercase();
        if msg.contains("unique") || msg.contains("duplicate") {
            Self::UniqueViolation
        } else if msg.contains("foreign key") {
            Self::ForeignKeyViolation
        } else if msg.contains("database is locked") || msg.contains("deadlock") {
            Self::Busy
        } else if mentions_timeout(&msg) {
            Self::Timeout
        } else {
            Self::Unknown
        }
    }

    /// Transient errors that may succeed on retry
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConnectionError | Self::Timeout | Self::Busy)
    }
}

fn mentions_timeout(msg: &str) -> bool {
    msg.contains("timeout") || msg.contains("timed out")
}

pub fn is_unique_violation(err: &DbErr) -> bool {
    DbErrorKind::from_db_err(err) == DbErrorKind::UniqueViolation
}

/// Format database error with operation context
pub fn format_db_error(operation: &str, err: &DbErr) -> (DbErrorKind, String) {
    let kind = DbErrorKind::from_db_err(err);

    let message = match kind {
        DbErrorKind::NotFound => format!("{}: record not found", operation),
        DbErrorKind::UniqueViolation => format!("{}: duplicate key violation", operation),
        DbErrorKind::ForeignKeyViolation => {
            format!("{}: foreign key constraint violation", operation)
        }
        DbErrorKind::ConnectionError => format!("{}: database connection failed", operation),
        DbErrorKind::Timeout => format!("{}: query timeout", operation),
        DbErrorKind::Busy => format!("{}: database busy", operation),
        DbErrorKind::Unknown => format!("{}: database error - {}", operation, err),
    };

    (kind, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_not_found() {
        let err = DbErr::RecordNotFound("project".to_string());
        assert_eq!(DbErrorKind::from_db_err(&err), DbErrorKind::NotFound);
    }

    #[test]
    fn test_sqlite_unique_message() {
        let err = DbErr::Custom(
            "UNIQUE constraint failed: project_supported_transcript_languages.project_id"
                .to_string(),
        );
        assert!(is_unique_violation(&err));
        assert!(!DbErrorKind::UniqueViolation.is_retryable());
    }

    #[test]
    fn test_foreign_key_message() {
        let err = DbErr::Custom("FOREIGN KEY constraint failed".to_string());
        assert_eq!(
            DbErrorKind::from_db_err(&err),
            DbErrorKind::ForeignKeyViolation
        );
    }

    #[test]
    fn test_locked_database_is_retryable() {
        let err = DbErr::Custom("database is locked".to_string());
        let kind = DbErrorKind::from_db_err(&err);
        assert_eq!(kind, DbErrorKind::Busy);
        assert!(kind.is_retryable());
    }

    #[test]
    fn test_format_db_error() {
        let err = DbErr::Custom("UNIQUE constraint failed: projects.slug".to_string());
        let (kind, message) = format_db_error("create project", &err);
        assert_eq!(kind, DbErrorKind::UniqueViolation);
        assert_eq!(message, "create project: duplicate key violation");
    }
}
