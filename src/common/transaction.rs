//! Write transactions against a shared SQLite file
//!
//! A deferred SQLite transaction that reads before it writes cannot wait for
//! another writer: the lock upgrade fails at once with `database is locked`.
//! Write paths therefore claim the project row with a no-op update as their
//! first statement, which lets the connection's busy timeout do the waiting,
//! and run inside [`with_write_retry`] for whatever contention still slips
//! through.

use std::future::Future;
use std::time::Duration;

use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter};
use tracing::warn;

use super::db_errors::format_db_error;
use crate::database::entities::projects;
use crate::errors::{FlowError, ProjectError};

const MAX_ATTEMPTS: u32 = 5;
const BASE_BACKOFF: Duration = Duration::from_millis(25);

/// Errors that may wrap a database failure
pub trait DatabaseFailure {
    fn db_err(&self) -> Option<&DbErr>;
}

impl DatabaseFailure for DbErr {
    fn db_err(&self) -> Option<&DbErr> {
        Some(self)
    }
}

impl DatabaseFailure for FlowError {
    fn db_err(&self) -> Option<&DbErr> {
        match self {
            FlowError::Database(err) => Some(err),
            _ => None,
        }
    }
}

impl DatabaseFailure for ProjectError {
    fn db_err(&self) -> Option<&DbErr> {
        match self {
            ProjectError::Database(err) | ProjectError::Provisioning { source: err, .. } => {
                Some(err)
            }
            _ => None,
        }
    }
}

/// Take the write lock for `project_id` inside `conn`.
///
/// Returns `false` when the project row does not exist.
pub async fn claim_project<C: ConnectionTrait>(conn: &C, project_id: i32) -> Result<bool, DbErr> {
    let result = projects::Entity::update_many()
        .col_expr(
            projects::Column::UpdatedAt,
            Expr::col(projects::Column::UpdatedAt).into(),
        )
        .filter(projects::Column::Id.eq(project_id))
        .exec(conn)
        .await?;
    Ok(result.rows_affected > 0)
}

/// Run `attempt` until it succeeds, fails with a non-transient error, or
/// runs out of attempts. Each attempt must open its own transaction.
pub async fn with_write_retry<T, E, F, Fut>(operation: &str, mut attempt: F) -> Result<T, E>
where
    E: DatabaseFailure,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut tries = 1;
    loop {
        let err = match attempt().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        let transient = err.db_err().map(|db_err| format_db_error(operation, db_err));
        match transient {
            Some((kind, message)) if kind.is_retryable() && tries < MAX_ATTEMPTS => {
                warn!(attempt = tries, "{}, retrying", message);
                tokio::time::sleep(BASE_BACKOFF * 2u32.pow(tries - 1)).await;
                tries += 1;
            }
            _ => return Err(err),
        }
    }
}
