use std::collections::BTreeSet;

use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set, TransactionTrait,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::common::db_errors::is_unique_violation;
use crate::common::transaction::{claim_project, with_write_retry};
use crate::database::entities::{project_transcript_languages, projects, transcript_languages};
use crate::errors::{ProjectError, ProjectResult};

/// Language ids touched by a reconcile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileOutcome {
    pub added: Vec<i32>,
    pub removed: Vec<i32>,
    /// Unknown languages, and inserts another writer got to first
    pub skipped: Vec<i32>,
}

impl ReconcileOutcome {
    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Transcript language catalog and per-project language settings
#[derive(Clone)]
pub struct LanguageService {
    db: DatabaseConnection,
}

impl LanguageService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Whole catalog, ordered by name
    pub async fn list_languages(&self) -> ProjectResult<Vec<transcript_languages::Model>> {
        Ok(transcript_languages::Entity::find()
            .order_by_asc(transcript_languages::Column::Name)
            .all(&self.db)
            .await?)
    }

    /// Languages enabled for a project, ordered by name
    pub async fn project_languages(
        &self,
        project_id: i32,
    ) -> ProjectResult<Vec<transcript_languages::Model>> {
        self.ensure_project(project_id).await?;

        let language_ids = current_language_ids(&self.db, project_id).await?;
        if language_ids.is_empty() {
            return Ok(Vec::new());
        }

        Ok(transcript_languages::Entity::find()
            .filter(transcript_languages::Column::Id.is_in(language_ids))
            .order_by_asc(transcript_languages::Column::Name)
            .all(&self.db)
            .await?)
    }

    /// Make the project's enabled languages exactly `desired`, minus ids that
    /// are not in the catalog.
    ///
    /// Runs in one transaction, serialized with other writers of the same
    /// project. Re-running with the same set is a no-op, and an association
    /// inserted concurrently by another writer is treated as already
    /// satisfied.
    pub async fn reconcile(
        &self,
        project_id: i32,
        desired: &BTreeSet<i32>,
    ) -> ProjectResult<ReconcileOutcome> {
        self.ensure_project(project_id).await?;

        let outcome = with_write_retry("reconcile languages", || {
            self.reconcile_once(project_id, desired)
        })
        .await?;

        info!(
            project_id,
            added = outcome.added.len(),
            removed = outcome.removed.len(),
            skipped = outcome.skipped.len(),
            "Reconciled transcript languages"
        );

        Ok(outcome)
    }

    /// Ids of the catalog entry with `code`; empty (with a warning) when the
    /// catalog does not have it.
    pub async fn default_language_ids(&self, code: &str) -> ProjectResult<BTreeSet<i32>> {
        let language = transcript_languages::Entity::find()
            .filter(transcript_languages::Column::Code.eq(code))
            .one(&self.db)
            .await?;

        match language {
            Some(language) => Ok(BTreeSet::from([language.id])),
            None => {
                warn!(code, "Default transcript language missing from catalog");
                Ok(BTreeSet::new())
            }
        }
    }

    async fn reconcile_once(
        &self,
        project_id: i32,
        desired: &BTreeSet<i32>,
    ) -> ProjectResult<ReconcileOutcome> {
        let txn = self.db.begin().await?;
        if !claim_project(&txn, project_id).await? {
            return Err(ProjectError::NotFound(project_id));
        }
        let outcome = reconcile_languages(&txn, project_id, desired).await?;
        txn.commit().await?;
        Ok(outcome)
    }

    async fn ensure_project(&self, project_id: i32) -> ProjectResult<()> {
        projects::Entity::find_by_id(project_id)
            .one(&self.db)
            .await?
            .map(|_| ())
            .ok_or(ProjectError::NotFound(project_id))
    }
}

/// Parse the `language_ids` field of a settings update.
pub fn parse_language_ids(value: &Value) -> ProjectResult<BTreeSet<i32>> {
    let items = value
        .as_array()
        .ok_or_else(|| ProjectError::validation("language_ids", "must be a list"))?;

    items
        .iter()
        .map(|item| {
            item.as_i64()
                .and_then(|id| i32::try_from(id).ok())
                .ok_or_else(|| {
                    ProjectError::validation(
                        "language_ids",
                        format!("'{}' is not a language id", item),
                    )
                })
        })
        .collect()
}

async fn current_language_ids<C: ConnectionTrait>(
    conn: &C,
    project_id: i32,
) -> Result<BTreeSet<i32>, DbErr> {
    Ok(project_transcript_languages::Entity::find()
        .filter(project_transcript_languages::Column::ProjectId.eq(project_id))
        .all(conn)
        .await?
        .into_iter()
        .map(|row| row.language_id)
        .collect())
}

pub(crate) async fn reconcile_languages<C: ConnectionTrait>(
    conn: &C,
    project_id: i32,
    desired: &BTreeSet<i32>,
) -> Result<ReconcileOutcome, DbErr> {
    let current = current_language_ids(conn, project_id).await?;
    let mut outcome = ReconcileOutcome {
        removed: current.difference(desired).copied().collect(),
        ..Default::default()
    };

    if !outcome.removed.is_empty() {
        project_transcript_languages::Entity::delete_many()
            .filter(project_transcript_languages::Column::ProjectId.eq(project_id))
            .filter(project_transcript_languages::Column::LanguageId.is_in(outcome.removed.clone()))
            .exec(conn)
            .await?;
    }

    let missing: Vec<i32> = desired.difference(&current).copied().collect();
    if missing.is_empty() {
        return Ok(outcome);
    }

    let known: BTreeSet<i32> = transcript_languages::Entity::find()
        .filter(transcript_languages::Column::Id.is_in(missing.clone()))
        .all(conn)
        .await?
        .into_iter()
        .map(|language| language.id)
        .collect();

    for language_id in missing {
        if !known.contains(&language_id) {
            debug!(project_id, language_id, "Skipping unknown transcript language");
            outcome.skipped.push(language_id);
            continue;
        }

        if insert_association(conn, project_id, language_id).await? {
            outcome.added.push(language_id);
        } else {
            debug!(project_id, language_id, "Language association already present");
            outcome.skipped.push(language_id);
        }
    }

    Ok(outcome)
}

/// Returns `false` when the association already exists.
pub(crate) async fn insert_association<C: ConnectionTrait>(
    conn: &C,
    project_id: i32,
    language_id: i32,
) -> Result<bool, DbErr> {
    let row = project_transcript_languages::ActiveModel {
        project_id: Set(project_id),
        language_id: Set(language_id),
        ..Default::default()
    };

    let result = project_transcript_languages::Entity::insert(row)
        .on_conflict(
            OnConflict::columns([
                project_transcript_languages::Column::ProjectId,
                project_transcript_languages::Column::LanguageId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(conn)
        .await;

    match result {
        Ok(rows) => Ok(rows > 0),
        Err(DbErr::RecordNotInserted) => Ok(false),
        Err(err) if is_unique_violation(&err) => Ok(false),
        Err(err) => Err(err),
    }
}
