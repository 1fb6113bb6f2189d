use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use tracing::{debug, info};

use crate::common::db_errors::is_unique_violation;
use crate::common::transaction::{claim_project, with_write_retry};
use crate::database::entities::users::UserRole;
use crate::database::entities::{nodes, project_clients, project_transcript_languages, projects};
use crate::errors::{ProjectError, ProjectResult};
use crate::flow::{default_nodes, store};
use crate::services::{LanguageService, UserService, ValidationService};

/// Fields accepted when creating a project
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewProject {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub human_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub main_color: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
}

/// Partial update; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub human_name: Option<String>,
    pub description: Option<String>,
    pub main_color: Option<String>,
    pub logo: Option<String>,
}

#[derive(Clone)]
pub struct ProjectService {
    db: DatabaseConnection,
    users: UserService,
    languages: LanguageService,
    default_language_code: String,
}

impl ProjectService {
    pub fn new(db: DatabaseConnection, default_language_code: impl Into<String>) -> Self {
        Self {
            users: UserService::new(db.clone()),
            languages: LanguageService::new(db.clone()),
            db,
            default_language_code: default_language_code.into(),
        }
    }

    /// Create a project owned by `creator_id`.
    ///
    /// Validation and the slug check happen before anything is written. Once
    /// the row exists the default input/output nodes are seeded and the default
    /// transcript language enabled; a failure there is reported but the project
    /// stays.
    pub async fn create_project(
        &self,
        creator_id: i32,
        input: NewProject,
    ) -> ProjectResult<projects::Model> {
        let name = ValidationService::validate_project_name(&input.name)?;
        let slug = ValidationService::validate_slug(&input.slug)?;
        let description = match input.description.as_deref() {
            Some(description) => ValidationService::validate_description(description)?,
            None => None,
        };
        let main_color = input
            .main_color
            .as_deref()
            .map(ValidationService::validate_color_code)
            .transpose()?;

        self.users.require_role(creator_id, UserRole::Creator).await?;

        if !self.slug_is_free(&slug, None).await? {
            return Err(ProjectError::DuplicateSlug(slug));
        }

        let mut project = projects::ActiveModel::new();
        project.name = Set(name);
        project.slug = Set(slug.clone());
        project.creator_id = Set(creator_id);
        project.human_name = Set(non_empty(input.human_name));
        project.description = Set(description);
        project.logo = Set(non_empty(input.logo));
        if let Some(color) = main_color {
            project.main_color = Set(color);
        }

        let project = project
            .insert(&self.db)
            .await
            .map_err(|e| slug_conflict(e, &slug))?;

        seed_default_nodes(&self.db, &project)
            .await
            .map_err(|source| ProjectError::Provisioning {
                project_id: project.id,
                source,
            })?;

        let default_languages = self
            .languages
            .default_language_ids(&self.default_language_code)
            .await?;
        self.languages
            .reconcile(project.id, &default_languages)
            .await?;

        info!(
            project_id = project.id,
            creator_id,
            slug = %project.slug,
            "Created project"
        );

        Ok(project)
    }

    pub async fn update_project(
        &self,
        project_id: i32,
        update: ProjectUpdate,
    ) -> ProjectResult<projects::Model> {
        let project = self.get_project(project_id).await?;
        let mut active: projects::ActiveModel = project.into();

        if let Some(name) = update.name.as_deref() {
            active.name = Set(ValidationService::validate_project_name(name)?);
        }

        let new_slug = match update.slug.as_deref() {
            Some(slug) => {
                let slug = ValidationService::validate_slug(slug)?;
                if !self.slug_is_free(&slug, Some(project_id)).await? {
                    return Err(ProjectError::DuplicateSlug(slug));
                }
                active.slug = Set(slug.clone());
                Some(slug)
            }
            None => None,
        };

        if let Some(description) = update.description.as_deref() {
            active.description = Set(ValidationService::validate_description(description)?);
        }

        if let Some(color) = update.main_color.as_deref() {
            active.main_color = Set(ValidationService::validate_color_code(color)?);
        }

        if update.human_name.is_some() {
            active.human_name = Set(non_empty(update.human_name));
        }

        if update.logo.is_some() {
            active.logo = Set(non_empty(update.logo));
        }

        let updated = active
            .set_updated_at()
            .update(&self.db)
            .await
            .map_err(|e| match new_slug {
                Some(slug) => slug_conflict(e, &slug),
                None => ProjectError::Database(e),
            })?;

        info!(project_id, "Updated project");
        Ok(updated)
    }

    pub async fn get_project(&self, project_id: i32) -> ProjectResult<projects::Model> {
        projects::Entity::find_by_id(project_id)
            .one(&self.db)
            .await?
            .ok_or(ProjectError::NotFound(project_id))
    }

    pub async fn get_project_by_slug(&self, slug: &str) -> ProjectResult<projects::Model> {
        projects::Entity::find()
            .filter(projects::Column::Slug.eq(slug))
            .one(&self.db)
            .await?
            .ok_or_else(|| ProjectError::SlugNotFound(slug.to_string()))
    }

    /// Projects created by `creator_id`, newest first
    pub async fn list_projects(&self, creator_id: i32) -> ProjectResult<Vec<projects::Model>> {
        Ok(projects::Entity::find()
            .filter(projects::Column::CreatorId.eq(creator_id))
            .order_by_desc(projects::Column::CreatedAt)
            .order_by_desc(projects::Column::Id)
            .all(&self.db)
            .await?)
    }

    /// Delete a project along with its flow, language settings and client
    /// assignments.
    pub async fn delete_project(&self, project_id: i32) -> ProjectResult<()> {
        with_write_retry("delete project", || self.delete_project_once(project_id)).await?;
        info!(project_id, "Deleted project");
        Ok(())
    }

    async fn delete_project_once(&self, project_id: i32) -> ProjectResult<()> {
        let txn = self.db.begin().await?;
        if !claim_project(&txn, project_id).await? {
            return Err(ProjectError::NotFound(project_id));
        }

        store::clear_graph(&txn, project_id).await?;
        project_transcript_languages::Entity::delete_many()
            .filter(project_transcript_languages::Column::ProjectId.eq(project_id))
            .exec(&txn)
            .await?;
        project_clients::Entity::delete_many()
            .filter(project_clients::Column::ProjectId.eq(project_id))
            .exec(&txn)
            .await?;
        projects::Entity::delete_by_id(project_id).exec(&txn).await?;

        txn.commit().await?;
        Ok(())
    }

    /// Whether `slug` is valid and not used by any project
    pub async fn is_slug_available(&self, slug: &str) -> ProjectResult<bool> {
        let slug = ValidationService::validate_slug(slug)?;
        self.slug_is_free(&slug, None).await
    }

    /// Re-create whichever default input/output nodes a project is missing.
    /// Returns the nodes that were inserted.
    pub async fn provision_default_nodes(&self, project_id: i32) -> ProjectResult<Vec<nodes::Model>> {
        let project = self.get_project(project_id).await?;
        let inserted = seed_default_nodes(&self.db, &project)
            .await
            .map_err(|source| ProjectError::Provisioning { project_id, source })?;

        info!(project_id, inserted = inserted.len(), "Provisioned default nodes");
        Ok(inserted)
    }

    async fn slug_is_free(&self, slug: &str, except: Option<i32>) -> ProjectResult<bool> {
        let mut query = projects::Entity::find().filter(projects::Column::Slug.eq(slug));
        if let Some(project_id) = except {
            query = query.filter(projects::Column::Id.ne(project_id));
        }
        Ok(query.one(&self.db).await?.is_none())
    }
}

async fn seed_default_nodes<C: ConnectionTrait>(
    conn: &C,
    project: &projects::Model,
) -> Result<Vec<nodes::Model>, DbErr> {
    let now = Utc::now();
    let mut inserted = Vec::new();

    for node in default_nodes(project.creator_id, project.id) {
        let existing = nodes::Entity::find()
            .filter(nodes::Column::ProjectId.eq(project.id))
            .filter(nodes::Column::NodeInternalId.eq(node.id.as_str()))
            .one(conn)
            .await?;

        if existing.is_some() {
            debug!(project_id = project.id, node = %node.id, "Default node already present");
            continue;
        }

        inserted.push(store::insert_node(conn, project.id, &node, now).await?);
    }

    Ok(inserted)
}

fn slug_conflict(err: DbErr, slug: &str) -> ProjectError {
    if is_unique_violation(&err) {
        ProjectError::DuplicateSlug(slug.to_string())
    } else {
        ProjectError::Database(err)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
