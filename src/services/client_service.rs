use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Serialize;
use tracing::info;

use crate::database::entities::users::UserRole;
use crate::database::entities::{client_jobs, project_clients, projects, transcripts};
use crate::errors::{ProjectError, ProjectResult};
use crate::services::UserService;

/// Public branding of a system, shown to clients before they sign in
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientSystemView {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub logo: Option<String>,
    pub color: String,
}

impl From<projects::Model> for ClientSystemView {
    fn from(project: projects::Model) -> Self {
        Self {
            id: project.id,
            name: project.name,
            slug: project.slug,
            description: project.description,
            logo: project.logo,
            color: project.main_color,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobWithTranscripts {
    #[serde(flatten)]
    pub job: client_jobs::Model,
    pub transcripts: Vec<transcripts::Model>,
}

/// Client-side operations: system lookup, project membership, jobs and
/// their transcripts
#[derive(Clone)]
pub struct ClientService {
    db: DatabaseConnection,
    users: UserService,
}

impl ClientService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            users: UserService::new(db.clone()),
            db,
        }
    }

    pub async fn system_info(&self, slug: &str) -> ProjectResult<ClientSystemView> {
        projects::Entity::find()
            .filter(projects::Column::Slug.eq(slug))
            .one(&self.db)
            .await?
            .map(ClientSystemView::from)
            .ok_or_else(|| ProjectError::SlugNotFound(slug.to_string()))
    }

    /// Attach a client to a project. A client belongs to one project at a
    /// time, so an existing assignment is moved.
    pub async fn assign_client(
        &self,
        client_id: i32,
        project_id: i32,
    ) -> ProjectResult<project_clients::Model> {
        self.users.require_role(client_id, UserRole::Client).await?;
        projects::Entity::find_by_id(project_id)
            .one(&self.db)
            .await?
            .ok_or(ProjectError::NotFound(project_id))?;

        let existing = project_clients::Entity::find()
            .filter(project_clients::Column::ClientId.eq(client_id))
            .one(&self.db)
            .await?;

        let assignment = match existing {
            Some(row) if row.project_id == project_id => row,
            Some(row) => {
                let mut active: project_clients::ActiveModel = row.into();
                active.project_id = Set(project_id);
                active.update(&self.db).await?
            }
            None => {
                project_clients::ActiveModel {
                    client_id: Set(client_id),
                    project_id: Set(project_id),
                    ..Default::default()
                }
                .insert(&self.db)
                .await?
            }
        };

        info!(client_id, project_id, "Assigned client to project");
        Ok(assignment)
    }

    /// Project a client is attached to, if any
    pub async fn client_project(&self, client_id: i32) -> ProjectResult<Option<projects::Model>> {
        let assignment = project_clients::Entity::find()
            .filter(project_clients::Column::ClientId.eq(client_id))
            .one(&self.db)
            .await?;

        match assignment {
            Some(row) => Ok(projects::Entity::find_by_id(row.project_id)
                .one(&self.db)
                .await?),
            None => Ok(None),
        }
    }

    pub async fn create_job(&self, user_id: i32, name: &str) -> ProjectResult<client_jobs::Model> {
        self.users.require_role(user_id, UserRole::Client).await?;

        let name = name.trim();
        if name.is_empty() {
            return Err(ProjectError::validation("name", "cannot be empty"));
        }

        let now = Utc::now();
        let job = client_jobs::ActiveModel {
            user_id: Set(user_id),
            name: Set(name.to_string()),
            output_markdown: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        info!(job_id = job.id, user_id, "Created client job");
        Ok(job)
    }

    pub async fn add_transcript(
        &self,
        job_id: i32,
        content: &str,
    ) -> ProjectResult<transcripts::Model> {
        self.get_job(job_id).await?;

        let now = Utc::now();
        Ok(transcripts::ActiveModel {
            job_id: Set(job_id),
            content: Set(content.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await?)
    }

    pub async fn set_job_output(
        &self,
        job_id: i32,
        markdown: &str,
    ) -> ProjectResult<client_jobs::Model> {
        let mut job: client_jobs::ActiveModel = self.get_job(job_id).await?.into();
        job.output_markdown = Set(Some(markdown.to_string()));
        job.updated_at = Set(Utc::now());
        Ok(job.update(&self.db).await?)
    }

    pub async fn get_job(&self, job_id: i32) -> ProjectResult<client_jobs::Model> {
        client_jobs::Entity::find_by_id(job_id)
            .one(&self.db)
            .await?
            .ok_or(ProjectError::JobNotFound(job_id))
    }

    /// A user's jobs, newest first, each with its transcripts in creation order
    pub async fn list_jobs(&self, user_id: i32) -> ProjectResult<Vec<JobWithTranscripts>> {
        let rows = client_jobs::Entity::find()
            .filter(client_jobs::Column::UserId.eq(user_id))
            .order_by_desc(client_jobs::Column::CreatedAt)
            .order_by_desc(client_jobs::Column::Id)
            .find_with_related(transcripts::Entity)
            .order_by_asc(transcripts::Column::Id)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(job, transcripts)| JobWithTranscripts { job, transcripts })
            .collect())
    }
}
