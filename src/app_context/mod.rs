use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use serde::Serialize;

use crate::config::AppConfig;
use crate::database::entities::{projects, transcript_languages};
use crate::services::{
    ClientService, FlowService, LanguageService, ProjectService, UserService,
};

mod settings_operations;

/// Shared application context exposing the services to the CLI and any
/// embedding layer.
#[derive(Clone)]
pub struct AppContext {
    db: DatabaseConnection,
    flow_service: Arc<FlowService>,
    project_service: Arc<ProjectService>,
    language_service: Arc<LanguageService>,
    user_service: Arc<UserService>,
    client_service: Arc<ClientService>,
}

impl AppContext {
    pub fn new(db: DatabaseConnection, config: &AppConfig) -> Self {
        let flow_service = Arc::new(FlowService::new(db.clone()));
        let project_service = Arc::new(ProjectService::new(
            db.clone(),
            config.default_language_code.clone(),
        ));
        let language_service = Arc::new(LanguageService::new(db.clone()));
        let user_service = Arc::new(UserService::new(db.clone()));
        let client_service = Arc::new(ClientService::new(db.clone()));

        Self {
            db,
            flow_service,
            project_service,
            language_service,
            user_service,
            client_service,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn flow_service(&self) -> &Arc<FlowService> {
        &self.flow_service
    }

    pub fn project_service(&self) -> &Arc<ProjectService> {
        &self.project_service
    }

    pub fn language_service(&self) -> &Arc<LanguageService> {
        &self.language_service
    }

    pub fn user_service(&self) -> &Arc<UserService> {
        &self.user_service
    }

    pub fn client_service(&self) -> &Arc<ClientService> {
        &self.client_service
    }
}

// ----- Public types -----

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub id: i32,
    pub name: String,
    pub human_name: Option<String>,
    pub slug: String,
    pub description: Option<String>,
    pub creator_id: i32,
    pub main_color: String,
    pub logo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<projects::Model> for ProjectSummary {
    fn from(model: projects::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            human_name: model.human_name,
            slug: model.slug,
            description: model.description,
            creator_id: model.creator_id,
            main_color: model.main_color,
            logo: model.logo,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LanguageSummary {
    pub id: i32,
    pub name: String,
    pub code: String,
}

impl From<transcript_languages::Model> for LanguageSummary {
    fn from(model: transcript_languages::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            code: model.code,
        }
    }
}

/// Project fields plus enabled and available transcript languages
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSettings {
    pub project: ProjectSummary,
    pub languages: Vec<LanguageSummary>,
    pub available_languages: Vec<LanguageSummary>,
}
