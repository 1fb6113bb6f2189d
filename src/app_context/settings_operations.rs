use serde_json::Value;
use tracing::info;

use super::{AppContext, LanguageSummary, ProjectSettings, ProjectSummary};
use crate::errors::ProjectResult;
use crate::services::{parse_language_ids, ProjectUpdate, ReconcileOutcome};

impl AppContext {
    // ----- Settings helpers ------------------------------------------------
    pub async fn project_settings(&self, project_id: i32) -> ProjectResult<ProjectSettings> {
        let project = self.project_service.get_project(project_id).await?;
        let languages = self.language_service.project_languages(project_id).await?;
        let available = self.language_service.list_languages().await?;

        Ok(ProjectSettings {
            project: ProjectSummary::from(project),
            languages: languages.into_iter().map(LanguageSummary::from).collect(),
            available_languages: available.into_iter().map(LanguageSummary::from).collect(),
        })
    }

    /// Apply a settings form: project fields first, then the language set when
    /// `language_ids` is present. The language list is parsed up front so a
    /// malformed value rejects the whole update.
    pub async fn update_project_settings(
        &self,
        project_id: i32,
        update: ProjectUpdate,
        language_ids: Option<&Value>,
    ) -> ProjectResult<(ProjectSettings, Option<ReconcileOutcome>)> {
        let desired = language_ids.map(parse_language_ids).transpose()?;

        self.project_service
            .update_project(project_id, update)
            .await?;

        let outcome = match desired {
            Some(desired) => Some(
                self.language_service
                    .reconcile(project_id, &desired)
                    .await?,
            ),
            None => None,
        };

        info!(project_id, "Updated project settings");
        Ok((self.project_settings(project_id).await?, outcome))
    }

    pub async fn set_project_languages(
        &self,
        project_id: i32,
        language_ids: &Value,
    ) -> ProjectResult<ReconcileOutcome> {
        let desired = parse_language_ids(language_ids)?;
        self.language_service.reconcile(project_id, &desired).await
    }
}
