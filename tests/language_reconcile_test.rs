use std::collections::BTreeSet;

use flowbuilder::database::entities::users::UserRole;
use flowbuilder::database::entities::{project_transcript_languages, transcript_languages};
use flowbuilder::database::migrations::Migrator;
use flowbuilder::errors::ProjectError;
use flowbuilder::services::{LanguageService, NewProject, ProjectService, ProjectUpdate, UserService};
use flowbuilder::{AppConfig, AppContext};
use sea_orm::{
    ColumnTrait, Database, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter,
};
use sea_orm_migration::MigratorTrait;
use serde_json::json;

async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect("sqlite::memory:").await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

async fn create_project(db: &DatabaseConnection, slug: &str) -> i32 {
    let creator = UserService::new(db.clone())
        .create_user(&format!("{}@example.com", slug), UserRole::Creator)
        .await
        .unwrap();
    ProjectService::new(db.clone(), "en")
        .create_project(
            creator.id,
            NewProject {
                name: slug.to_string(),
                slug: slug.to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .id
}

async fn language_id(db: &DatabaseConnection, code: &str) -> i32 {
    transcript_languages::Entity::find()
        .filter(transcript_languages::Column::Code.eq(code))
        .one(db)
        .await
        .unwrap()
        .unwrap()
        .id
}

async fn enabled_codes(service: &LanguageService, project_id: i32) -> Vec<String> {
    service
        .project_languages(project_id)
        .await
        .unwrap()
        .into_iter()
        .map(|l| l.code)
        .collect()
}

#[tokio::test]
async fn test_catalog_is_seeded_and_sorted() {
    let db = setup_test_db().await.unwrap();
    let languages = LanguageService::new(db).list_languages().await.unwrap();

    let names: Vec<&str> = languages.iter().map(|l| l.name.as_str()).collect();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
    assert!(languages.iter().any(|l| l.code == "en"));
    assert!(languages.iter().any(|l| l.code == "fr"));
}

#[tokio::test]
async fn test_reconcile_applies_symmetric_difference() {
    let db = setup_test_db().await.unwrap();
    let project_id = create_project(&db, "langs").await;
    let service = LanguageService::new(db.clone());

    let en = language_id(&db, "en").await;
    let fr = language_id(&db, "fr").await;
    let de = language_id(&db, "de").await;

    let outcome = service
        .reconcile(project_id, &BTreeSet::from([fr, de]))
        .await
        .unwrap();
    assert_eq!(outcome.removed, vec![en]);
    let added: BTreeSet<i32> = outcome.added.iter().copied().collect();
    assert_eq!(added, BTreeSet::from([fr, de]));
    assert!(outcome.skipped.is_empty());

    let mut codes = enabled_codes(&service, project_id).await;
    codes.sort();
    assert_eq!(codes, vec!["de", "fr"]);

    let outcome = service
        .reconcile(project_id, &BTreeSet::from([en, fr]))
        .await
        .unwrap();
    assert_eq!(outcome.added, vec![en]);
    assert_eq!(outcome.removed, vec![de]);
}

#[tokio::test]
async fn test_reconcile_is_idempotent() {
    let db = setup_test_db().await.unwrap();
    let project_id = create_project(&db, "idem").await;
    let service = LanguageService::new(db.clone());
    let desired = BTreeSet::from([language_id(&db, "es").await, language_id(&db, "it").await]);

    service.reconcile(project_id, &desired).await.unwrap();
    let again = service.reconcile(project_id, &desired).await.unwrap();

    assert!(again.is_noop());
    assert_eq!(
        project_transcript_languages::Entity::find()
            .filter(project_transcript_languages::Column::ProjectId.eq(project_id))
            .count(&db)
            .await
            .unwrap(),
        2
    );
}

#[tokio::test]
async fn test_reconcile_to_empty_and_unknown_ids() {
    let db = setup_test_db().await.unwrap();
    let project_id = create_project(&db, "empty").await;
    let service = LanguageService::new(db.clone());

    let outcome = service
        .reconcile(project_id, &BTreeSet::from([4242]))
        .await
        .unwrap();
    assert_eq!(outcome.skipped, vec![4242]);
    assert!(outcome.added.is_empty());
    assert!(enabled_codes(&service, project_id).await.is_empty());

    let err = service
        .reconcile(9999, &BTreeSet::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ProjectError::NotFound(9999)));
}

#[tokio::test]
async fn test_settings_reject_non_list_language_ids() {
    let db = setup_test_db().await.unwrap();
    let project_id = create_project(&db, "settings").await;
    let ctx = AppContext::new(db.clone(), &AppConfig::default());

    let err = ctx
        .update_project_settings(
            project_id,
            ProjectUpdate {
                name: Some("Renamed".to_string()),
                ..Default::default()
            },
            Some(&json!("1,2,3")),
        )
        .await
        .unwrap_err();
    assert_eq!(err.field(), Some("language_ids"));

    // nothing was applied
    let settings = ctx.project_settings(project_id).await.unwrap();
    assert_eq!(settings.project.name, "settings");
    assert_eq!(settings.languages.len(), 1);

    let fr = language_id(&db, "fr").await;
    let (settings, outcome) = ctx
        .update_project_settings(
            project_id,
            ProjectUpdate {
                name: Some("Renamed".to_string()),
                ..Default::default()
            },
            Some(&json!([fr])),
        )
        .await
        .unwrap();
    assert_eq!(settings.project.name, "Renamed");
    assert_eq!(outcome.unwrap().added, vec![fr]);
    let codes: Vec<&str> = settings.languages.iter().map(|l| l.code.as_str()).collect();
    assert_eq!(codes, vec!["fr"]);
}
