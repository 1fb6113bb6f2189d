use chrono::Utc;
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;

use crate::database::entities::{projects, users, users::UserRole};
use crate::database::migrations::Migrator;

/// Fresh in-memory database with every migration applied
pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to test database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

pub async fn seed_user(db: &DatabaseConnection, email: &str, role: UserRole) -> users::Model {
    users::ActiveModel {
        email: Set(email.to_string()),
        role: Set(role.into()),
        is_active: Set(true),
        date_joined: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert test user")
}

/// Bare project row owned by a new creator; no default nodes or languages.
pub async fn seed_project(db: &DatabaseConnection, slug: &str) -> projects::Model {
    let creator = seed_user(db, &format!("{}@example.com", slug), UserRole::Creator).await;

    let mut project = projects::ActiveModel::new();
    project.name = Set(slug.to_string());
    project.slug = Set(slug.to_string());
    project.creator_id = Set(creator.id);
    project
        .insert(db)
        .await
        .expect("Failed to insert test project")
}
