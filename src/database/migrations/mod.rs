pub use sea_orm_migration::prelude::*;

mod m20261016_000001_create_users_and_projects;
mod m20261016_000002_create_flow_tables;
mod m20261016_000003_create_transcript_languages;
mod m20261016_000004_create_client_jobs;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261016_000001_create_users_and_projects::Migration),
            Box::new(m20261016_000002_create_flow_tables::Migration),
            Box::new(m20261016_000003_create_transcript_languages::Migration),
            Box::new(m20261016_000004_create_client_jobs::Migration),
        ]
    }
}
