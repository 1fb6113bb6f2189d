use sea_orm::{ConnectionTrait, Statement, Value};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Seeded catalog. `en` must stay: new projects enable it by default.
const LANGUAGES: &[(&str, &str)] = &[
    ("English", "en"),
    ("Spanish", "es"),
    ("French", "fr"),
    ("German", "de"),
    ("Italian", "it"),
    ("Portuguese", "pt"),
    ("Dutch", "nl"),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SupportedTranscriptLanguages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SupportedTranscriptLanguages::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SupportedTranscriptLanguages::Name)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SupportedTranscriptLanguages::Code)
                            .string_len(2)
                            .not_null()
                            .unique_key(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProjectSupportedTranscriptLanguages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProjectSupportedTranscriptLanguages::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ProjectSupportedTranscriptLanguages::ProjectId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProjectSupportedTranscriptLanguages::LanguageId)
                            .integer()
                            .not_null(),
                    )
                    .index(
                        Index::create()
                            .name("idx_project_languages_project_language")
                            .col(ProjectSupportedTranscriptLanguages::ProjectId)
                            .col(ProjectSupportedTranscriptLanguages::LanguageId)
                            .unique(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_project_languages_project")
                            .from(
                                ProjectSupportedTranscriptLanguages::Table,
                                ProjectSupportedTranscriptLanguages::ProjectId,
                            )
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_project_languages_language")
                            .from(
                                ProjectSupportedTranscriptLanguages::Table,
                                ProjectSupportedTranscriptLanguages::LanguageId,
                            )
                            .to(
                                SupportedTranscriptLanguages::Table,
                                SupportedTranscriptLanguages::Id,
                            )
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        let db = manager.get_connection();
        for (name, code) in LANGUAGES {
            let stmt = Statement::from_sql_and_values(
                db.get_database_backend(),
                "INSERT INTO supported_transcript_languages (name, code) VALUES (?, ?) ON CONFLICT(code) DO NOTHING",
                vec![Value::from(*name), Value::from(*code)],
            );
            db.execute(stmt).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(ProjectSupportedTranscriptLanguages::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(SupportedTranscriptLanguages::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum SupportedTranscriptLanguages {
    Table,
    Id,
    Name,
    Code,
}

#[derive(DeriveIden)]
enum ProjectSupportedTranscriptLanguages {
    Table,
    Id,
    ProjectId,
    LanguageId,
}

#[derive(DeriveIden)]
enum Projects {
    Table,
    Id,
}
