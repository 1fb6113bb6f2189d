use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ProjectClients::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProjectClients::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ProjectClients::ClientId)
                            .integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(ProjectClients::ProjectId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_project_clients_client")
                            .from(ProjectClients::Table, ProjectClients::ClientId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_project_clients_project")
                            .from(ProjectClients::Table, ProjectClients::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ClientJobs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ClientJobs::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ClientJobs::UserId).integer().not_null())
                    .col(ColumnDef::new(ClientJobs::Name).string().not_null())
                    .col(ColumnDef::new(ClientJobs::OutputMarkdown).text().null())
                    .col(
                        ColumnDef::new(ClientJobs::CreatedAt)
                            .date_time()
                            .not_null()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .col(
                        ColumnDef::new(ClientJobs::UpdatedAt)
                            .date_time()
                            .not_null()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_client_jobs_user")
                            .from(ClientJobs::Table, ClientJobs::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Transcripts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transcripts::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transcripts::JobId).integer().not_null())
                    .col(ColumnDef::new(Transcripts::Content).text().not_null())
                    .col(
                        ColumnDef::new(Transcripts::CreatedAt)
                            .date_time()
                            .not_null()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .col(
                        ColumnDef::new(Transcripts::UpdatedAt)
                            .date_time()
                            .not_null()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transcripts_job")
                            .from(Transcripts::Table, Transcripts::JobId)
                            .to(ClientJobs::Table, ClientJobs::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Transcripts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ClientJobs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProjectClients::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ProjectClients {
    Table,
    Id,
    ClientId,
    ProjectId,
}

#[derive(DeriveIden)]
enum ClientJobs {
    Table,
    Id,
    UserId,
    Name,
    OutputMarkdown,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Transcripts {
    Table,
    Id,
    JobId,
    Content,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Projects {
    Table,
    Id,
}
