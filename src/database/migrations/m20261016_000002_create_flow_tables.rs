use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Nodes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Nodes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Nodes::ProjectId).integer().not_null())
                    .col(
                        ColumnDef::new(Nodes::NodeInternalId)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Nodes::NodeType).string_len(20).not_null())
                    .col(ColumnDef::new(Nodes::Label).string().not_null())
                    .col(ColumnDef::new(Nodes::PositionX).double().not_null())
                    .col(ColumnDef::new(Nodes::PositionY).double().not_null())
                    .col(
                        ColumnDef::new(Nodes::CreatedAt)
                            .date_time()
                            .not_null()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .col(
                        ColumnDef::new(Nodes::UpdatedAt)
                            .date_time()
                            .not_null()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .index(
                        Index::create()
                            .name("idx_nodes_project_internal_id")
                            .col(Nodes::ProjectId)
                            .col(Nodes::NodeInternalId)
                            .unique(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_nodes_project")
                            .from(Nodes::Table, Nodes::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Edges::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Edges::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Edges::ProjectId).integer().not_null())
                    .col(
                        ColumnDef::new(Edges::EdgeInternalId)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Edges::SourceId).integer().not_null())
                    .col(ColumnDef::new(Edges::TargetId).integer().not_null())
                    .col(
                        ColumnDef::new(Edges::CreatedAt)
                            .date_time()
                            .not_null()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .index(
                        Index::create()
                            .name("idx_edges_project_source_target")
                            .col(Edges::ProjectId)
                            .col(Edges::SourceId)
                            .col(Edges::TargetId)
                            .unique(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_edges_project")
                            .from(Edges::Table, Edges::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_edges_source")
                            .from(Edges::Table, Edges::SourceId)
                            .to(Nodes::Table, Nodes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_edges_target")
                            .from(Edges::Table, Edges::TargetId)
                            .to(Nodes::Table, Nodes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AiNodes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AiNodes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AiNodes::NodeId)
                            .integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(AiNodes::Prompt).text().not_null())
                    .col(
                        ColumnDef::new(AiNodes::UpdatedAt)
                            .date_time()
                            .not_null()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ai_nodes_node")
                            .from(AiNodes::Table, AiNodes::NodeId)
                            .to(Nodes::Table, Nodes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AiNodeExamples::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AiNodeExamples::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AiNodeExamples::AiNodeId).integer().not_null())
                    .col(ColumnDef::new(AiNodeExamples::Name).string().not_null())
                    .col(ColumnDef::new(AiNodeExamples::InputText).text().not_null())
                    .col(ColumnDef::new(AiNodeExamples::OutputText).text().not_null())
                    .col(
                        ColumnDef::new(AiNodeExamples::CreatedAt)
                            .date_time()
                            .not_null()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ai_node_examples_ai_node")
                            .from(AiNodeExamples::Table, AiNodeExamples::AiNodeId)
                            .to(AiNodes::Table, AiNodes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CodeNodes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CodeNodes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CodeNodes::NodeId)
                            .integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(CodeNodes::Code).text().not_null())
                    .col(
                        ColumnDef::new(CodeNodes::UpdatedAt)
                            .date_time()
                            .not_null()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_code_nodes_node")
                            .from(CodeNodes::Table, CodeNodes::NodeId)
                            .to(Nodes::Table, Nodes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TemplateNodes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TemplateNodes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TemplateNodes::NodeId)
                            .integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(TemplateNodes::Template).text().not_null())
                    .col(
                        ColumnDef::new(TemplateNodes::UpdatedAt)
                            .date_time()
                            .not_null()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_template_nodes_node")
                            .from(TemplateNodes::Table, TemplateNodes::NodeId)
                            .to(Nodes::Table, Nodes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TemplateNodes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CodeNodes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AiNodeExamples::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AiNodes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Edges::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Nodes::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Nodes {
    Table,
    Id,
    ProjectId,
    NodeInternalId,
    NodeType,
    Label,
    PositionX,
    PositionY,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Edges {
    Table,
    Id,
    ProjectId,
    EdgeInternalId,
    SourceId,
    TargetId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum AiNodes {
    Table,
    Id,
    NodeId,
    Prompt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum AiNodeExamples {
    Table,
    Id,
    AiNodeId,
    Name,
    InputText,
    OutputText,
    CreatedAt,
}

#[derive(DeriveIden)]
enum CodeNodes {
    Table,
    Id,
    NodeId,
    Code,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum TemplateNodes {
    Table,
    Id,
    NodeId,
    Template,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Projects {
    Table,
    Id,
}
