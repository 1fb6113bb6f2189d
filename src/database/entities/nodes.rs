use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Flow node record.
///
/// `node_internal_id` is the client-assigned identifier that edges and the
/// editor refer to; it is unique per project (see `idx_nodes_project_internal_id`).
/// `node_type` decides which payload table, if any, carries the rest of the node:
/// - `ai_node`: `ai_nodes` (+ `ai_node_examples`)
/// - `code_node`: `code_nodes`
/// - `template_node`: `template_nodes`
/// - `input_node` / `output_node`: none
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "nodes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub project_id: i32,
    pub node_internal_id: String,
    pub node_type: String,
    pub label: String,
    #[sea_orm(column_type = "Double")]
    pub position_x: f64,
    #[sea_orm(column_type = "Double")]
    pub position_y: f64,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::projects::Entity",
        from = "Column::ProjectId",
        to = "super::projects::Column::Id"
    )]
    Projects,
    #[sea_orm(has_one = "super::ai_nodes::Entity")]
    AiNode,
    #[sea_orm(has_one = "super::code_nodes::Entity")]
    CodeNode,
    #[sea_orm(has_one = "super::template_nodes::Entity")]
    TemplateNode,
}

impl Related<super::projects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Projects.def()
    }
}

impl Related<super::ai_nodes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AiNode.def()
    }
}

impl Related<super::code_nodes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CodeNode.def()
    }
}

impl Related<super::template_nodes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TemplateNode.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
