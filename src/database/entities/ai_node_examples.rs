use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Input/output pair demonstrating the behaviour expected from an AI node.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ai_node_examples")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub ai_node_id: i32,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub input_text: String,
    #[sea_orm(column_type = "Text")]
    pub output_text: String,
    pub created_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::ai_nodes::Entity",
        from = "Column::AiNodeId",
        to = "super::ai_nodes::Column::Id"
    )]
    AiNode,
}

impl Related<super::ai_nodes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AiNode.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
