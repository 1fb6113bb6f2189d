use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Directed connection between two nodes of the same project.
///
/// Unlike the node table, endpoints are stored as node primary keys; the
/// codec maps them back to `node_internal_id` when serializing. At most one
/// edge exists per (project, source, target).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "edges")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub project_id: i32,
    pub edge_internal_id: String,
    pub source_id: i32,
    pub target_id: i32,
    pub created_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::projects::Entity",
        from = "Column::ProjectId",
        to = "super::projects::Column::Id"
    )]
    Projects,
    #[sea_orm(
        belongs_to = "super::nodes::Entity",
        from = "Column::SourceId",
        to = "super::nodes::Column::Id"
    )]
    SourceNode,
    #[sea_orm(
        belongs_to = "super::nodes::Entity",
        from = "Column::TargetId",
        to = "super::nodes::Column::Id"
    )]
    TargetNode,
}

impl Related<super::projects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Projects.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
