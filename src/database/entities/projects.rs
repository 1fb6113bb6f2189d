use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAIN_COLOR: &str = "#007FFF";

/// A creator-owned system. Owns the flow graph (nodes, edges) and the set of
/// enabled transcript languages; deleting a project cascades to all of them.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub human_name: Option<String>,
    #[sea_orm(unique)]
    pub slug: String, // URL name used by clients, `^[a-z0-9-]+$`
    #[sea_orm(column_type = "Text")]
    pub description: Option<String>,
    pub creator_id: i32,
    pub main_color: String,
    pub logo: Option<String>, // stored path, upload handling lives elsewhere
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::CreatorId",
        to = "super::users::Column::Id"
    )]
    Creator,
    #[sea_orm(has_many = "super::nodes::Entity")]
    Nodes,
    #[sea_orm(has_many = "super::edges::Entity")]
    Edges,
    #[sea_orm(has_many = "super::project_transcript_languages::Entity")]
    TranscriptLanguages,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Creator.def()
    }
}

impl Related<super::nodes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Nodes.def()
    }
}

impl Related<super::edges::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Edges.def()
    }
}

impl Related<super::project_transcript_languages::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TranscriptLanguages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub fn new() -> Self {
        Self {
            id: ActiveValue::NotSet,
            name: ActiveValue::NotSet,
            human_name: Set(None),
            slug: ActiveValue::NotSet,
            description: Set(None),
            creator_id: ActiveValue::NotSet,
            main_color: Set(DEFAULT_MAIN_COLOR.to_string()),
            logo: Set(None),
            created_at: Set(chrono::Utc::now()),
            updated_at: Set(chrono::Utc::now()),
        }
    }

    pub fn set_updated_at(mut self) -> Self {
        self.updated_at = Set(chrono::Utc::now());
        self
    }
}
