use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Catalog of languages a project may accept transcripts in.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "supported_transcript_languages")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(unique)]
    pub code: String, // ISO 639-1
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::project_transcript_languages::Entity")]
    ProjectLanguages,
}

impl Related<super::project_transcript_languages::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProjectLanguages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
