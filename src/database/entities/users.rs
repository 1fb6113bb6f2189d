use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Minimal account record. Credentials live with the auth collaborator; this
/// table only carries what projects and client jobs reference.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub email: String,
    pub role: String, // "admin", "creator", "client"
    pub is_active: bool,
    pub date_joined: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::projects::Entity")]
    Projects,
    #[sea_orm(has_many = "super::client_jobs::Entity")]
    ClientJobs,
}

impl Related<super::projects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Projects.def()
    }
}

impl Related<super::client_jobs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClientJobs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn user_role(&self) -> Option<UserRole> {
        self.role.parse().ok()
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UserRole {
    Admin,
    Creator,
    Client,
}

impl From<UserRole> for String {
    fn from(role: UserRole) -> Self {
        role.as_ref().to_string()
    }
}
