use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tracing::info;

use crate::common::db_errors::is_unique_violation;
use crate::database::entities::users::{self, UserRole};
use crate::errors::{ProjectError, ProjectResult};
use crate::services::ValidationService;

#[derive(Clone)]
pub struct UserService {
    db: DatabaseConnection,
}

impl UserService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create_user(&self, email: &str, role: UserRole) -> ProjectResult<users::Model> {
        let email = ValidationService::validate_email(email)?;

        let existing = users::Entity::find()
            .filter(users::Column::Email.eq(email.as_str()))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(ProjectError::DuplicateEmail(email));
        }

        let user = users::ActiveModel {
            email: Set(email.clone()),
            role: Set(role.into()),
            is_active: Set(true),
            date_joined: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ProjectError::DuplicateEmail(email.clone())
            } else {
                ProjectError::Database(e)
            }
        })?;

        info!(user_id = user.id, role = %role, "Created user");
        Ok(user)
    }

    pub async fn get_user(&self, user_id: i32) -> ProjectResult<users::Model> {
        users::Entity::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or(ProjectError::UserNotFound(user_id))
    }

    /// Fetch a user and check they hold `role`
    pub async fn require_role(&self, user_id: i32, role: UserRole) -> ProjectResult<users::Model> {
        let user = self.get_user(user_id).await?;
        if user.user_role() != Some(role) {
            return Err(ProjectError::WrongRole {
                user_id,
                expected: role.to_string(),
            });
        }
        Ok(user)
    }
}
