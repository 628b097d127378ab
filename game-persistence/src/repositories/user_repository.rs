use anyhow::Result;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use std::collections::HashMap;
use uuid::Uuid;

use crate::entities::{prelude::*, users};
use game_types::User;

pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn model_to_user(model: users::Model) -> User {
        User {
            id: model.id,
            email: model.email,
            display_name: model.display_name,
            image: model.image,
            created_at: model.created_at.to_rfc3339(),
        }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let user_model = Users::find_by_id(id).one(&self.db).await?;
        Ok(user_model.map(Self::model_to_user))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user_model = Users::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await?;

        Ok(user_model.map(Self::model_to_user))
    }

    /// Insert the user on first sign-in, refresh their profile afterwards.
    pub async fn upsert_user(&self, user: User) -> Result<User> {
        let now: sea_orm::prelude::DateTimeWithTimeZone = chrono::Utc::now().into();

        let existing = Users::find_by_id(user.id).one(&self.db).await?;
        match existing {
            Some(model) => {
                let updated_user = users::ActiveModel {
                    id: sea_orm::ActiveValue::Unchanged(model.id),
                    email: sea_orm::ActiveValue::Set(user.email),
                    display_name: sea_orm::ActiveValue::Set(user.display_name),
                    image: sea_orm::ActiveValue::Set(user.image),
                    created_at: sea_orm::ActiveValue::Unchanged(model.created_at),
                    updated_at: sea_orm::ActiveValue::Set(now),
                };
                Users::update(updated_user).exec(&self.db).await?;
            }
            None => {
                let created_at = chrono::DateTime::parse_from_rfc3339(&user.created_at)
                    .unwrap_or(now);

                let user_model = users::ActiveModel {
                    id: sea_orm::ActiveValue::Set(user.id),
                    email: sea_orm::ActiveValue::Set(user.email),
                    display_name: sea_orm::ActiveValue::Set(user.display_name),
                    image: sea_orm::ActiveValue::Set(user.image),
                    created_at: sea_orm::ActiveValue::Set(created_at),
                    updated_at: sea_orm::ActiveValue::Set(now),
                };
                Users::insert(user_model).exec(&self.db).await?;
            }
        }

        let stored = Users::find_by_id(user.id)
            .one(&self.db)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Failed to retrieve stored user"))?;

        Ok(Self::model_to_user(stored))
    }

    /// Display names for the given ids. Unknown ids are simply absent.
    pub async fn display_names(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, String>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let models = Users::find()
            .filter(users::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await?;

        Ok(models
            .into_iter()
            .map(|model| (model.id, model.display_name))
            .collect())
    }
}
