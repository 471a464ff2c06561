use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    Set,
};

use crate::{
    catalog::ensure_deleted,
    entities::user,
    error::{AppError, AppResult},
};

#[derive(Clone, Debug, Default)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_staff: bool,
    pub is_superuser: bool,
}

/// User accounts. Orders hang off users and go when the user goes.
#[derive(Clone)]
pub struct Accounts {
    db: DatabaseConnection,
    hash_cost: u32,
}

impl Accounts {
    pub fn new(db: DatabaseConnection, hash_cost: u32) -> Self {
        Self { db, hash_cost }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub async fn create_user(&self, new: NewUser) -> AppResult<user::Model> {
        let password_hash = bcrypt::hash(&new.password, self.hash_cost)?;
        let model = user::ActiveModel {
            username: Set(new.username),
            password_hash: Set(password_hash),
            email: Set(new.email),
            first_name: Set(new.first_name),
            last_name: Set(new.last_name),
            is_staff: Set(new.is_staff),
            is_active: Set(true),
            is_superuser: Set(new.is_superuser),
            date_joined: Set(jiff::Timestamp::now().as_second()),
            last_login: Set(None),
            ..Default::default()
        };
        let user = model.insert(&self.db).await?;
        tracing::debug!(id = user.id, username = %user.username, "user created");
        Ok(user)
    }

    pub async fn user(&self, id: i32) -> AppResult<user::Model> {
        user::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("user", id))
    }

    pub async fn user_by_username(&self, username: &str) -> AppResult<Option<user::Model>> {
        Ok(user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?)
    }

    /// Returns the user when the password matches an active account and
    /// records the login time.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> AppResult<Option<user::Model>> {
        let Some(user) = self.user_by_username(username).await? else {
            return Ok(None);
        };
        if !user.is_active || !bcrypt::verify(password, &user.password_hash)? {
            tracing::debug!(username, "authentication failed");
            return Ok(None);
        }

        let mut model = user.into_active_model();
        model.last_login = Set(Some(jiff::Timestamp::now().as_second()));
        Ok(Some(model.update(&self.db).await?))
    }

    pub async fn set_password(&self, id: i32, password: &str) -> AppResult<()> {
        let mut model = self.user(id).await?.into_active_model();
        model.password_hash = Set(bcrypt::hash(password, self.hash_cost)?);
        model.update(&self.db).await?;
        Ok(())
    }

    pub async fn set_active(&self, id: i32, active: bool) -> AppResult<user::Model> {
        let mut model = self.user(id).await?.into_active_model();
        model.is_active = Set(active);
        Ok(model.update(&self.db).await?)
    }

    pub async fn delete_user(&self, id: i32) -> AppResult<()> {
        let res = user::Entity::delete_by_id(id).exec(&self.db).await?;
        ensure_deleted(res, "user", id)
    }
}
