use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

use crate::model::{Database, DatabaseResult, ResourceType, ResourceTyped};
use crate::params;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct User {
    id: Uuid,
    username: String,
    #[serde(skip)]
    password: String,
    last_login: Option<NaiveDateTime>,
    profile_avatar_uri: Option<String>,
    profile_banner_uri: Option<String>,
    role: String,
    status: String,
}

/// Profile fields accepted by [`Database::update_user`].
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct UserUpdate {
    pub username: String,
    pub profile_avatar_uri: Option<String>,
    pub profile_banner_uri: Option<String>,
}

impl ResourceTyped for User {
    fn get_resource_type() -> ResourceType {
        ResourceType::User
    }
}

impl User {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn hash(&self) -> &str {
        &self.password
    }

    pub fn last_login(&self) -> Option<&NaiveDateTime> {
        self.last_login.as_ref()
    }

    pub fn profile_avatar_uri(&self) -> Option<&str> {
        self.profile_avatar_uri.as_deref()
    }

    pub fn profile_banner_uri(&self) -> Option<&str> {
        self.profile_banner_uri.as_deref()
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn status(&self) -> &str {
        &self.status
    }
}

const INSERT_USER: &str = "INSERT INTO users (username, password) VALUES ($1, $2) \
     RETURNING id, username, password, last_login, profile_avatar_uri, profile_banner_uri, \
     role::text AS role, status::text AS status";

const SELECT_USER_BY_ID: &str = "SELECT id, username, password, last_login, profile_avatar_uri, \
     profile_banner_uri, role::text AS role, status::text AS status FROM users WHERE id = $1";

const SELECT_USER_BY_USERNAME: &str = "SELECT id, username, password, last_login, \
     profile_avatar_uri, profile_banner_uri, role::text AS role, status::text AS status \
     FROM users WHERE username = $1";

const UPDATE_USER: &str = "UPDATE users SET username = $2, profile_avatar_uri = $3, \
     profile_banner_uri = $4 WHERE id = $1 \
     RETURNING id, username, password, last_login, profile_avatar_uri, profile_banner_uri, \
     role::text AS role, status::text AS status";

const DELETE_USER: &str = "DELETE FROM users WHERE id = $1";

const UPDATE_LAST_LOGIN: &str = "UPDATE users SET last_login = now() WHERE id = $1";

impl Database {
    /// `password` is stored as given; hashing is the caller's job.
    #[tracing::instrument(skip(self, password))]
    pub async fn create_user(&self, username: &str, password: &str) -> DatabaseResult<User> {
        self.exec_one(INSERT_USER, &params![username, password]).await
    }

    pub async fn get_user_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>> {
        self.exec_optional(SELECT_USER_BY_ID, &params![id]).await
    }

    pub async fn get_user_by_username(&self, username: &str) -> DatabaseResult<Option<User>> {
        self.exec_optional(SELECT_USER_BY_USERNAME, &params![username])
            .await
    }

    /// `None` when no user has this id.
    #[tracing::instrument(skip(self))]
    pub async fn update_user(&self, id: Uuid, data: UserUpdate) -> DatabaseResult<Option<User>> {
        let params = params![
            id,
            data.username,
            data.profile_avatar_uri,
            data.profile_banner_uri
        ];
        self.exec_optional(UPDATE_USER, &params).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_user(&self, id: Uuid) -> DatabaseResult<bool> {
        let affected = self.exec_affected(DELETE_USER, &params![id]).await?;
        Ok(affected > 0)
    }

    pub async fn update_last_login(&self, id: Uuid) -> DatabaseResult<bool> {
        let affected = self.exec_affected(UPDATE_LAST_LOGIN, &params![id]).await?;
        Ok(affected > 0)
    }
}
