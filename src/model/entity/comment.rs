use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

use crate::model::{Database, DatabaseResult, ResourceType, ResourceTyped};
use crate::params;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Comment {
    id: Uuid,
    user_id: Uuid,
    post_id: Uuid,
    text: String,
    created_at: NaiveDateTime,
}

/// A comment joined with the commenter's public profile.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct CommentWithAuthor {
    id: Uuid,
    user_id: Uuid,
    post_id: Uuid,
    text: String,
    created_at: NaiveDateTime,
    username: String,
    profile_avatar_uri: Option<String>,
}

impl ResourceTyped for Comment {
    fn get_resource_type() -> ResourceType {
        ResourceType::Comment
    }
}

impl Comment {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn post_id(&self) -> Uuid {
        self.post_id
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl CommentWithAuthor {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

const INSERT_COMMENT: &str = "INSERT INTO comments (user_id, post_id, text) VALUES ($1, $2, $3) \
     RETURNING id, user_id, post_id, text, created_at";

const SELECT_POST_COMMENTS: &str = "SELECT c.id, c.user_id, c.post_id, c.text, c.created_at, \
     u.username, u.profile_avatar_uri \
     FROM comments c JOIN users u ON u.id = c.user_id \
     WHERE c.post_id = $1 ORDER BY c.created_at ASC, c.id LIMIT $2 OFFSET $3";

const DELETE_COMMENT: &str = "DELETE FROM comments WHERE id = $1";

impl Database {
    #[tracing::instrument(skip(self, text))]
    pub async fn create_comment(
        &self,
        user_id: Uuid,
        post_id: Uuid,
        text: &str,
    ) -> DatabaseResult<Comment> {
        self.exec_one(INSERT_COMMENT, &params![user_id, post_id, text])
            .await
    }

    /// Oldest first.
    pub async fn get_post_comments(
        &self,
        post_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> DatabaseResult<Vec<CommentWithAuthor>> {
        self.exec_as(SELECT_POST_COMMENTS, &params![post_id, limit, offset])
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_comment(&self, id: Uuid) -> DatabaseResult<bool> {
        let affected = self.exec_affected(DELETE_COMMENT, &params![id]).await?;
        Ok(affected > 0)
    }
}
