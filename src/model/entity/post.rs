use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

use crate::model::{
    BusinessRuleViolation, Database, DatabaseResult, ResourceType, ResourceTyped,
    database::{begin, finish, sql_error},
};
use crate::params;

/// Maximum number of posts one author may create within [`POST_LIMIT_WINDOW_DAYS`].
pub const POST_LIMIT: i64 = 7;
pub const POST_LIMIT_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Post {
    id: Uuid,
    author_id: Uuid,
    text: Option<String>,
    image_uri: Option<String>,
    created_at: NaiveDateTime,
}

/// A post joined with its author's public profile.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct PostWithAuthor {
    id: Uuid,
    author_id: Uuid,
    text: Option<String>,
    image_uri: Option<String>,
    created_at: NaiveDateTime,
    author_username: String,
    author_avatar_uri: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct PostCreate {
    pub author_id: Uuid,
    pub text: Option<String>,
    pub image_uri: Option<String>,
}

impl ResourceTyped for Post {
    fn get_resource_type() -> ResourceType {
        ResourceType::Post
    }
}

impl Post {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn author_id(&self) -> Uuid {
        self.author_id
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn image_uri(&self) -> Option<&str> {
        self.image_uri.as_deref()
    }

    pub fn created_at(&self) -> &NaiveDateTime {
        &self.created_at
    }
}

impl PostWithAuthor {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn author_id(&self) -> Uuid {
        self.author_id
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn author_username(&self) -> &str {
        &self.author_username
    }
}

const COUNT_RECENT_POSTS: &str = "SELECT COUNT(*) FROM posts \
     WHERE author_id = $1 AND created_at > now() - make_interval(days => $2::int)";

const INSERT_POST: &str = "INSERT INTO posts (author_id, text, image_uri) VALUES ($1, $2, $3) \
     RETURNING id, author_id, text, image_uri, created_at";

const SELECT_POST_BY_ID: &str = "SELECT p.id, p.author_id, p.text, p.image_uri, p.created_at, \
     u.username AS author_username, u.profile_avatar_uri AS author_avatar_uri \
     FROM posts p JOIN users u ON u.id = p.author_id WHERE p.id = $1";

const SELECT_POSTS: &str = "SELECT p.id, p.author_id, p.text, p.image_uri, p.created_at, \
     u.username AS author_username, u.profile_avatar_uri AS author_avatar_uri \
     FROM posts p JOIN users u ON u.id = p.author_id \
     ORDER BY random() LIMIT $1 OFFSET $2";

const SELECT_USER_POSTS: &str = "SELECT id, author_id, text, image_uri, created_at FROM posts \
     WHERE author_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3";

const DELETE_POST: &str = "DELETE FROM posts WHERE id = $1";

impl Database {
    /// Inserts a post unless the author already has [`POST_LIMIT`] posts in the trailing
    /// window. Count and insert share one transaction but are not serialized against a
    /// concurrent request from the same author.
    #[tracing::instrument(skip(self, data), fields(author_id = %data.author_id))]
    pub async fn create_post(&self, data: PostCreate) -> DatabaseResult<Post> {
        let mut conn = self.checkout().await?;
        let mut tx = begin(&mut conn).await?;

        let recent = sqlx::query_scalar::<_, i64>(COUNT_RECENT_POSTS)
            .bind(data.author_id)
            .bind(POST_LIMIT_WINDOW_DAYS)
            .fetch_one(&mut *tx)
            .await;
        let recent = match recent {
            Ok(recent) => recent,
            Err(e) => return finish(tx, COUNT_RECENT_POSTS, Err(e)).await,
        };

        if recent >= POST_LIMIT {
            if let Err(e) = tx.rollback().await {
                return Err(sql_error("ROLLBACK", e));
            }
            tracing::warn!(recent, "post limit reached");
            return Err(BusinessRuleViolation::PostLimitReached {
                limit: POST_LIMIT,
                window_days: POST_LIMIT_WINDOW_DAYS,
            }
            .into());
        }

        let inserted = sqlx::query_as::<_, Post>(INSERT_POST)
            .bind(data.author_id)
            .bind(data.text)
            .bind(data.image_uri)
            .fetch_one(&mut *tx)
            .await;
        let post = finish(tx, INSERT_POST, inserted).await?;
        self.pool().release(conn);
        Ok(post)
    }

    pub async fn get_post_by_id(&self, id: Uuid) -> DatabaseResult<Option<PostWithAuthor>> {
        self.exec_optional(SELECT_POST_BY_ID, &params![id]).await
    }

    /// A random page of posts.
    pub async fn get_posts(&self, limit: i64, offset: i64) -> DatabaseResult<Vec<PostWithAuthor>> {
        self.exec_as(SELECT_POSTS, &params![limit, offset]).await
    }

    /// Posts of one author, newest first.
    pub async fn get_user_posts(
        &self,
        author_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> DatabaseResult<Vec<Post>> {
        self.exec_as(SELECT_USER_POSTS, &params![author_id, limit, offset])
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_post(&self, id: Uuid) -> DatabaseResult<bool> {
        let affected = self.exec_affected(DELETE_POST, &params![id]).await?;
        Ok(affected > 0)
    }
}
