use uuid::Uuid;

use crate::model::{Database, DatabaseResult};
use crate::params;

const INSERT_LIKE: &str = "INSERT INTO likes (user_id, post_id) VALUES ($1, $2) \
     ON CONFLICT (user_id, post_id) DO NOTHING";

const DELETE_LIKE: &str = "DELETE FROM likes WHERE user_id = $1 AND post_id = $2";

const COUNT_LIKES: &str = "SELECT COUNT(*) FROM likes WHERE post_id = $1";

const LIKE_EXISTS: &str =
    "SELECT EXISTS(SELECT 1 FROM likes WHERE user_id = $1 AND post_id = $2)";

impl Database {
    /// Returns `false` when the pair was already liked.
    #[tracing::instrument(skip(self))]
    pub async fn like_post(&self, user_id: Uuid, post_id: Uuid) -> DatabaseResult<bool> {
        let affected = self
            .exec_affected(INSERT_LIKE, &params![user_id, post_id])
            .await?;
        Ok(affected > 0)
    }

    #[tracing::instrument(skip(self))]
    pub async fn unlike_post(&self, user_id: Uuid, post_id: Uuid) -> DatabaseResult<bool> {
        let affected = self
            .exec_affected(DELETE_LIKE, &params![user_id, post_id])
            .await?;
        Ok(affected > 0)
    }

    pub async fn get_post_likes_count(&self, post_id: Uuid) -> DatabaseResult<i64> {
        let (count,): (i64,) = self.exec_one(COUNT_LIKES, &params![post_id]).await?;
        Ok(count)
    }

    pub async fn is_post_liked_by_user(&self, user_id: Uuid, post_id: Uuid) -> DatabaseResult<bool> {
        let (liked,): (bool,) = self
            .exec_one(LIKE_EXISTS, &params![user_id, post_id])
            .await?;
        Ok(liked)
    }
}
