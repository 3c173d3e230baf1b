use chrono::Utc;

use super::schema::Database;
use super::types::{FeedFollow, FollowSummary, StoreError};

impl Database {
    // ========================================================================
    // Follow Operations
    // ========================================================================

    /// Create a follow edge and return it joined with the feed and user
    /// names. A second follow for the same `(user_id, feed_id)` pair is
    /// rejected by the uniqueness constraint as `StoreError::Conflict`.
    pub async fn create_follow(
        &self,
        user_id: i64,
        feed_id: i64,
    ) -> Result<FollowSummary, StoreError> {
        let now = Utc::now().timestamp();
        let follow = sqlx::query_as::<_, FeedFollow>(
            r#"
            INSERT INTO feed_follows (user_id, feed_id, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            RETURNING id, user_id, feed_id, created_at, updated_at
        "#,
        )
        .bind(user_id)
        .bind(feed_id)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?;

        let summary = sqlx::query_as::<_, FollowSummary>(
            r#"
            SELECT feeds.name AS feed_name, users.name AS user_name
            FROM feed_follows
            INNER JOIN feeds ON feeds.id = feed_follows.feed_id
            INNER JOIN users ON users.id = feed_follows.user_id
            WHERE feed_follows.id = ?
        "#,
        )
        .bind(follow.id)
        .fetch_one(&self.pool)
        .await?;
        Ok(summary)
    }

    /// Names of the feeds a user follows, in follow order.
    pub async fn follows_for_user(&self, user_id: i64) -> Result<Vec<String>, StoreError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT feeds.name
            FROM feed_follows
            INNER JOIN feeds ON feeds.id = feed_follows.feed_id
            WHERE feed_follows.user_id = ?
            ORDER BY feed_follows.id
        "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    /// Delete the follow for `(user_id, feed_id)`. Deleting a non-existent
    /// follow is a silent no-op, not an error.
    pub async fn delete_follow(&self, user_id: i64, feed_id: i64) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM feed_follows WHERE user_id = ? AND feed_id = ?")
            .bind(user_id)
            .bind(feed_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
