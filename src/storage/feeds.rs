use chrono::Utc;

use super::schema::Database;
use super::types::{Feed, FeedListing, StoreError};

impl Database {
    // ========================================================================
    // Feed Operations
    // ========================================================================

    /// Create a feed. URLs are unique; a duplicate yields `StoreError::Conflict`.
    pub async fn create_feed(
        &self,
        name: &str,
        url: &str,
        user_id: i64,
    ) -> Result<Feed, StoreError> {
        let now = Utc::now().timestamp();
        sqlx::query_as::<_, Feed>(
            r#"
            INSERT INTO feeds (name, url, user_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, name, url, user_id, created_at, updated_at, last_fetched_at
        "#,
        )
        .bind(name)
        .bind(url)
        .bind(user_id)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)
    }

    /// Look up a feed by its canonical URL.
    pub async fn get_feed_by_url(&self, url: &str) -> Result<Option<Feed>, StoreError> {
        let feed = sqlx::query_as::<_, Feed>(
            r#"
            SELECT id, name, url, user_id, created_at, updated_at, last_fetched_at
            FROM feeds
            WHERE url = ?
        "#,
        )
        .bind(url)
        .fetch_optional(&self.pool)
        .await?;
        Ok(feed)
    }

    /// List all feeds with their creators' names.
    pub async fn list_feeds(&self) -> Result<Vec<FeedListing>, StoreError> {
        let feeds = sqlx::query_as::<_, FeedListing>(
            r#"
            SELECT feeds.name AS name, feeds.url AS url, users.name AS creator
            FROM feeds
            INNER JOIN users ON users.id = feeds.user_id
            ORDER BY feeds.id
        "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(feeds)
    }

    /// Select the one feed due for refresh: oldest `last_fetched_at` first,
    /// with NULL (never fetched) ahead of any timestamp and ties broken by
    /// creation order. `None` only when zero feeds exist.
    ///
    /// SQLite sorts NULL before any value on ASC, which is exactly the
    /// never-fetched-first rule.
    pub async fn next_feed_to_fetch(&self) -> Result<Option<Feed>, StoreError> {
        let feed = sqlx::query_as::<_, Feed>(
            r#"
            SELECT id, name, url, user_id, created_at, updated_at, last_fetched_at
            FROM feeds
            ORDER BY last_fetched_at ASC, id ASC
            LIMIT 1
        "#,
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(feed)
    }

    /// Stamp a feed as fetched now. The Ingestor calls this before touching
    /// any items so a crash mid-batch still advances the rotation.
    ///
    /// `last_fetched_at` holds epoch milliseconds and is always bumped past
    /// the newest stamp in the table: the clock can tick coarser than a
    /// polling cycle, and the rotation invariant (a just-fetched feed sorts
    /// behind every other) must hold regardless.
    pub async fn mark_feed_fetched(&self, feed_id: i64) -> Result<(), StoreError> {
        let now = Utc::now();
        sqlx::query(
            r#"
            UPDATE feeds
            SET last_fetched_at = MAX(
                    ?,
                    (SELECT COALESCE(MAX(last_fetched_at), 0) FROM feeds) + 1
                ),
                updated_at = ?
            WHERE id = ?
        "#,
        )
        .bind(now.timestamp_millis())
        .bind(now.timestamp())
        .bind(feed_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
