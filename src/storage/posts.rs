use chrono::Utc;

use super::schema::Database;
use super::types::{NewPost, Post, StoreError};

impl Database {
    // ========================================================================
    // Post Operations
    // ========================================================================

    /// Insert a post. The URL uniqueness constraint is the sole dedup
    /// mechanism: re-ingesting an already-seen item surfaces as
    /// `StoreError::Conflict`, which the Ingestor treats as "already
    /// ingested" rather than an error.
    pub async fn create_post(&self, feed_id: i64, post: &NewPost) -> Result<Post, StoreError> {
        let now = Utc::now().timestamp();
        sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (feed_id, title, url, description, published_at, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING id, feed_id, title, url, description, published_at, created_at, updated_at
        "#,
        )
        .bind(feed_id)
        .bind(&post.title)
        .bind(&post.url)
        .bind(&post.description)
        .bind(post.published_at)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)
    }

    /// The `limit` most recent posts across the feeds a user follows,
    /// ordered by publication time descending. Posts without a publication
    /// time sort last (SQLite: NULL is smallest, so DESC pushes it to the
    /// end), with insertion order as the final tiebreak.
    pub async fn posts_for_user(&self, user_id: i64, limit: i64) -> Result<Vec<Post>, StoreError> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT posts.id, posts.feed_id, posts.title, posts.url, posts.description,
                   posts.published_at, posts.created_at, posts.updated_at
            FROM posts
            INNER JOIN feed_follows ON feed_follows.feed_id = posts.feed_id
            WHERE feed_follows.user_id = ?
            ORDER BY posts.published_at DESC, posts.id DESC
            LIMIT ?
        "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(posts)
    }

    /// Total number of stored posts. Test and diagnostics helper.
    pub async fn count_posts(&self) -> Result<i64, StoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM posts")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> Database {
        Database::open(":memory:").await.unwrap()
    }

    fn test_post(url: &str, published_at: Option<i64>) -> NewPost {
        NewPost {
            title: format!("Post at {url}"),
            url: url.to_string(),
            description: Some("A test post".to_string()),
            published_at,
        }
    }

    #[tokio::test]
    async fn test_duplicate_post_url_is_conflict() {
        let db = test_db().await;
        let user = db.create_user("alice").await.unwrap();
        let feed = db
            .create_feed("Blog", "https://example.com/rss", user.id)
            .await
            .unwrap();

        let post = test_post("https://example.com/post-1", Some(1700000000));
        db.create_post(feed.id, &post).await.unwrap();
        let err = db.create_post(feed.id, &post).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict));
        assert_eq!(db.count_posts().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_browse_restricted_to_follows() {
        let db = test_db().await;
        let alice = db.create_user("alice").await.unwrap();
        let bob = db.create_user("bob").await.unwrap();
        let followed = db
            .create_feed("Followed", "https://a.example.com/rss", alice.id)
            .await
            .unwrap();
        let other = db
            .create_feed("Other", "https://b.example.com/rss", bob.id)
            .await
            .unwrap();
        db.create_follow(alice.id, followed.id).await.unwrap();

        db.create_post(followed.id, &test_post("https://a.example.com/1", Some(100)))
            .await
            .unwrap();
        db.create_post(other.id, &test_post("https://b.example.com/1", Some(200)))
            .await
            .unwrap();

        let posts = db.posts_for_user(alice.id, 10).await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].feed_id, followed.id);
    }

    #[tokio::test]
    async fn test_browse_orders_by_publish_time_desc() {
        let db = test_db().await;
        let user = db.create_user("alice").await.unwrap();
        let feed = db
            .create_feed("Blog", "https://example.com/rss", user.id)
            .await
            .unwrap();
        db.create_follow(user.id, feed.id).await.unwrap();

        for (i, ts) in [300, 100, 200, 500, 400].iter().enumerate() {
            db.create_post(
                feed.id,
                &test_post(&format!("https://example.com/{i}"), Some(*ts)),
            )
            .await
            .unwrap();
        }

        let posts = db.posts_for_user(user.id, 2).await.unwrap();
        let times: Vec<_> = posts.iter().map(|p| p.published_at.unwrap()).collect();
        assert_eq!(times, vec![500, 400]);
    }

    #[tokio::test]
    async fn test_undated_posts_sort_last() {
        let db = test_db().await;
        let user = db.create_user("alice").await.unwrap();
        let feed = db
            .create_feed("Blog", "https://example.com/rss", user.id)
            .await
            .unwrap();
        db.create_follow(user.id, feed.id).await.unwrap();

        db.create_post(feed.id, &test_post("https://example.com/undated", None))
            .await
            .unwrap();
        db.create_post(feed.id, &test_post("https://example.com/dated", Some(100)))
            .await
            .unwrap();

        let posts = db.posts_for_user(user.id, 10).await.unwrap();
        assert_eq!(posts[0].url, "https://example.com/dated");
        assert_eq!(posts[1].url, "https://example.com/undated");
    }
}
