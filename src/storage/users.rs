use chrono::Utc;

use super::schema::Database;
use super::types::{StoreError, User};

impl Database {
    // ========================================================================
    // User Operations
    // ========================================================================

    /// Create a user. Names are unique and case-sensitive; a duplicate name
    /// yields `StoreError::Conflict`.
    pub async fn create_user(&self, name: &str) -> Result<User, StoreError> {
        let now = Utc::now().timestamp();
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, created_at, updated_at)
            VALUES (?, ?, ?)
            RETURNING id, name, created_at, updated_at
        "#,
        )
        .bind(name)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)
    }

    /// Look up a user by exact name.
    pub async fn get_user_by_name(&self, name: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, created_at, updated_at FROM users WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// List all users in registration order.
    pub async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, name, created_at, updated_at FROM users ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    /// Bulk reset: delete every user. Feeds, follows, and posts go with them
    /// via ON DELETE CASCADE.
    pub async fn delete_all_users(&self) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM users").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> Database {
        Database::open(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get_user() {
        let db = test_db().await;
        let user = db.create_user("alice").await.unwrap();
        assert_eq!(user.name, "alice");

        let found = db.get_user_by_name("alice").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert!(db.get_user_by_name("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_user_is_conflict() {
        let db = test_db().await;
        db.create_user("alice").await.unwrap();
        let err = db.create_user("alice").await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict));
    }

    #[tokio::test]
    async fn test_user_names_are_case_sensitive() {
        let db = test_db().await;
        db.create_user("alice").await.unwrap();
        // Different case is a different user, not a conflict
        db.create_user("Alice").await.unwrap();
        assert!(db.get_user_by_name("ALICE").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reset_cascades() {
        let db = test_db().await;
        let user = db.create_user("alice").await.unwrap();
        let feed = db
            .create_feed("Blog", "https://example.com/rss", user.id)
            .await
            .unwrap();
        db.create_follow(user.id, feed.id).await.unwrap();

        db.delete_all_users().await.unwrap();
        assert!(db.list_users().await.unwrap().is_empty());
        assert!(db.next_feed_to_fetch().await.unwrap().is_none());
    }
}
