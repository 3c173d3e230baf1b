use sqlx::FromRow;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Store-level errors surfaced to the engine and the command handlers.
///
/// Uniqueness violations are mapped to a structured `Conflict` kind so callers
/// can branch on them without inspecting driver error text. The Ingestor
/// swallows `Conflict` for posts (expected, high-frequency); the command
/// handlers propagate it for users, feeds, and follows.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write (duplicate user name,
    /// feed URL, follow pair, or post URL).
    #[error("record already exists")]
    Conflict,

    /// Migration failed
    #[error("Database migration failed: {0}")]
    Migration(String),

    /// Generic database error
    #[error("Database error: {0}")]
    Other(#[from] sqlx::Error),
}

impl StoreError {
    /// Map a sqlx error, promoting unique-constraint violations to `Conflict`.
    pub(crate) fn from_sqlx(err: sqlx::Error) -> Self {
        if is_unique_violation(&err) {
            return StoreError::Conflict;
        }
        StoreError::Other(err)
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

// ============================================================================
// Entities
// ============================================================================

/// A registered user. Names are unique and case-sensitive.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// A subscribable source identified by URL, polled periodically.
///
/// `last_fetched_at` is NULL until the feed has been successfully polled
/// once; the selector treats NULL as older than any timestamp.
#[derive(Debug, Clone, FromRow)]
pub struct Feed {
    pub id: i64,
    pub name: String,
    pub url: String,
    /// Creator of the feed; informational only.
    pub user_id: i64,
    pub created_at: i64,
    pub updated_at: i64,
    /// Epoch milliseconds of the last successful poll start; see
    /// `Database::mark_feed_fetched` for the monotonic bump.
    pub last_fetched_at: Option<i64>,
}

/// A user's subscription edge to a feed, unique per `(user_id, feed_id)`.
#[derive(Debug, Clone, FromRow)]
pub struct FeedFollow {
    pub id: i64,
    pub user_id: i64,
    pub feed_id: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// A single ingested item, deduplicated by URL.
#[derive(Debug, Clone, FromRow)]
pub struct Post {
    pub id: i64,
    pub feed_id: i64,
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    /// Publication time as epoch seconds; NULL when the item carried none.
    pub published_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

// ============================================================================
// Write / Read Models
// ============================================================================

/// A post candidate produced by the Ingestor from one fetched item.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    pub published_at: Option<i64>,
}

/// One row of the `feeds` listing: feed plus its creator's name.
#[derive(Debug, Clone, FromRow)]
pub struct FeedListing {
    pub name: String,
    pub url: String,
    pub creator: String,
}

/// Names joined onto a newly created follow, for operator feedback.
#[derive(Debug, Clone, FromRow)]
pub struct FollowSummary {
    pub feed_name: String,
    pub user_name: String,
}
