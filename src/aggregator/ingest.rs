use chrono::DateTime;

use crate::feed::RssDocument;
use crate::storage::{Database, Feed, NewPost, StoreError};

/// Fixed publication date format: RFC 1123 with numeric zone,
/// e.g. `Mon, 02 Jan 2006 15:04:05 -0700`.
pub const PUB_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

/// Persist the items of a fetched feed, returning the count of newly
/// inserted posts.
///
/// Two-phase protocol: the feed is stamped as fetched *before* any item is
/// processed, so a crash mid-batch still advances the rotation instead of
/// pinning this feed ahead of others. Items are processed in document
/// order; an unparseable `pubDate` skips just that item, a URL conflict
/// means the post was already ingested and is silently skipped, and any
/// other store error is logged and skipped without aborting the batch.
pub async fn ingest(
    db: &Database,
    feed: &Feed,
    doc: &RssDocument,
) -> Result<usize, StoreError> {
    db.mark_feed_fetched(feed.id).await?;

    let mut inserted = 0;
    for item in &doc.channel.items {
        let published_at = match DateTime::parse_from_str(&item.pub_date, PUB_DATE_FORMAT) {
            Ok(dt) => Some(dt.timestamp()),
            Err(e) => {
                tracing::warn!(
                    feed_id = feed.id,
                    url = %item.link,
                    pub_date = %item.pub_date,
                    error = %e,
                    "Unparseable publication date, skipping item"
                );
                continue;
            }
        };

        let post = NewPost {
            title: item.title.clone(),
            url: item.link.clone(),
            description: item.description.clone().filter(|d| !d.is_empty()),
            published_at,
        };

        match db.create_post(feed.id, &post).await {
            Ok(_) => inserted += 1,
            // Already ingested in a previous cycle; expected and not an error
            Err(StoreError::Conflict) => {}
            Err(e) => {
                tracing::warn!(
                    feed_id = feed.id,
                    url = %post.url,
                    error = %e,
                    "Failed to store post, skipping item"
                );
            }
        }
    }

    Ok(inserted)
}
