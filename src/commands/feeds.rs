use chrono::{TimeZone, Utc};
use url::Url;

use super::{Command, CommandError, State};
use crate::storage::{Feed, StoreError, User};

/// Default number of posts shown by `browse` when no limit is given.
const DEFAULT_BROWSE_LIMIT: i64 = 2;

/// `addfeed <name> <url>`: create a feed; the creator auto-follows it.
pub async fn add_feed(state: &mut State, user: User, cmd: Command) -> Result<(), CommandError> {
    let [name, url] = cmd.args.as_slice() else {
        return Err(CommandError::Usage("addfeed <name> <url>".to_string()));
    };
    if Url::parse(url).is_err() {
        return Err(CommandError::Usage(format!(
            "addfeed <name> <url>: {url} is not a valid URL"
        )));
    }

    let feed = match state.db.create_feed(name, url, user.id).await {
        Ok(feed) => feed,
        Err(StoreError::Conflict) => {
            return Err(CommandError::Conflict(format!(
                "feed {url} already exists"
            )))
        }
        Err(e) => return Err(e.into()),
    };

    // Second write of the pair; a failure here fails the whole command
    state.db.create_follow(user.id, feed.id).await?;
    println!("Added feed {} ({})", feed.name, feed.url);
    Ok(())
}

/// `feeds`: list every feed with its creator's name.
pub async fn list(state: &mut State, _cmd: Command) -> Result<(), CommandError> {
    for feed in state.db.list_feeds().await? {
        println!("* {} ({}) added by {}", feed.name, feed.url, feed.creator);
    }
    Ok(())
}

/// `follow <url>`: subscribe the current user to a known feed.
pub async fn follow(state: &mut State, user: User, cmd: Command) -> Result<(), CommandError> {
    let url = cmd
        .args
        .first()
        .ok_or_else(|| CommandError::Usage("follow <url>".to_string()))?;

    let feed = resolve_feed(state, url).await?;
    match state.db.create_follow(user.id, feed.id).await {
        Ok(summary) => {
            println!("{} is now following {}", summary.user_name, summary.feed_name);
            Ok(())
        }
        Err(StoreError::Conflict) => Err(CommandError::Conflict(format!(
            "{} already follows {}",
            user.name, feed.name
        ))),
        Err(e) => Err(e.into()),
    }
}

/// `following`: list the names of the feeds the current user follows.
pub async fn following(state: &mut State, user: User, _cmd: Command) -> Result<(), CommandError> {
    for name in state.db.follows_for_user(user.id).await? {
        println!("* {name}");
    }
    Ok(())
}

/// `unfollow <url>`: drop the subscription. Unfollowing a feed the user
/// never followed is a silent no-op.
pub async fn unfollow(state: &mut State, user: User, cmd: Command) -> Result<(), CommandError> {
    let url = cmd
        .args
        .first()
        .ok_or_else(|| CommandError::Usage("unfollow <url>".to_string()))?;

    let feed = resolve_feed(state, url).await?;
    state.db.delete_follow(user.id, feed.id).await?;
    println!("Unfollowed {}", feed.name);
    Ok(())
}

/// `browse [limit]`: the most recent posts across followed feeds.
pub async fn browse(state: &mut State, user: User, cmd: Command) -> Result<(), CommandError> {
    let limit = match cmd.args.first() {
        None => DEFAULT_BROWSE_LIMIT,
        Some(arg) => arg
            .parse::<i64>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| CommandError::Usage("browse [limit]".to_string()))?,
    };

    let posts = state.db.posts_for_user(user.id, limit).await?;
    if posts.is_empty() {
        println!("No posts yet. Follow some feeds and run `creel agg`.");
        return Ok(());
    }

    for post in posts {
        match post.published_at.and_then(|ts| Utc.timestamp_opt(ts, 0).single()) {
            Some(published) => println!("{} ({})", post.title, published.format("%a, %d %b %Y")),
            None => println!("{} (undated)", post.title),
        }
        println!("  {}", post.url);
        if let Some(description) = &post.description {
            println!("  {description}");
        }
        println!("=====================================");
    }
    Ok(())
}

async fn resolve_feed(state: &State, url: &str) -> Result<Feed, CommandError> {
    state.db.get_feed_by_url(url).await?.ok_or_else(|| {
        CommandError::NotFound(format!(
            "feed {url} is not registered; add it with `creel addfeed <name> {url}`"
        ))
    })
}
