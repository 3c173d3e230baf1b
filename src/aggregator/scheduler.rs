use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::aggregator::ingest::ingest;
use crate::feed::fetch_feed;
use crate::storage::Database;

/// Budget for one feed fetch, body included.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Drive Selector -> Fetcher -> Ingestor on a fixed cadence until shutdown.
///
/// The first cycle fires immediately; exactly one cycle is ever in flight,
/// and a cycle that overruns the interval delays the next tick rather than
/// overlapping it. The shutdown receiver is raced against both the tick
/// wait and the in-flight cycle, so fetch and store awaits are
/// interruptible.
///
/// No cycle failure is fatal: selection misses, fetch errors, and store
/// errors are logged and the loop proceeds to the next tick.
pub async fn run(
    db: Database,
    client: reqwest::Client,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            _ = ticker.tick() => {}
        }

        tokio::select! {
            _ = shutdown.changed() => break,
            _ = run_cycle(&db, &client) => {}
        }
    }

    tracing::info!("Scheduler stopped");
}

/// One polling cycle over exactly one feed.
pub async fn run_cycle(db: &Database, client: &reqwest::Client) {
    let feed = match db.next_feed_to_fetch().await {
        Ok(Some(feed)) => feed,
        Ok(None) => {
            tracing::info!("No feeds to fetch, skipping cycle");
            return;
        }
        Err(e) => {
            tracing::warn!(error = %e, "Feed selection failed, skipping cycle");
            return;
        }
    };

    tracing::info!(feed = %feed.name, url = %feed.url, "Fetching feed");
    let doc = match fetch_feed(client, &feed.url, FETCH_TIMEOUT).await {
        Ok(doc) => doc,
        Err(e) => {
            tracing::warn!(feed = %feed.name, url = %feed.url, error = %e, "Fetch failed, abandoning cycle");
            return;
        }
    };

    match ingest(db, &feed, &doc).await {
        Ok(count) => {
            tracing::info!(feed = %feed.name, new_posts = count, "Cycle complete");
            if count > 0 {
                println!("{}: {} new posts", feed.name, count);
            }
        }
        Err(e) => {
            tracing::warn!(feed = %feed.name, error = %e, "Ingestion failed, abandoning cycle");
        }
    }
}
