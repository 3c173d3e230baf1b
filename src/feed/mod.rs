mod fetcher;
mod parser;

pub use fetcher::{fetch_feed, FetchError, USER_AGENT};
pub use parser::{parse_rss, RssChannel, RssDocument, RssItem};
