use std::time::Duration;

use thiserror::Error;

use super::parser::{parse_rss, RssDocument};

/// Fixed client identifier sent with every fetch.
pub const USER_AGENT: &str = concat!("creel/", env!("CARGO_PKG_VERSION"));

/// Errors that can occur while fetching and parsing one feed.
///
/// The engine treats any of these as "this cycle's fetch failed": ingestion
/// for the feed is abandoned and the scheduler moves on to the next tick.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request exceeded the caller-supplied timeout budget
    #[error("Request timed out")]
    Timeout,
    /// Document could not be parsed as RSS
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Fetch and parse one feed document.
///
/// Issues a single GET identified by [`USER_AGENT`]. The `timeout` budget
/// covers the whole exchange, response body included. Requires a success
/// status and a well-formed document; all failure modes collapse into
/// [`FetchError`] for the caller.
pub async fn fetch_feed(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
) -> Result<RssDocument, FetchError> {
    let body = tokio::time::timeout(timeout, async {
        let response = client
            .get(url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await
            .map_err(FetchError::Network)?;

        if !response.status().is_success() {
            return Err(FetchError::HttpStatus(response.status().as_u16()));
        }

        response.bytes().await.map_err(FetchError::Network)
    })
    .await
    .map_err(|_| FetchError::Timeout)??;

    parse_rss(&body).map_err(|e| FetchError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const VALID_RSS: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
    <title>Test Feed</title>
    <link>https://example.com</link>
    <description>Testing</description>
    <item>
        <title>First &amp; only</title>
        <link>https://example.com/1</link>
        <description>Hello</description>
        <pubDate>Tue, 10 Nov 2020 23:00:00 +0000</pubDate>
    </item>
</channel></rss>"#;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_fetch_success() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(VALID_RSS)
                    .insert_header("Content-Type", "application/rss+xml"),
            )
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::new();
        let doc = fetch_feed(&client, &format!("{}/feed", mock_server.uri()), TIMEOUT)
            .await
            .unwrap();
        assert_eq!(doc.channel.title, "Test Feed");
        assert_eq!(doc.channel.items.len(), 1);
        assert_eq!(doc.channel.items[0].title, "First & only");
    }

    #[tokio::test]
    async fn test_fetch_sends_user_agent() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("user-agent", USER_AGENT))
            .respond_with(ResponseTemplate::new(200).set_body_string(VALID_RSS))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::new();
        fetch_feed(&client, &format!("{}/feed", mock_server.uri()), TIMEOUT)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_fetch_non_success_status() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::new();
        let err = fetch_feed(&client, &format!("{}/feed", mock_server.uri()), TIMEOUT)
            .await
            .unwrap_err();
        match err {
            FetchError::HttpStatus(404) => {}
            e => panic!("Expected HttpStatus(404), got {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_fetch_malformed_document() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<not valid xml"))
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::new();
        let err = fetch_feed(&client, &format!("{}/feed", mock_server.uri()), TIMEOUT)
            .await
            .unwrap_err();
        match err {
            FetchError::Parse(_) => {}
            e => panic!("Expected Parse error, got {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(VALID_RSS)
                    .set_delay(Duration::from_secs(10)),
            )
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::new();
        let err = fetch_feed(
            &client,
            &format!("{}/feed", mock_server.uri()),
            Duration::from_millis(100),
        )
        .await
        .unwrap_err();
        match err {
            FetchError::Timeout => {}
            e => panic!("Expected Timeout, got {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_fetch_connection_error() {
        // Nothing listening on this port
        let client = reqwest::Client::new();
        let err = fetch_feed(&client, "http://127.0.0.1:1/feed", TIMEOUT)
            .await
            .unwrap_err();
        match err {
            FetchError::Network(_) => {}
            e => panic!("Expected Network error, got {:?}", e),
        }
    }
}
