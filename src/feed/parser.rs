//! Strict RSS 2.0 deserialization.
//!
//! The engine consumes a fixed document shape: a channel with
//! title/link/description and an ordered item sequence where each item
//! carries title/link/description and a `pubDate` string. The date is kept
//! as raw text here; the Ingestor owns parsing it against the fixed
//! RFC 1123 format. Unknown elements are ignored.

use html_escape::decode_html_entities;
use serde::Deserialize;

/// A fetched feed document, entity-unescaped and ready for ingestion.
#[derive(Debug, Clone, Deserialize)]
pub struct RssDocument {
    pub channel: RssChannel,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RssChannel {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "item")]
    pub items: Vec<RssItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RssItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Raw publication date text, expected in RFC 1123 with numeric zone
    /// (e.g. `Mon, 02 Jan 2006 15:04:05 -0700`). Empty when absent.
    #[serde(default, rename = "pubDate")]
    pub pub_date: String,
}

/// Parse a feed document, unescaping HTML entities in all text fields.
pub fn parse_rss(body: &[u8]) -> Result<RssDocument, quick_xml::DeError> {
    let mut doc: RssDocument = quick_xml::de::from_reader(body)?;

    doc.channel.title = unescape(&doc.channel.title);
    doc.channel.description = unescape(&doc.channel.description);
    for item in &mut doc.channel.items {
        item.title = unescape(&item.title);
        item.description = item.description.as_deref().map(unescape);
    }

    Ok(doc)
}

fn unescape(text: &str) -> String {
    decode_html_entities(text).into_owned()
}
