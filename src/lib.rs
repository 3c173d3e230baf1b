//! creel: a multi-user RSS aggregator.
//!
//! Users register, add and follow feeds, and browse ingested posts. The
//! `agg` command runs the polling engine: a single cooperative loop that
//! repeatedly picks the stalest feed, fetches and parses it, and persists
//! new items exactly once, deduplicated by post URL.

pub mod aggregator;
pub mod commands;
pub mod config;
pub mod feed;
pub mod storage;
