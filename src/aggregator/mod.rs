//! The feed polling and ingestion engine.
//!
//! One cooperative loop: each tick selects the feed with the stalest
//! `last_fetched_at`, fetches it, and persists new items exactly once.
//! Idempotency comes entirely from the post URL uniqueness constraint in
//! the store; the engine holds no state across cycles.

mod ingest;
mod scheduler;

pub use ingest::{ingest, PUB_DATE_FORMAT};
pub use scheduler::{run, run_cycle, FETCH_TIMEOUT};
