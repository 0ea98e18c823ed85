//! Catalog refresh from the partner shop.
//!
//! A single job at a time walks the configured categories, fetches listing
//! pages through a [`ShopFetcher`](crate::connectors::ShopFetcher), parses the
//! product tiles and upserts them by link. Progress lives in the cache so every
//! process sees the same status.

mod job;
pub mod parser;
mod status;

pub use job::ScraperJob;
pub use status::{ScraperStatus, STATUS_KEY};
