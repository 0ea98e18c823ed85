use crate::models::ComponentCategory;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const STATUS_KEY: &str = "scraper:status";
pub const LOCK_KEY: &str = "scraper:lock";
/// Set by a stop request, consumed by the running job.
pub const STOP_KEY: &str = "scraper:stop";
const MAX_ERRORS: usize = 50;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScraperStatus {
    pub is_running: bool,
    pub stop_requested: bool,
    pub current_category: Option<ComponentCategory>,
    pub processed_categories: u32,
    pub total_categories: u32,
    pub components_found: u64,
    pub components_saved: u64,
    pub errors: Vec<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl ScraperStatus {
    pub fn started(total_categories: u32, now: DateTime<Utc>) -> Self {
        Self {
            is_running: true,
            total_categories,
            started_at: Some(now),
            updated_at: Some(now),
            ..Default::default()
        }
    }

    /// Keeps only the most recent messages.
    pub fn push_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
        if self.errors.len() > MAX_ERRORS {
            let overflow = self.errors.len() - MAX_ERRORS;
            self.errors.drain(..overflow);
        }
    }

    pub fn category_done(&mut self, now: DateTime<Utc>) {
        self.processed_categories = (self.processed_categories + 1).min(self.total_categories);
        self.current_category = None;
        self.updated_at = Some(now);
    }

    pub fn finish(&mut self, now: DateTime<Utc>) {
        self.is_running = false;
        self.stop_requested = false;
        self.current_category = None;
        self.updated_at = Some(now);
        self.finished_at = Some(now);
    }

    /// A running job that stopped reporting progress has crashed.
    pub fn is_stale(&self, now: DateTime<Utc>, stale_after_secs: u64) -> bool {
        if !self.is_running {
            return false;
        }
        match self.updated_at.or(self.started_at) {
            Some(at) => (now - at).num_seconds() > stale_after_secs as i64,
            None => true,
        }
    }

    pub fn mark_stale(&mut self, now: DateTime<Utc>) {
        self.push_error("job went stale");
        self.finish(now);
    }
}
