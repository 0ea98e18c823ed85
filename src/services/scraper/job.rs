use super::parser;
use super::status::{ScraperStatus, LOCK_KEY, STATUS_KEY, STOP_KEY};
use crate::configuration::{ScraperCategory, ScraperSettings};
use crate::connectors::ShopFetcher;
use crate::db;
use crate::helpers::Cache;
use crate::services::ServiceError;
use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

#[derive(Clone)]
pub struct ScraperJob {
    pool: PgPool,
    cache: Arc<dyn Cache>,
    fetcher: Arc<dyn ShopFetcher>,
    settings: ScraperSettings,
}

impl ScraperJob {
    pub fn new(
        pool: PgPool,
        cache: Arc<dyn Cache>,
        fetcher: Arc<dyn ShopFetcher>,
        settings: ScraperSettings,
    ) -> Self {
        Self {
            pool,
            cache,
            fetcher,
            settings,
        }
    }

    fn lock_ttl(&self) -> Duration {
        Duration::from_secs(self.settings.stale_after_secs.max(1))
    }

    async fn load(&self) -> Result<ScraperStatus, ServiceError> {
        Ok(self
            .cache
            .get_json::<ScraperStatus>(STATUS_KEY)
            .await?
            .unwrap_or_default())
    }

    async fn save(&self, status: &ScraperStatus) -> Result<(), ServiceError> {
        Ok(self.cache.set_json(STATUS_KEY, status, None).await?)
    }

    /// Current status. A crashed run is marked stopped on the way out.
    pub async fn status(&self) -> Result<ScraperStatus, ServiceError> {
        let mut status = self.load().await?;
        if status.is_stale(Utc::now(), self.settings.stale_after_secs) {
            tracing::warn!("Scraper status is stale, marking the job stopped");
            status.mark_stale(Utc::now());
            self.save(&status).await?;
            self.cache.delete(LOCK_KEY).await?;
        }
        if status.is_running && self.cache.get(STOP_KEY).await?.is_some() {
            status.stop_requested = true;
        }
        Ok(status)
    }

    /// Claims the job: the running flag and the set-if-absent lock must both agree.
    async fn acquire(&self) -> Result<ScraperStatus, ServiceError> {
        parser::validate_selectors(&self.settings.selectors).map_err(ServiceError::Internal)?;

        let current = self.status().await?;
        if current.is_running {
            return Err(ServiceError::Conflict("Scraper is already running".to_string()));
        }

        let locked = self
            .cache
            .set_if_absent(LOCK_KEY, Utc::now().to_rfc3339(), Some(self.lock_ttl()))
            .await?;
        if !locked {
            return Err(ServiceError::Conflict("Scraper is already running".to_string()));
        }

        // a stop aimed at the previous run must not end this one
        self.cache.delete(STOP_KEY).await?;
        let status = ScraperStatus::started(self.settings.categories.len() as u32, Utc::now());
        self.save(&status).await?;
        Ok(status)
    }

    /// Starts a run in the background and returns its initial status.
    pub async fn start(&self) -> Result<ScraperStatus, ServiceError> {
        let status = self.acquire().await?;
        let job = self.clone();
        let initial = status.clone();
        tokio::spawn(async move {
            job.run(initial).await;
        });
        tracing::info!("Scraper started");
        Ok(status)
    }

    /// Runs in the foreground until every category is processed or a stop arrives.
    pub async fn run_to_completion(&self) -> Result<ScraperStatus, ServiceError> {
        let status = self.acquire().await?;
        Ok(self.run(status).await)
    }

    /// Only the running job writes the status record; a stop is a separate flag.
    pub async fn stop(&self) -> Result<ScraperStatus, ServiceError> {
        let mut status = self.status().await?;
        if !status.is_running {
            return Err(ServiceError::Conflict("Scraper is not running".to_string()));
        }
        self.cache
            .set(STOP_KEY, Utc::now().to_rfc3339(), Some(self.lock_ttl()))
            .await?;
        status.stop_requested = true;
        tracing::info!("Scraper stop requested");
        Ok(status)
    }

    /// Picks up a pending stop request, saves progress and refreshes the lock.
    async fn checkpoint(&self, status: &mut ScraperStatus) -> bool {
        match self.cache.delete(STOP_KEY).await {
            Ok(true) => status.stop_requested = true,
            Ok(false) => {}
            Err(err) => tracing::error!("Failed to read scraper stop flag: {}", err),
        }
        status.updated_at = Some(Utc::now());

        if let Err(err) = self.save(status).await {
            tracing::error!("Failed to save scraper status: {}", err);
        }
        if let Err(err) = self
            .cache
            .set(LOCK_KEY, Utc::now().to_rfc3339(), Some(self.lock_ttl()))
            .await
        {
            tracing::error!("Failed to refresh scraper lock: {}", err);
        }

        status.stop_requested
    }

    async fn run(&self, mut status: ScraperStatus) -> ScraperStatus {
        let timeout = Duration::from_secs(self.settings.category_timeout_secs);

        for entry in &self.settings.categories {
            if self.checkpoint(&mut status).await {
                tracing::info!("Scraper stopped on request");
                break;
            }

            status.current_category = Some(entry.category);
            let span = tracing::info_span!("Scraping category", category = %entry.category);
            let scraped = tokio::time::timeout(timeout, self.scrape_category(entry, &mut status))
                .instrument(span)
                .await;
            if scraped.is_err() {
                let message = format!(
                    "{}: timed out after {}s",
                    entry.category, self.settings.category_timeout_secs
                );
                tracing::warn!("{}", message);
                status.push_error(message);
            }
            status.category_done(Utc::now());
        }

        status.finish(Utc::now());
        if let Err(err) = self.save(&status).await {
            tracing::error!("Failed to save final scraper status: {}", err);
        }
        if let Err(err) = self.cache.delete(LOCK_KEY).await {
            tracing::error!("Failed to release scraper lock: {}", err);
        }

        tracing::info!(
            "Scraper finished: {}/{} categories, {} found, {} saved, {} errors",
            status.processed_categories,
            status.total_categories,
            status.components_found,
            status.components_saved,
            status.errors.len()
        );
        status
    }

    fn page_url(&self, path: &str, page: u32) -> String {
        let base = self.settings.base_url.trim_end_matches('/');
        let separator = if path.contains('?') { '&' } else { '?' };
        format!("{base}{path}{separator}{}={page}", self.settings.page_param)
    }

    async fn scrape_category(&self, entry: &ScraperCategory, status: &mut ScraperStatus) {
        let delay = Duration::from_millis(self.settings.request_delay_ms);

        for page in 1..=self.settings.max_pages {
            let url = self.page_url(&entry.path, page);
            let html = match self.fetcher.fetch_page(&url).await {
                Ok(html) => html,
                Err(err) => {
                    status.push_error(format!("{}: {} failed: {}", entry.category, url, err));
                    break;
                }
            };

            let parsed = match parser::parse_page(
                &html,
                &self.settings.base_url,
                entry.category,
                &self.settings.selectors,
            ) {
                Ok(parsed) => parsed,
                Err(err) => {
                    status.push_error(err);
                    break;
                }
            };

            if parsed.tiles == 0 {
                break;
            }

            for reason in parsed.skipped {
                status.push_error(reason);
            }
            status.components_found += parsed.components.len() as u64;

            for component in &parsed.components {
                match db::component::upsert_scraped(&self.pool, component).await {
                    Ok(_) => status.components_saved += 1,
                    Err(err) => {
                        tracing::error!("Failed to save {}: {:?}", component.link, err);
                        status.push_error(format!("{}: failed to save {}", entry.category, component.link));
                    }
                }
            }

            self.checkpoint(status).await;

            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::{ScraperCategory, ScraperSelectors};
    use crate::connectors::ConnectorError;
    use crate::helpers::MemoryCache;
    use crate::models::ComponentCategory;
    use async_trait::async_trait;

    struct EmptyShop;

    #[async_trait]
    impl ShopFetcher for EmptyShop {
        async fn fetch_page(&self, _url: &str) -> Result<String, ConnectorError> {
            Ok("<html><body></body></html>".to_string())
        }
    }

    struct SlowShop;

    #[async_trait]
    impl ShopFetcher for SlowShop {
        async fn fetch_page(&self, _url: &str) -> Result<String, ConnectorError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(String::new())
        }
    }

    fn settings(categories: &[ComponentCategory]) -> ScraperSettings {
        ScraperSettings {
            base_url: "https://shop.example".to_string(),
            page_param: "page".to_string(),
            max_pages: 3,
            category_timeout_secs: 1,
            stale_after_secs: 900,
            request_delay_ms: 0,
            user_agent: "test".to_string(),
            categories: categories
                .iter()
                .map(|category| ScraperCategory {
                    category: *category,
                    path: format!("/catalog/{}", category.as_str().to_lowercase()),
                })
                .collect(),
            selectors: ScraperSelectors::default(),
        }
    }

    fn job(fetcher: Arc<dyn ShopFetcher>, categories: &[ComponentCategory]) -> (ScraperJob, Arc<dyn Cache>) {
        let cache: Arc<dyn Cache> = Arc::new(MemoryCache::new());
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        (
            ScraperJob::new(pool, cache.clone(), fetcher, settings(categories)),
            cache,
        )
    }

    #[tokio::test]
    async fn page_urls_carry_the_page_param() {
        let (job, _) = job(Arc::new(EmptyShop), &[ComponentCategory::Cpu]);
        assert_eq!(
            job.page_url("/catalog/cpu", 2),
            "https://shop.example/catalog/cpu?page=2"
        );
        assert_eq!(
            job.page_url("/catalog?type=cpu", 1),
            "https://shop.example/catalog?type=cpu&page=1"
        );
    }

    #[tokio::test]
    async fn run_walks_every_category() {
        let (job, cache) = job(
            Arc::new(EmptyShop),
            &[ComponentCategory::Cpu, ComponentCategory::Gpu],
        );

        let status = job.run_to_completion().await.unwrap();
        assert!(!status.is_running);
        assert_eq!(status.processed_categories, 2);
        assert_eq!(status.total_categories, 2);
        assert!(cache.get(LOCK_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn second_start_conflicts() {
        let (job, _) = job(Arc::new(SlowShop), &[ComponentCategory::Cpu]);

        job.acquire().await.unwrap();
        assert!(matches!(job.start().await, Err(ServiceError::Conflict(_))));
    }

    #[tokio::test]
    async fn lock_alone_blocks_a_start() {
        let (job, cache) = job(Arc::new(EmptyShop), &[ComponentCategory::Cpu]);
        cache
            .set(LOCK_KEY, "someone".to_string(), None)
            .await
            .unwrap();
        assert!(matches!(job.start().await, Err(ServiceError::Conflict(_))));
    }

    #[tokio::test]
    async fn stop_requires_a_running_job() {
        let (job, _) = job(Arc::new(EmptyShop), &[ComponentCategory::Cpu]);
        assert!(matches!(job.stop().await, Err(ServiceError::Conflict(_))));
    }

    #[tokio::test]
    async fn stop_request_resets_the_status() {
        let (job, _) = job(
            Arc::new(EmptyShop),
            &[ComponentCategory::Cpu, ComponentCategory::Gpu],
        );

        let initial = job.acquire().await.unwrap();
        job.stop().await.unwrap();
        let status = job.run(initial).await;

        assert!(!status.is_running);
        assert!(!status.stop_requested);
        assert_eq!(status.processed_categories, 0);
        assert!(!job.status().await.unwrap().is_running);
    }

    #[tokio::test]
    async fn stop_request_survives_a_progress_checkpoint() {
        let (job, cache) = job(Arc::new(EmptyShop), &[ComponentCategory::Cpu]);

        let mut status = job.acquire().await.unwrap();
        assert!(job.stop().await.unwrap().stop_requested);
        assert!(job.status().await.unwrap().stop_requested);

        assert!(job.checkpoint(&mut status).await);
        assert!(cache.get(STOP_KEY).await.unwrap().is_none());
        assert!(job.checkpoint(&mut status).await);
    }

    #[tokio::test]
    async fn late_stop_does_not_revive_a_finished_run() {
        let (job, cache) = job(Arc::new(EmptyShop), &[ComponentCategory::Cpu]);

        let initial = job.acquire().await.unwrap();
        job.run(initial).await;
        // a stop that read the running status just before the final save
        cache
            .set(STOP_KEY, Utc::now().to_rfc3339(), None)
            .await
            .unwrap();

        let status = job.status().await.unwrap();
        assert!(!status.is_running);
        assert!(!status.stop_requested);

        let next = job.run_to_completion().await.unwrap();
        assert_eq!(next.processed_categories, 1);
    }

    #[tokio::test]
    async fn stuck_category_times_out_and_the_run_continues() {
        let (job, _) = job(
            Arc::new(SlowShop),
            &[ComponentCategory::Cpu, ComponentCategory::Gpu],
        );

        let status = job.run_to_completion().await.unwrap();
        assert_eq!(status.processed_categories, 2);
        assert_eq!(status.errors.len(), 2);
        assert!(status.errors[0].contains("timed out"));
    }

    #[tokio::test]
    async fn stale_status_heals_on_read() {
        let (job, cache) = job(Arc::new(EmptyShop), &[ComponentCategory::Cpu]);
        let old = Utc::now() - chrono::Duration::seconds(3600);
        cache
            .set_json(STATUS_KEY, &ScraperStatus::started(1, old), None)
            .await
            .unwrap();
        cache.set(LOCK_KEY, "crashed".to_string(), None).await.unwrap();

        let status = job.status().await.unwrap();
        assert!(!status.is_running);
        assert_eq!(status.errors, vec!["job went stale".to_string()]);
        assert!(cache.get(LOCK_KEY).await.unwrap().is_none());
    }
}
