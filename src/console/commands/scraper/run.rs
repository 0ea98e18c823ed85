use crate::configuration::get_configuration;
use crate::connectors::ShopHttpClient;
use crate::helpers::cache;
use crate::services::ScraperJob;
use actix_web::rt;
use anyhow::Context;
use sqlx::PgPool;
use std::sync::Arc;

/// Runs the catalog scraper in the foreground, sharing the lock and status
/// record with the API.
pub struct RunCommand {}

impl RunCommand {
    pub fn new() -> Self {
        Self {}
    }
}

impl crate::console::commands::CallableTrait for RunCommand {
    fn call(&self) -> anyhow::Result<()> {
        rt::System::new().block_on(async {
            let settings = get_configuration().context("Failed to read configuration")?;
            let db_pool = PgPool::connect(&settings.database.connection_string())
                .await
                .context("Failed to connect to database")?;
            let cache = cache::connect(&settings.redis).await;
            let fetcher = ShopHttpClient::new(&settings.scraper)?;

            let job = ScraperJob::new(db_pool, cache, Arc::new(fetcher), settings.scraper);
            let status = job.run_to_completion().await?;

            println!("{}", serde_json::to_string_pretty(&status)?);
            Ok(())
        })
    }
}
