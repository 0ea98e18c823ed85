use crate::helpers::JsonResponse;
use crate::middleware::guard::AdminUser;
use crate::services::ScraperJob;
use actix_web::{get, post, web, Responder, Result};

#[tracing::instrument(name = "Start catalog scraper.", skip_all)]
#[post("/start")]
pub async fn start_handler(admin: AdminUser, job: web::Data<ScraperJob>) -> Result<impl Responder> {
    let status = job.start().await?;

    tracing::info!("Scraper started by {}", admin.id);
    Ok(JsonResponse::build().set_item(status).accepted("Scraper started"))
}

#[tracing::instrument(name = "Stop catalog scraper.", skip_all)]
#[post("/stop")]
pub async fn stop_handler(admin: AdminUser, job: web::Data<ScraperJob>) -> Result<impl Responder> {
    let status = job.stop().await?;

    tracing::info!("Scraper stop requested by {}", admin.id);
    Ok(JsonResponse::build().set_item(status).ok("Stop requested"))
}

#[tracing::instrument(name = "Catalog scraper status.", skip_all)]
#[get("/status")]
pub async fn status_handler(_admin: AdminUser, job: web::Data<ScraperJob>) -> Result<impl Responder> {
    let status = job.status().await?;

    Ok(JsonResponse::build().set_item(status).ok("OK"))
}
