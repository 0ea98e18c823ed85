use crate::configuration::Settings;
use crate::connectors::{
    ConnectorError, GoogleAuthConnector, GoogleOAuthClient, PaymentGateway, ShopFetcher,
    ShopHttpClient, YookassaClient,
};
use crate::helpers::{Cache, JsonResponse, MqManager};
use crate::middleware;
use crate::routes;
use crate::services::{JwtService, Notifier, ScraperJob};
use actix_cors::Cors;
use actix_web::{dev::Server, error, middleware::Compress, web, App, HttpServer};
use sqlx::{Pool, Postgres};
use std::net::TcpListener;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

/// External integrations shared by the HTTP server and the background jobs.
#[derive(Clone)]
pub struct Connectors {
    pub google: Arc<dyn GoogleAuthConnector>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub shop: Arc<dyn ShopFetcher>,
}

impl Connectors {
    pub fn from_settings(settings: &Settings) -> Result<Self, ConnectorError> {
        Ok(Self {
            google: Arc::new(GoogleOAuthClient::new(&settings.google)?),
            gateway: Arc::new(YookassaClient::new(&settings.yookassa)?),
            shop: Arc::new(ShopHttpClient::new(&settings.scraper)?),
        })
    }
}

/// Email notifier publishing through a lazily connected RabbitMQ pool.
pub fn notifier(settings: &Settings) -> Result<Notifier, std::io::Error> {
    let mq_manager = MqManager::try_new(settings.amqp.connection_string())?;
    Ok(Notifier::new(Some(Arc::new(mq_manager)), settings.mail.clone()))
}

fn to_io_error(err: ConnectorError) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, err.to_string())
}

pub async fn run(
    listener: TcpListener,
    pg_pool: Pool<Postgres>,
    settings: Settings,
    cache: Arc<dyn Cache>,
    connectors: Connectors,
    notifier: Notifier,
) -> Result<Server, std::io::Error> {
    let scraper_job = ScraperJob::new(
        pg_pool.clone(),
        cache.clone(),
        connectors.shop.clone(),
        settings.scraper.clone(),
    );
    let scraper_job = web::Data::new(scraper_job);

    let jwt = web::Data::new(JwtService::new(&settings.auth));
    let notifier = web::Data::new(notifier);
    let cache = web::Data::new(cache);
    let google = web::Data::new(connectors.google);
    let gateway = web::Data::new(connectors.gateway);

    let settings = web::Data::new(settings);
    let pg_pool = web::Data::new(pg_pool);

    let json_config = web::JsonConfig::default().error_handler(|err, _req| {
        let msg = match &err {
            error::JsonPayloadError::Deserialize(err) => format!(
                "Invalid JSON at line {}, column {}: {}",
                err.line(),
                err.column(),
                err
            ),
            _ => err.to_string(),
        };
        JsonResponse::<()>::build().bad_request(msg)
    });
    let query_config = web::QueryConfig::default().error_handler(|err, _req| {
        JsonResponse::<()>::build().bad_request(err.to_string())
    });
    let path_config = web::PathConfig::default().error_handler(|err, _req| {
        JsonResponse::<()>::build().not_found(err.to_string())
    });

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(middleware::authentication::Manager::new())
            .wrap(Compress::default())
            .wrap(Cors::permissive())
            .service(web::scope("/health_check").service(routes::health_check))
            .service(
                web::scope("/auth")
                    .service(routes::auth::google_login_handler)
                    .service(routes::auth::google_callback_handler)
                    .service(routes::auth::telegram_init_handler)
                    .service(routes::auth::telegram_complete_handler)
                    .service(routes::auth::telegram_check_handler)
                    .service(routes::auth::me_handler),
            )
            .service(
                web::scope("/users")
                    .service(routes::user::update_me)
                    .service(routes::user::item),
            )
            .service(
                web::scope("/chat")
                    .service(routes::chat::add)
                    .service(routes::chat::list)
                    .service(routes::chat::item)
                    .service(routes::chat::add_message)
                    .service(routes::chat::close),
            )
            .service(
                web::scope("/feedback")
                    .service(routes::feedback::add)
                    .service(routes::feedback::my_item)
                    .service(routes::feedback::my_update)
                    .service(routes::feedback::my_delete),
            )
            .service(
                web::scope("/components")
                    .service(routes::component::list)
                    .service(routes::component::categories)
                    .service(routes::component::item),
            )
            .service(
                web::scope("/builds")
                    .service(routes::build::list)
                    .service(routes::build::my_list)
                    .service(routes::build::add)
                    .service(routes::build::item)
                    .service(routes::build::update)
                    .service(routes::build::delete)
                    .service(routes::build::rating_summary)
                    .service(routes::build::rating_add)
                    .service(routes::build::rating_update)
                    .service(routes::build::rating_delete)
                    .service(routes::build::comment_list)
                    .service(routes::build::comment_add)
                    .service(routes::build::comment_update)
                    .service(routes::build::comment_delete),
            )
            .service(
                web::scope("/balance")
                    .service(routes::balance::item)
                    .service(routes::balance::transactions)
                    .service(routes::balance::top_up)
                    .service(routes::balance::withdraw),
            )
            .service(web::scope("/payments").service(routes::balance::webhook))
            .service(
                web::scope("/admin")
                    .service(
                        web::scope("/users")
                            .service(routes::user::admin_list)
                            .service(routes::user::admin_change_role)
                            .service(routes::user::admin_change_active),
                    )
                    .service(
                        web::scope("/chat")
                            .service(routes::chat::admin_list)
                            .service(routes::chat::admin_set_status),
                    )
                    .service(
                        web::scope("/feedback")
                            .service(routes::feedback::admin_list)
                            .service(routes::feedback::admin_stats)
                            .service(routes::feedback::admin_item)
                            .service(routes::feedback::admin_update),
                    )
                    .service(
                        web::scope("/components")
                            .service(routes::component::admin_add)
                            .service(routes::component::admin_update)
                            .service(routes::component::admin_delete),
                    )
                    .service(
                        web::scope("/scraper")
                            .service(routes::scraper::start_handler)
                            .service(routes::scraper::stop_handler)
                            .service(routes::scraper::status_handler),
                    ),
            )
            .app_data(json_config.clone())
            .app_data(query_config.clone())
            .app_data(path_config.clone())
            .app_data(pg_pool.clone())
            .app_data(settings.clone())
            .app_data(cache.clone())
            .app_data(jwt.clone())
            .app_data(notifier.clone())
            .app_data(google.clone())
            .app_data(gateway.clone())
            .app_data(scraper_job.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}

/// Builds connectors and the notifier from settings, then starts the server.
pub async fn run_with_settings(
    listener: TcpListener,
    pg_pool: Pool<Postgres>,
    settings: Settings,
    cache: Arc<dyn Cache>,
) -> Result<Server, std::io::Error> {
    let connectors = Connectors::from_settings(&settings).map_err(to_io_error)?;
    let notifier = notifier(&settings)?;
    run(listener, pg_pool, settings, cache, connectors, notifier).await
}
