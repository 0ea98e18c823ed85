use pcbuilds::configuration::get_configuration;
use pcbuilds::helpers::cache;
use pcbuilds::jobs;
use pcbuilds::startup::{self, run, Connectors};
use pcbuilds::telemetry::{get_subscriber, init_subscriber};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use std::net::TcpListener;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let subscriber = get_subscriber("pcbuilds".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    let settings = get_configuration().expect("Failed to read configuration.");

    tracing::info!(
        db_host = %settings.database.host,
        db_port = settings.database.port,
        db_name = %settings.database.database_name,
        "Connecting to PostgreSQL"
    );

    let connect_options = PgConnectOptions::new()
        .host(&settings.database.host)
        .port(settings.database.port)
        .username(&settings.database.username)
        .password(&settings.database.password)
        .database(&settings.database.database_name)
        .ssl_mode(PgSslMode::Disable);

    let pg_pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(30))
        .connect_with(connect_options)
        .await
        .expect("Failed to connect to database.");

    let cache = cache::connect(&settings.redis).await;
    let connectors = Connectors::from_settings(&settings)
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err.to_string()))?;
    let notifier = startup::notifier(&settings)?;

    let shutdown = CancellationToken::new();
    let loops = jobs::spawn_all(
        &settings,
        pg_pool.clone(),
        cache.clone(),
        connectors.gateway.clone(),
        notifier.clone(),
        shutdown.clone(),
    );

    let address = format!("{}:{}", settings.app_host, settings.app_port);
    tracing::info!("Start server at {:?}", &address);
    let listener =
        TcpListener::bind(&address).unwrap_or_else(|_| panic!("failed to bind to {}", address));

    let result = run(listener, pg_pool, settings, cache, connectors, notifier)
        .await?
        .await;

    shutdown.cancel();
    for handle in loops {
        if let Err(err) = handle.await {
            tracing::warn!("Background loop ended abnormally: {}", err);
        }
    }

    result
}
