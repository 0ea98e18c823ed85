#![allow(dead_code)]

use pcbuilds::configuration::{get_configuration, DatabaseSettings, Settings};
use pcbuilds::helpers::{Cache, MemoryCache};
use pcbuilds::models::{Component, ComponentCategory, Role, User};
use pcbuilds::services::{JwtService, Notifier};
use pcbuilds::startup::{self, Connectors};
use rust_decimal::Decimal;
use sqlx::{Connection, Executor, PgConnection, PgPool};
use std::sync::Arc;

pub const JWT_SECRET: &str = "integration-test-secret";
pub const BOT_SECRET: &str = "integration-bot-secret";

pub struct TestApp {
    pub address: String,
    pub db_pool: PgPool,
    pub settings: Settings,
    pub cache: Arc<dyn Cache>,
    pub client: reqwest::Client,
}

pub fn test_configuration() -> Settings {
    std::env::set_var("JWT_SECRET", JWT_SECRET);
    std::env::set_var("TELEGRAM_BOT_SECRET", BOT_SECRET);
    get_configuration().expect("Failed to get configuration")
}

/// Spawns the API on a random port against a fresh database. `None` when
/// PostgreSQL is unreachable, so suites skip instead of failing.
pub async fn spawn_app_with_configuration(mut configuration: Settings) -> Option<TestApp> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);
    configuration.database.database_name = uuid::Uuid::new_v4().to_string();

    let connection_pool = match configure_database(&configuration.database).await {
        Ok(pool) => pool,
        Err(err) => {
            eprintln!("Skipping tests: failed to connect to postgres: {}", err);
            return None;
        }
    };

    let cache: Arc<dyn Cache> = Arc::new(MemoryCache::new());
    let connectors = Connectors::from_settings(&configuration).expect("Failed to build connectors");
    let server = startup::run(
        listener,
        connection_pool.clone(),
        configuration.clone(),
        cache.clone(),
        connectors,
        Notifier::disabled(),
    )
    .await
    .expect("Failed to bind address.");

    let _ = tokio::spawn(server);

    Some(TestApp {
        address,
        db_pool: connection_pool,
        settings: configuration,
        cache,
        client: reqwest::Client::new(),
    })
}

pub async fn spawn_app() -> Option<TestApp> {
    spawn_app_with_configuration(test_configuration()).await
}

pub async fn configure_database(config: &DatabaseSettings) -> Result<PgPool, sqlx::Error> {
    let mut connection = PgConnection::connect(&config.connection_string_without_db()).await?;

    connection
        .execute(format!(r#"CREATE DATABASE "{}""#, config.database_name).as_str())
        .await?;

    let connection_pool = PgPool::connect(&config.connection_string()).await?;

    sqlx::migrate!("./migrations").run(&connection_pool).await?;

    Ok(connection_pool)
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Inserts a user with the given role and returns it with a bearer token.
    pub async fn create_user(&self, name: &str, role: Role) -> (User, String) {
        let user = User {
            name: name.to_string(),
            email: Some(format!("{}@example.com", name.to_lowercase())),
            role,
            is_active: true,
            ..Default::default()
        };
        let user = pcbuilds::db::user::insert(&self.db_pool, &user)
            .await
            .expect("Failed to insert user");
        let token = JwtService::new(&self.settings.auth)
            .issue(&user)
            .expect("Failed to issue token");

        (user, token.access_token)
    }

    pub async fn create_component(&self, category: ComponentCategory, price: i64) -> Component {
        sqlx::query_as::<_, Component>(
            r#"
            INSERT INTO components (name, link, price, image, category)
            VALUES ($1, $2, $3, NULL, $4)
            RETURNING *
            "#,
        )
        .bind(format!("{} part", category.as_str()))
        .bind(format!("https://shop.example/{}", uuid::Uuid::new_v4()))
        .bind(Decimal::from(price))
        .bind(category)
        .fetch_one(&self.db_pool)
        .await
        .expect("Failed to insert component")
    }

    /// One component for every mandatory category plus an SSD.
    pub async fn complete_component_set(&self) -> Vec<i32> {
        let mut ids = Vec::new();
        for category in [
            ComponentCategory::Cpu,
            ComponentCategory::Gpu,
            ComponentCategory::Motherboard,
            ComponentCategory::Ram,
            ComponentCategory::Psu,
            ComponentCategory::Case,
            ComponentCategory::Cooler,
            ComponentCategory::Ssd,
        ] {
            ids.push(self.create_component(category, 100).await.id);
        }
        ids
    }

    pub async fn create_build(&self, token: &str, title: &str) -> i32 {
        let component_ids = self.complete_component_set().await;
        let response = self
            .client
            .post(self.url("/builds"))
            .bearer_auth(token)
            .json(&serde_json::json!({
                "title": title,
                "description": "test rig",
                "component_ids": component_ids,
            }))
            .send()
            .await
            .expect("Failed to execute request.");
        assert_eq!(201, response.status().as_u16());

        let body: serde_json::Value = response.json().await.unwrap();
        body["id"].as_i64().unwrap() as i32
    }
}
