pub mod configuration;
pub mod connectors;
pub mod console;
pub mod db;
pub mod forms;
pub mod helpers;
pub mod jobs;
mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod startup;
pub mod telemetry;
pub mod views;

pub use middleware::authentication::sign_body;
