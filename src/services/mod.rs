pub mod auth;
pub mod balance;
pub mod builds;
pub mod chats;
pub mod comments;
pub mod components;
mod error;
pub mod feedback;
mod notifier;
pub mod ratings;
pub mod scraper;
pub mod users;

pub use auth::JwtService;
pub use error::ServiceError;
pub use notifier::{EmailMessage, Notifier};
pub use scraper::{ScraperJob, ScraperStatus};
