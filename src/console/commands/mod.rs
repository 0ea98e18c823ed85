mod callable;
pub mod mq;
pub mod scraper;
pub mod user;

pub use callable::*;
