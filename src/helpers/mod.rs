pub mod cache;
pub(crate) mod json;
pub mod mq_manager;
pub mod token;

pub use cache::{Cache, MemoryCache, RedisCache};
pub use json::*;
pub use mq_manager::MqManager;
pub use token::make_token;
