mod admin;
mod get;

pub use admin::*;
pub use get::*;
