mod admin;
mod user;

pub use admin::*;
pub use user::*;
