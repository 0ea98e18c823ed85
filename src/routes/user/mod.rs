mod admin;
mod get;
mod update;

pub use admin::*;
pub use get::*;
pub use update::*;
