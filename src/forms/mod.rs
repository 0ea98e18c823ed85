pub mod auth;
pub mod balance;
pub mod build;
pub mod chat;
pub mod component;
pub mod feedback;
mod pagination;
pub mod rating;
pub mod user;

pub use auth::*;
pub use balance::*;
pub use build::*;
pub use chat::*;
pub use component::*;
pub use feedback::*;
pub use pagination::Pagination;
pub use rating::*;
pub use user::*;
