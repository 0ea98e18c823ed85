mod balance;
mod build;
mod chat;
mod component;
mod feedback;
pub mod rating;
pub mod user;

pub use balance::*;
pub use build::*;
pub use chat::*;
pub use component::*;
pub use feedback::*;
pub use rating::*;
pub use user::*;
