pub mod auth;
pub mod balance;
pub mod build;
pub mod chat;
pub mod comment;
pub mod rating;
pub mod user;
