pub mod authentication;
pub mod guard;
