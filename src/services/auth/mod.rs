//! Sign-in flows and bearer sessions.
//!
//! Both Google and Telegram end in the same place: a local [`User`] upserted by
//! its external identity and a JWT minted by [`JwtService`].
//!
//! [`User`]: crate::models::User

pub mod google;
mod jwt;
pub mod session;
pub mod telegram;

pub use jwt::{Claims, JwtService};
