mod f_hmac;
mod f_jwt;

pub use f_hmac::{sign_body, try_bot, BotCaller};
pub use f_jwt::try_jwt;
