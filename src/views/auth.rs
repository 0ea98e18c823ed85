use crate::models;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

#[derive(Debug, Serialize)]
pub struct Session {
    #[serde(flatten)]
    pub token: AccessToken,
    pub user: models::User,
}

#[derive(Debug, Serialize)]
pub struct GoogleLogin {
    pub authorize_url: String,
    pub state: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TelegramInit {
    pub token: String,
    pub bot_url: String,
    pub expires_in: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TelegramCheck {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<AccessToken>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i32>,
}
