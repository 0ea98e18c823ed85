use crate::models::ChatStatus;
use serde::{Deserialize, Serialize};
use serde_valid::Validate;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct NewChat {
    #[validate(min_length = 1)]
    #[validate(max_length = 255)]
    pub subject: String,
    #[validate(min_length = 1)]
    #[validate(max_length = 4000)]
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct NewMessage {
    #[validate(min_length = 1)]
    #[validate(max_length = 4000)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangeStatus {
    pub status: ChatStatus,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChatFilter {
    pub status: Option<ChatStatus>,
}
