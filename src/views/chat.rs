use crate::models;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ChatDetail {
    #[serde(flatten)]
    pub chat: models::Chat,
    pub messages: Vec<models::Message>,
}
