use crate::models;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct TopUp {
    pub transaction: models::Transaction,
    pub confirmation_url: Option<String>,
}
