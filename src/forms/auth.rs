use serde::{Deserialize, Serialize};
use serde_valid::Validate;

#[derive(Debug, Deserialize)]
pub struct GoogleCallback {
    pub code: String,
    pub state: String,
}

/// Sent by the Telegram bot once a user pressed "Start" with a handshake token.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TelegramComplete {
    #[validate(min_length = 16)]
    #[validate(max_length = 64)]
    pub token: String,
    pub telegram_id: i64,
    #[validate(max_length = 255)]
    pub username: Option<String>,
    #[validate(max_length = 255)]
    pub first_name: Option<String>,
    #[validate(max_length = 255)]
    pub last_name: Option<String>,
}

impl TelegramComplete {
    pub fn display_name(&self) -> String {
        let full = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if !full.is_empty() {
            return full;
        }

        self.username
            .clone()
            .unwrap_or_else(|| format!("tg{}", self.telegram_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> TelegramComplete {
        TelegramComplete {
            token: "a".repeat(32),
            telegram_id: 42,
            username: None,
            first_name: None,
            last_name: None,
        }
    }

    #[test]
    fn display_name_prefers_full_name() {
        let mut form = form();
        form.first_name = Some("Ada".to_string());
        form.last_name = Some("Lovelace".to_string());
        form.username = Some("ada".to_string());
        assert_eq!(form.display_name(), "Ada Lovelace");
    }

    #[test]
    fn display_name_falls_back_to_username_then_id() {
        let mut form = form();
        assert_eq!(form.display_name(), "tg42");
        form.username = Some("ada".to_string());
        assert_eq!(form.display_name(), "ada");
    }

    #[test]
    fn short_tokens_are_rejected() {
        let mut form = form();
        form.token = "short".to_string();
        assert!(form.validate().is_err());
    }
}
