//! Companion Telegram bot. Long-polls the Bot API, answers `/start {token}`
//! by completing the login handshake against the API, and reports the outcome
//! back to the chat.

use anyhow::{bail, Context};
use pcbuilds::configuration::{get_configuration, TelegramSettings};
use pcbuilds::forms::TelegramComplete;
use pcbuilds::telemetry::{get_subscriber, init_subscriber};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    message: Option<IncomingMessage>,
}

#[derive(Debug, Deserialize)]
struct IncomingMessage {
    chat: Chat,
    from: Option<Sender>,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct Sender {
    id: i64,
    username: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
}

/// Handshake token carried by a `/start {token}` deep link.
fn start_token(text: &str) -> Option<&str> {
    let rest = text.trim().strip_prefix("/start")?;
    // `/start@bot_name token` in group chats
    let rest = match rest.strip_prefix('@') {
        Some(mention) => mention.split_once(' ').map(|(_, rest)| rest)?,
        None => rest,
    };
    let token = rest.trim();
    (!token.is_empty() && !token.contains(char::is_whitespace)).then_some(token)
}

struct Bot {
    client: reqwest::Client,
    settings: TelegramSettings,
}

impl Bot {
    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.settings.api_url.trim_end_matches('/'),
            self.settings.bot_token,
            method
        )
    }

    async fn updates(&self, offset: i64) -> anyhow::Result<Vec<Update>> {
        let response: ApiResponse<Vec<Update>> = self
            .client
            .get(self.method_url("getUpdates"))
            .query(&[
                ("offset", offset.to_string()),
                ("timeout", self.settings.poll_timeout_secs.to_string()),
            ])
            .timeout(Duration::from_secs(self.settings.poll_timeout_secs + 10))
            .send()
            .await?
            .json()
            .await?;

        if !response.ok {
            bail!(
                "getUpdates failed: {}",
                response.description.unwrap_or_default()
            );
        }
        Ok(response.result.unwrap_or_default())
    }

    async fn reply(&self, chat_id: i64, text: &str) -> anyhow::Result<()> {
        self.client
            .post(self.method_url("sendMessage"))
            .json(&serde_json::json!({ "chat_id": chat_id, "text": text }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn complete(&self, form: &TelegramComplete) -> anyhow::Result<reqwest::StatusCode> {
        let body = serde_json::to_vec(form)?;
        let signature = pcbuilds::sign_body(self.settings.bot_secret.as_bytes(), &body)
            .map_err(anyhow::Error::msg)?;

        let response = self
            .client
            .post(format!(
                "{}/auth/telegram/complete",
                self.settings.backend_url.trim_end_matches('/')
            ))
            .header("Content-Type", "application/json")
            .header("X-Bot-Signature", signature)
            .body(body)
            .send()
            .await
            .context("API is unreachable")?;

        Ok(response.status())
    }

    async fn handle(&self, message: IncomingMessage) -> anyhow::Result<()> {
        let (text, sender) = match (message.text.as_deref(), message.from) {
            (Some(text), Some(sender)) => (text, sender),
            _ => return Ok(()),
        };

        let token = match start_token(text) {
            Some(token) => token,
            None => {
                return self
                    .reply(message.chat.id, "Open the login link from the website to sign in.")
                    .await;
            }
        };

        let form = TelegramComplete {
            token: token.to_string(),
            telegram_id: sender.id,
            username: sender.username,
            first_name: sender.first_name,
            last_name: sender.last_name,
        };

        let reply = match self.complete(&form).await? {
            status if status.is_success() => "You are signed in. Return to the website.",
            reqwest::StatusCode::NOT_FOUND => "This login link has expired. Request a new one.",
            reqwest::StatusCode::CONFLICT => "This login link was already used.",
            status => {
                tracing::warn!("Completion for telegram user {} answered {}", sender.id, status);
                "Login failed, please try again later."
            }
        };
        self.reply(message.chat.id, reply).await
    }

    async fn run(&self) {
        let mut offset = 0;
        loop {
            let updates = match self.updates(offset).await {
                Ok(updates) => updates,
                Err(err) => {
                    tracing::warn!("Polling Telegram failed: {:#}", err);
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    continue;
                }
            };

            for update in updates {
                offset = offset.max(update.update_id + 1);
                if let Some(message) = update.message {
                    if let Err(err) = self.handle(message).await {
                        tracing::error!("Handling update {} failed: {:#}", update.update_id, err);
                    }
                }
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber("pcbuilds-telegram-bot".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    let settings = get_configuration().context("Failed to read configuration")?;
    if settings.telegram.bot_token.is_empty() || settings.telegram.bot_secret.is_empty() {
        bail!("TELEGRAM_BOT_TOKEN and TELEGRAM_BOT_SECRET must be set");
    }

    let bot = Bot {
        client: reqwest::Client::new(),
        settings: settings.telegram,
    };
    tracing::info!("Telegram bot @{} is polling", bot.settings.bot_username);

    tokio::select! {
        _ = bot.run() => {}
        _ = tokio::signal::ctrl_c() => tracing::info!("Shutting down"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_start_token() {
        assert_eq!(start_token("/start abc123"), Some("abc123"));
        assert_eq!(start_token("  /start   abc123  "), Some("abc123"));
        assert_eq!(start_token("/start@pcbuilds_bot abc123"), Some("abc123"));
        assert_eq!(start_token("/start"), None);
        assert_eq!(start_token("/start two words"), None);
        assert_eq!(start_token("hello"), None);
    }
}
