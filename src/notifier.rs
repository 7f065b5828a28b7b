use crate::config::ChatId;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

#[cfg(test)]
use mockall::automock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub(crate) enum ParseMode {
    #[serde(rename = "HTML")]
    Html,
}

/// Body of a Bot API `sendMessage` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct SendMessage {
    pub chat_id: ChatId,
    pub text: String,
    pub parse_mode: ParseMode,
}

impl SendMessage {
    pub fn html(chat_id: ChatId, text: String) -> Self {
        Self {
            chat_id,
            text,
            parse_mode: ParseMode::Html,
        }
    }
}

/// Every way the outbound call can fail. All of them are reported to the
/// caller the same way, the variants only sharpen the description.
#[derive(Debug, thiserror::Error)]
pub(crate) enum DeliveryError {
    #[error("Telegram request failed: {}", with_causes(.0))]
    Transport(#[source] reqwest::Error),
    #[error("Telegram API returned {status}: {description}")]
    Rejected {
        status: StatusCode,
        description: String,
    },
    #[error("Malformed Telegram response: {0}")]
    MalformedResponse(#[source] serde_json::Error),
}

// reqwest's own message is generic ("error sending request"), the reason is in the sources
fn with_causes(e: &reqwest::Error) -> String {
    let mut message = e.to_string();
    let mut cause = std::error::Error::source(e);
    while let Some(inner) = cause {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        cause = inner.source();
    }
    message
}

impl From<reqwest::Error> for DeliveryError {
    // reqwest puts the request URL in its errors, and ours carries the bot token
    fn from(e: reqwest::Error) -> Self {
        DeliveryError::Transport(e.without_url())
    }
}

#[cfg_attr(test, automock)]
#[async_trait]
pub(crate) trait Notifier: Send + Sync {
    async fn send_message(&self, message: &SendMessage) -> Result<(), DeliveryError>;
}

#[derive(Debug, Deserialize)]
struct BotApiResponse {
    ok: bool,
    description: Option<String>,
}

pub(crate) struct TelegramNotifier {
    http_client: Client,
    api_base_url: String,
    bot_token: String,
}

impl TelegramNotifier {
    pub fn new(http_client: Client, api_base_url: &str, bot_token: &str) -> Self {
        Self {
            http_client,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            bot_token: bot_token.to_string(),
        }
    }

    fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base_url, self.bot_token)
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    #[tracing::instrument(skip(self, message), fields(chat_id = %message.chat_id))]
    async fn send_message(&self, message: &SendMessage) -> Result<(), DeliveryError> {
        let response = self
            .http_client
            .post(self.send_message_url())
            .json(message)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        let reply = match serde_json::from_slice::<BotApiResponse>(&body) {
            Ok(reply) => reply,
            Err(e) if status.is_success() => return Err(DeliveryError::MalformedResponse(e)),
            Err(_) => {
                return Err(DeliveryError::Rejected {
                    status,
                    description: String::from_utf8_lossy(&body).chars().take(256).collect(),
                })
            }
        };

        if !status.is_success() || !reply.ok {
            return Err(DeliveryError::Rejected {
                status,
                description: reply.description.unwrap_or_default(),
            });
        }

        tracing::info!("Telegram accepted the message");
        Ok(())
    }
}
