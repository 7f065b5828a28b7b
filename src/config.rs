use figment::providers::{Env, Serialized};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display};
use std::time::Duration;

pub(crate) const DEFAULT_ADMIN_CHAT_ID: i64 = 7837501582;
pub(crate) const DEFAULT_API_BASE_URL: &str = "https://api.telegram.org";
const DEFAULT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, thiserror::Error)]
pub(crate) enum ConfigurationError {
    #[error("Bot token not configured")]
    MissingBotToken,
}

/// Telegram accepts either a numeric chat id or an `@channelusername`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub(crate) enum ChatId {
    Id(i64),
    Username(String),
}

impl Display for ChatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatId::Id(id) => write!(f, "{}", id),
            ChatId::Username(name) => write!(f, "{}", name),
        }
    }
}

#[derive(Serialize, Deserialize)]
pub(crate) struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    telegram_bot_token: Option<String>,
    pub telegram_admin_chat_id: ChatId,
    pub telegram_api_base_url: String,
    pub telegram_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            telegram_bot_token: None,
            telegram_admin_chat_id: ChatId::Id(DEFAULT_ADMIN_CHAT_ID),
            telegram_api_base_url: DEFAULT_API_BASE_URL.to_string(),
            telegram_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, figment::Error> {
        let config: Config = Figment::from(Serialized::defaults(Config::default()))
            .merge(Env::raw().only(&[
                "TELEGRAM_BOT_TOKEN",
                "TELEGRAM_ADMIN_CHAT_ID",
                "TELEGRAM_API_BASE_URL",
                "TELEGRAM_TIMEOUT_SECS",
            ]))
            .extract()?;

        // a zero timeout would fail every send
        if config.telegram_timeout_secs == 0 {
            return Err(figment::Error::from(
                "TELEGRAM_TIMEOUT_SECS must be at least 1".to_string(),
            ));
        }
        Ok(config)
    }

    /// An empty token counts as missing.
    pub fn bot_token(&self) -> Result<&str, ConfigurationError> {
        self.telegram_bot_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(ConfigurationError::MissingBotToken)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.telegram_timeout_secs)
    }
}

// The bot token is a credential, keep it out of the logs.
impl Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field(
                "telegram_bot_token",
                &self.telegram_bot_token.as_ref().map(|_| "<redacted>"),
            )
            .field("telegram_admin_chat_id", &self.telegram_admin_chat_id)
            .field("telegram_api_base_url", &self.telegram_api_base_url)
            .field("telegram_timeout_secs", &self.telegram_timeout_secs)
            .finish()
    }
}
