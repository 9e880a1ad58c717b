use anyhow::{Context, bail};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::transport::Transport;
use crate::util::{get_bot_token, get_chat_id};

const DEFAULT_API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Clone)]
pub struct TelegramCredentials {
    pub bot_token: String,
    pub chat_id: String,
}

#[derive(Debug, Clone, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Telegram bot transport
///
/// Without credentials the transport is disabled: every send is logged and skipped.
#[derive(Debug, Clone)]
pub struct TelegramTransport {
    client: Client,
    credentials: Option<TelegramCredentials>,
    api_base: String,
}

impl TelegramTransport {
    pub fn new(client: Client, credentials: Option<TelegramCredentials>) -> Self {
        Self {
            client,
            credentials,
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Build from `TELEGRAM_BOT_TOKEN` and `TELEGRAM_CHAT_ID`
    pub fn from_env(client: Client) -> Self {
        let credentials = match (get_bot_token(), get_chat_id()) {
            (Some(bot_token), Some(chat_id)) => {
                info!("telegram transport initialized");
                Some(TelegramCredentials { bot_token, chat_id })
            }
            _ => {
                warn!("telegram token or chat id missing, notifications will be disabled");
                None
            }
        };

        Self::new(client, credentials)
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.credentials.is_some()
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    #[instrument(skip_all)]
    async fn send(&self, message: &str) -> anyhow::Result<()> {
        let Some(credentials) = &self.credentials else {
            info!("telegram not configured, skipping message: {message}");
            return Ok(());
        };

        let url = format!("{}/bot{}/sendMessage", self.api_base, credentials.bot_token);
        let payload = SendMessage {
            chat_id: &credentials.chat_id,
            text: message,
            parse_mode: "Markdown",
        };

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            // reqwest includes the url, which carries the bot token
            .map_err(|e| e.without_url())
            .context("telegram request failed")?;

        let status = response.status();
        let body = response
            .json::<ApiResponse>()
            .await
            .map_err(|e| e.without_url())
            .with_context(|| format!("unreadable telegram response (status {status})"))?;

        if !status.is_success() || !body.ok {
            bail!(
                "telegram rejected message with status {status}: {}",
                body.description.as_deref().unwrap_or("no description")
            );
        }

        info!("successfully sent telegram message");
        Ok(())
    }
}
