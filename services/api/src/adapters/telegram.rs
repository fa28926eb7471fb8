//! services/api/src/adapters/telegram.rs
//!
//! The outbound Telegram Bot API adapter: the concrete implementation of
//! the `BotGateway` port, talking to `api.telegram.org` over HTTPS.

use async_trait::async_trait;
use serde_json::json;

use timetrack_core::ports::{BotGateway, PortError, PortResult, WebAppButton};

/// Sends bot replies through the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramBotAdapter {
    http: reqwest::Client,
    /// When `None` the gateway is disabled and every send fails, which the
    /// webhook surfaces as an internal error.
    bot_token: Option<String>,
    api_base: String,
}

impl TelegramBotAdapter {
    pub fn new(bot_token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            bot_token,
            api_base: "https://api.telegram.org".to_string(),
        }
    }

    /// Points the adapter at a different API host (used against mock
    /// servers).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

#[async_trait]
impl BotGateway for TelegramBotAdapter {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        buttons: &[WebAppButton],
    ) -> PortResult<()> {
        let token = self
            .bot_token
            .as_deref()
            .ok_or_else(|| PortError::Unexpected("BOT_TOKEN is not configured".to_string()))?;

        let mut body = json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "Markdown",
        });
        if !buttons.is_empty() {
            let keyboard: Vec<Vec<serde_json::Value>> = buttons
                .iter()
                .map(|b| vec![json!({ "text": b.label, "web_app": { "url": b.url } })])
                .collect();
            body["reply_markup"] = json!({ "inline_keyboard": keyboard });
        }

        let url = format!("{}/bot{}/sendMessage", self.api_base, token);
        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(format!("sendMessage failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(PortError::Unexpected(format!(
                "sendMessage returned {status}: {detail}"
            )));
        }
        Ok(())
    }
}
