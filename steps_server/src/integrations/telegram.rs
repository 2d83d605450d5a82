use std::sync::Arc;

use log::*;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use steps_engine::walk::{Button, EditOutcome, MessageHandle, MessagingError, MessagingSink};

use crate::{config::TelegramConfig, integrations::IntegrationError};

/// Telegram answers an edit that would not change anything with this error description.
const NOT_MODIFIED: &str = "message is not modified";

/// Sends and edits walk status messages through the Telegram Bot API. Walkers talk to the bot in a private chat, so
/// the walker's Telegram id is also the chat id.
#[derive(Clone)]
pub struct TelegramClient {
    config: TelegramConfig,
    client: Arc<Client>,
}

#[derive(Debug, Deserialize)]
struct BotResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: i64,
    chat: Chat,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
}

#[derive(Debug, Serialize)]
struct InlineButton<'a> {
    text: &'a str,
    callback_data: &'a str,
}

impl TelegramClient {
    pub fn new(config: TelegramConfig) -> Result<Self, IntegrationError> {
        let client = Client::builder().build().map_err(|e| IntegrationError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.config.api_url.trim_end_matches('/'), self.config.bot_token.reveal())
    }

    /// Calls a Bot API method. Telegram reports most failures with `ok: false` and a description, often alongside a
    /// 4xx status, so the body is read regardless of the status.
    pub async fn call<T: DeserializeOwned>(&self, method: &str, body: &Value) -> Result<T, IntegrationError> {
        trace!("📬️ Calling Telegram method {method}");
        let response = self
            .client
            .post(self.url(method))
            .json(body)
            .send()
            .await
            .map_err(|e| IntegrationError::RequestError(e.to_string()))?;
        let status = response.status().as_u16();
        let reply =
            response.json::<BotResponse<T>>().await.map_err(|e| IntegrationError::JsonError(e.to_string()))?;
        match reply {
            BotResponse { ok: true, result: Some(result), .. } => Ok(result),
            BotResponse { description, .. } => {
                let message = description.unwrap_or_else(|| "no description".into());
                Err(IntegrationError::QueryError { status, message })
            },
        }
    }
}

fn keyboard(buttons: &[Button]) -> Value {
    let row = buttons
        .iter()
        .map(|b| InlineButton { text: &b.text, callback_data: &b.callback_data })
        .collect::<Vec<_>>();
    json!({ "inline_keyboard": [row] })
}

fn message_body(text: &str, buttons: &[Button]) -> Value {
    let mut body = json!({ "text": text });
    if !buttons.is_empty() {
        body["reply_markup"] = keyboard(buttons);
    }
    body
}

fn is_not_modified(e: &IntegrationError) -> bool {
    matches!(e, IntegrationError::QueryError { message, .. } if message.contains(NOT_MODIFIED))
}

impl MessagingSink for TelegramClient {
    async fn send(&self, subject: i64, text: &str, buttons: &[Button]) -> Result<MessageHandle, MessagingError> {
        let mut body = message_body(text, buttons);
        body["chat_id"] = json!(subject);
        let sent = self.call::<SentMessage>("sendMessage", &body).await.map_err(|e| {
            warn!("📬️ Could not send a message to {subject}. {e}");
            MessagingError(e.to_string())
        })?;
        debug!("📬️ Sent message {} to {}", sent.message_id, sent.chat.id);
        Ok(MessageHandle { chat_id: sent.chat.id, message_id: sent.message_id })
    }

    async fn edit(&self, handle: &MessageHandle, text: &str, buttons: &[Button]) -> EditOutcome {
        let mut body = message_body(text, buttons);
        body["chat_id"] = json!(handle.chat_id);
        body["message_id"] = json!(handle.message_id);
        // editMessageText returns the edited message, or `true` for inline messages
        match self.call::<Value>("editMessageText", &body).await {
            Ok(_) => EditOutcome::Edited,
            Err(e) if is_not_modified(&e) => EditOutcome::Unchanged,
            Err(e) => EditOutcome::Failed(e.to_string()),
        }
    }
}
