use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::MessagingError;
use crate::models::InlineKeyboardMarkup;

/// Outbound messaging seam. The conversation engine and the scheduler depend
/// on this trait only; the Telegram implementation lives behind it.
#[async_trait]
pub trait MessagingGateway: Send + Sync {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<(), MessagingError>;

    async fn send_photo(
        &self,
        chat_id: i64,
        photo_url: &str,
        caption: &str,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<(), MessagingError>;

    /// Acknowledge a callback button press, optionally with a toast notice.
    async fn answer_callback(&self, callback_id: &str, text: Option<&str>) -> Result<(), MessagingError>;
}

/// Telegram Bot API over HTTPS.
pub struct TelegramGateway {
    client: Client,
    base_url: String,
    token: String,
}

impl TelegramGateway {
    pub fn new(base_url: &str, token: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    async fn call(&self, api_method: &str, body: Value) -> Result<(), MessagingError> {
        let url = format!("{}/bot{}/{}", self.base_url, self.token, api_method);
        debug!("Messaging gateway call: {}", api_method);

        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();
        let payload: Value = response.json().await?;

        if !status.is_success() || payload["ok"] != true {
            return Err(MessagingError::Rejected {
                status: status.as_u16(),
                description: payload["description"]
                    .as_str()
                    .unwrap_or("unknown gateway error")
                    .to_string(),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl MessagingGateway for TelegramGateway {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<(), MessagingError> {
        let mut body = json!({ "chat_id": chat_id, "text": text });
        if let Some(markup) = keyboard {
            body["reply_markup"] = serde_json::to_value(markup).unwrap_or(Value::Null);
        }
        self.call("sendMessage", body).await
    }

    async fn send_photo(
        &self,
        chat_id: i64,
        photo_url: &str,
        caption: &str,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<(), MessagingError> {
        let mut body = json!({ "chat_id": chat_id, "photo": photo_url, "caption": caption });
        if let Some(markup) = keyboard {
            body["reply_markup"] = serde_json::to_value(markup).unwrap_or(Value::Null);
        }
        self.call("sendPhoto", body).await
    }

    async fn answer_callback(&self, callback_id: &str, text: Option<&str>) -> Result<(), MessagingError> {
        let mut body = json!({ "callback_query_id": callback_id });
        if let Some(notice) = text {
            body["text"] = json!(notice);
        }
        self.call("answerCallbackQuery", body).await
    }
}
