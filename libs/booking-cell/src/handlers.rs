use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use tracing::{debug, error};

use messaging_cell::Update;

use crate::services::engine::BookingConversationService;

/// Inbound gateway webhook. Always answers 200: the gateway redelivers
/// non-2xx updates, so a poisoned update would wedge the whole queue.
/// Engine failures are logged and reported to the chat instead.
pub async fn telegram_webhook(
    State(engine): State<Arc<BookingConversationService>>,
    Json(update): Json<Update>,
) -> (StatusCode, Json<Value>) {
    debug!("webhook update {}", update.update_id);

    if let Some(message) = update.message {
        let chat_id = message.chat.id;
        if let Some(text) = message.text {
            let outcome = if text.starts_with('/') {
                engine.handle_command(chat_id, &text).await
            } else {
                engine.handle_text(chat_id, &text).await
            };
            if let Err(e) = outcome {
                error!("update {} from chat {} failed: {}", update.update_id, chat_id, e);
                engine.notify_failure(chat_id, &e).await;
            }
        }
    } else if let Some(callback) = update.callback_query {
        let chat_id = callback.from.id;
        if let Some(data) = callback.data {
            if let Err(e) = engine.handle_callback(chat_id, &callback.id, &data).await {
                error!("update {} from chat {} failed: {}", update.update_id, chat_id, e);
                engine.notify_failure(chat_id, &e).await;
            }
        }
    }

    (StatusCode::OK, Json(json!({ "ok": true })))
}
