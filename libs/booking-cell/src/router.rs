use std::sync::Arc;

use axum::{routing::post, Router};

use crate::handlers;
use crate::services::engine::BookingConversationService;

pub fn booking_routes(engine: Arc<BookingConversationService>) -> Router {
    Router::new()
        .route("/webhook", post(handlers::telegram_webhook))
        .with_state(engine)
}
