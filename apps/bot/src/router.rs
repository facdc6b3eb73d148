use std::sync::Arc;

use axum::{routing::get, Router};

use booking_cell::router::booking_routes;
use booking_cell::BookingConversationService;

pub fn create_router(engine: Arc<BookingConversationService>) -> Router {
    Router::new()
        .route("/", get(|| async { "Booking bot is running!" }))
        .merge(booking_routes(engine))
}
