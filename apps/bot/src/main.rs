use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{self, TraceLayer};
use tracing::{error, info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use availability_cell::AvailabilityService;
use booking_cell::{
    BookingConversationService, ClientDirectory, InMemorySessionStore, SessionStore,
    SlotLedgerService,
};
use messaging_cell::{MessagingGateway, TelegramGateway};
use notification_cell::{NotificationJobs, NotificationScheduler};
use shared_config::AppConfig;
use shared_store::StoreClient;

#[tokio::main]
async fn main() {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting booking bot");

    // Load configuration, fail fast when the required vars are missing
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let store = Arc::new(StoreClient::new(&config.api_base_url));
    let gateway: Arc<dyn MessagingGateway> = Arc::new(TelegramGateway::new(
        &config.gateway_base_url,
        &config.bot_token,
    ));

    let engine = Arc::new(BookingConversationService::new(
        Arc::new(InMemorySessionStore::new()) as Arc<dyn SessionStore>,
        Arc::new(ClientDirectory::new()),
        Arc::new(AvailabilityService::new(Arc::clone(&store))),
        Arc::new(SlotLedgerService::new(Arc::clone(&store))),
        Arc::clone(&gateway),
        Arc::clone(&store),
    ));

    let jobs = Arc::new(NotificationJobs::new(
        Arc::clone(&store),
        Arc::clone(&gateway),
        Duration::from_millis(config.send_delay_ms),
    ));
    let scheduler = NotificationScheduler::new(jobs, &config);

    let scheduler_runner = Arc::clone(&scheduler);
    let scheduler_handle = tokio::spawn(async move { scheduler_runner.start().await });

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the application router
    let app = router::create_router(engine)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors);

    // Run the server
    let addr = SocketAddr::from(([0, 0, 0, 0], 3000));
    info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown requested");
        })
        .await
        .unwrap();

    scheduler.shutdown().await;
    let _ = scheduler_handle.await;
    info!("Booking bot stopped");
}
