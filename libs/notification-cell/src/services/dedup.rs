use std::sync::Arc;

use tracing::{info, warn};

use shared_models::NotificationKind;
use shared_store::StoreClient;

/// Check-then-act gate over the store's sent-notification markers. The gate
/// is biased at-least-once: when the check itself fails, the notification is
/// treated as NOT sent, preferring a duplicate reminder over a missed one.
pub struct NotificationDedupService {
    store: Arc<StoreClient>,
}

impl NotificationDedupService {
    pub fn new(store: Arc<StoreClient>) -> Self {
        Self { store }
    }

    pub async fn should_send(&self, appointment_id: i64, kind: NotificationKind) -> bool {
        match self.store.was_notification_sent(appointment_id, kind).await {
            Ok(true) => {
                info!(
                    "{} notification for appointment {} already sent, skipping",
                    kind, appointment_id
                );
                false
            }
            Ok(false) => true,
            Err(e) => {
                warn!(
                    "dedup check failed for appointment {} kind {}: {}; sending anyway",
                    appointment_id, kind, e
                );
                true
            }
        }
    }

    /// Best effort: a failed marker write is logged and accepted (the next
    /// run may send a duplicate).
    pub async fn mark_sent(&self, appointment_id: i64, kind: NotificationKind) {
        if let Err(e) = self.store.mark_notification_sent(appointment_id, kind).await {
            warn!(
                "failed to record {} notification for appointment {}: {}",
                kind, appointment_id, e
            );
        }
    }
}
