use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_utils::time;

use crate::services::jobs::NotificationJobs;

/// Two timer loops in one process: the fixed-time daily run (master digest
/// plus day-before client reminders) and the short-interval scan (hourly
/// reminders plus immediate confirmations/alerts). No single-flight guard
/// between overlapping runs of the same job; dedup markers bound the damage.
pub struct NotificationScheduler {
    jobs: Arc<NotificationJobs>,
    daily_hour: u32,
    daily_minute: u32,
    scan_interval: Duration,
    is_shutdown: RwLock<bool>,
}

impl NotificationScheduler {
    pub fn new(jobs: Arc<NotificationJobs>, config: &AppConfig) -> Arc<Self> {
        Arc::new(Self {
            jobs,
            daily_hour: config.daily_notify_hour,
            daily_minute: config.daily_notify_minute,
            scan_interval: Duration::from_secs(config.scan_interval_seconds),
            is_shutdown: RwLock::new(false),
        })
    }

    pub async fn start(self: &Arc<Self>) {
        info!(
            "Starting notification scheduler (daily at {:02}:{:02}, scan every {:?})",
            self.daily_hour, self.daily_minute, self.scan_interval
        );

        let daily = Arc::clone(self);
        let daily_handle = tokio::spawn(async move { daily.daily_loop().await });

        let scan = Arc::clone(self);
        let scan_handle = tokio::spawn(async move { scan.scan_loop().await });

        tokio::select! {
            _ = self.wait_for_shutdown() => {
                info!("Shutdown signal received, stopping notification scheduler");
            }
            _ = futures::future::try_join_all(vec![daily_handle, scan_handle]) => {
                warn!("Scheduler loops completed unexpectedly");
            }
        }
    }

    pub async fn shutdown(&self) {
        info!("Initiating notification scheduler shutdown");
        let mut is_shutdown = self.is_shutdown.write().await;
        *is_shutdown = true;
    }

    async fn daily_loop(&self) {
        loop {
            if *self.is_shutdown.read().await {
                break;
            }

            let now = time::now();
            let fire_at = time::next_daily_fire(now, self.daily_hour, self.daily_minute);
            let wait = (fire_at - now).to_std().unwrap_or(Duration::from_secs(1));
            debug!("Next daily notification run at {}", fire_at);

            tokio::select! {
                _ = tokio::time::sleep(wait) => {
                    self.run_daily().await;
                }
                _ = self.wait_for_shutdown() => break,
            }
        }
        debug!("Daily notification loop ended");
    }

    async fn scan_loop(&self) {
        let mut interval = tokio::time::interval(self.scan_interval);
        // the immediate first tick would double up with process start
        interval.tick().await;

        loop {
            tokio::select! {
                _ = interval.tick() => {}
                _ = self.wait_for_shutdown() => break,
            }
            if *self.is_shutdown.read().await {
                break;
            }
            self.run_scan().await;
        }
        debug!("Notification scan loop ended");
    }

    async fn run_daily(&self) {
        let run_id = Uuid::new_v4();
        let today = time::today();
        info!("Daily notification run {} for {}", run_id, today);

        if let Err(e) = self.jobs.run_daily_master_digest(today).await {
            error!("Daily run {}: master digest aborted: {}", run_id, e);
        }
        if let Err(e) = self.jobs.run_daily_client_reminders(today).await {
            error!("Daily run {}: client reminders aborted: {}", run_id, e);
        }
    }

    async fn run_scan(&self) {
        let run_id = Uuid::new_v4();
        let now = time::now();
        debug!("Notification scan {} at {}", run_id, now);

        if let Err(e) = self.jobs.run_hourly_client_reminders(now).await {
            error!("Scan {}: hourly reminders aborted: {}", run_id, e);
        }
        if let Err(e) = self.jobs.run_immediate_scan(now).await {
            error!("Scan {}: immediate scan aborted: {}", run_id, e);
        }
    }

    async fn wait_for_shutdown(&self) {
        loop {
            if *self.is_shutdown.read().await {
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }
}
