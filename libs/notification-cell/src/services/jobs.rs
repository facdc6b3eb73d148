use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, NaiveDate, NaiveDateTime};
use tracing::{error, info, instrument};

use messaging_cell::MessagingGateway;
use shared_models::{Appointment, NotificationKind};
use shared_store::{AppointmentsQuery, StoreClient};

use crate::error::NotificationError;
use crate::services::dedup::NotificationDedupService;

/// Outcome tally of one job run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct JobReport {
    pub candidates: usize,
    pub sent: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// The scheduler's job bodies. Every job walks its candidate list with
/// per-item isolation: one recipient's failure is counted and logged, never
/// aborts the rest of the batch. A fixed delay separates consecutive sends
/// for gateway rate limits.
pub struct NotificationJobs {
    store: Arc<StoreClient>,
    gateway: Arc<dyn MessagingGateway>,
    dedup: NotificationDedupService,
    send_delay: Duration,
}

impl NotificationJobs {
    pub fn new(
        store: Arc<StoreClient>,
        gateway: Arc<dyn MessagingGateway>,
        send_delay: Duration,
    ) -> Self {
        let dedup = NotificationDedupService::new(Arc::clone(&store));
        Self {
            store,
            gateway,
            dedup,
            send_delay,
        }
    }

    /// One digest per specialist with a linked chat, listing tomorrow's
    /// appointments sorted by time. Specialists with nothing tomorrow are
    /// skipped entirely; the daily cadence itself bounds duplicates, so no
    /// dedup marker is used.
    #[instrument(skip(self))]
    pub async fn run_daily_master_digest(
        &self,
        today: NaiveDate,
    ) -> Result<JobReport, NotificationError> {
        let tomorrow = today + ChronoDuration::days(1);
        let specialists = self
            .store
            .specialists_all()
            .await
            .map_err(NotificationError::StoreUnavailable)?;

        let mut report = JobReport::default();
        for specialist in specialists {
            let Some(chat_id) = specialist.chat_id else {
                continue;
            };
            report.candidates += 1;

            let query = AppointmentsQuery {
                specialist_id: Some(specialist.id),
                start_date: Some(tomorrow),
                end_date: Some(tomorrow),
                ..Default::default()
            };
            let mut appointments = match self.store.appointments(&query).await {
                Ok(appointments) => appointments,
                Err(e) => {
                    error!(
                        "digest fetch failed for specialist {}: {}",
                        specialist.id, e
                    );
                    report.failed += 1;
                    continue;
                }
            };

            if appointments.is_empty() {
                report.skipped += 1;
                continue;
            }
            appointments.sort_by_key(|appointment| appointment.time);

            let mut message = format!("≣ Ваши записи на {}:\n\n", tomorrow.format("%d.%m.%Y"));
            for appointment in &appointments {
                message.push_str(&format!(
                    "⏰ {}\n👤 {} ({})\n🎯 {}\n💵 {}₽\n────────────────\n",
                    appointment.time.format("%H:%M"),
                    appointment.client_name,
                    appointment.client_phone,
                    appointment.service_name.as_deref().unwrap_or("-"),
                    appointment.price.unwrap_or(0),
                ));
            }

            if self.deliver(chat_id, &message).await {
                report.sent += 1;
            } else {
                report.failed += 1;
            }
        }

        info!(
            "daily master digest: {} candidates, {} sent, {} without appointments, {} failed",
            report.candidates, report.sent, report.skipped, report.failed
        );
        Ok(report)
    }

    /// Day-before reminder to clients, once per appointment (kind=daily).
    #[instrument(skip(self))]
    pub async fn run_daily_client_reminders(
        &self,
        today: NaiveDate,
    ) -> Result<JobReport, NotificationError> {
        let tomorrow = today + ChronoDuration::days(1);
        let candidates = self
            .store
            .daily_reminder_candidates()
            .await
            .map_err(NotificationError::StoreUnavailable)?;

        let mut report = JobReport::default();
        for appointment in candidates {
            let Some(chat_id) = appointment.client_chat_id else {
                continue;
            };
            if appointment.date != tomorrow {
                continue;
            }
            report.candidates += 1;

            if !self.dedup.should_send(appointment.id, NotificationKind::Daily).await {
                report.skipped += 1;
                continue;
            }

            let message = format!(
                "🔔 Напоминание о записи!\n\nЗавтра, {} в {} вы записаны:\n🎯 {}\n♢ Мастер: {}\n\nЖдем вас!",
                appointment.date.format("%d.%m.%Y"),
                appointment.time.format("%H:%M"),
                appointment.service_name.as_deref().unwrap_or("-"),
                appointment.specialist_name.as_deref().unwrap_or("-"),
            );

            if self.deliver(chat_id, &message).await {
                self.dedup.mark_sent(appointment.id, NotificationKind::Daily).await;
                report.sent += 1;
            } else {
                report.failed += 1;
            }
        }

        info!(
            "daily client reminders: {} candidates, {} sent, {} deduped, {} failed",
            report.candidates, report.sent, report.skipped, report.failed
        );
        Ok(report)
    }

    /// Hour-before reminder: appointments starting within `[now, now + 1h)`,
    /// once per appointment (kind=hourly).
    #[instrument(skip(self))]
    pub async fn run_hourly_client_reminders(
        &self,
        now: NaiveDateTime,
    ) -> Result<JobReport, NotificationError> {
        let window_end = now + ChronoDuration::hours(1);
        let candidates = self
            .store
            .hourly_reminder_candidates()
            .await
            .map_err(NotificationError::StoreUnavailable)?;

        let mut report = JobReport::default();
        for appointment in candidates {
            let Some(chat_id) = appointment.client_chat_id else {
                continue;
            };
            let starts_at = appointment.starts_at();
            if starts_at < now || starts_at >= window_end {
                continue;
            }
            report.candidates += 1;

            if !self.dedup.should_send(appointment.id, NotificationKind::Hourly).await {
                report.skipped += 1;
                continue;
            }

            let message = format!(
                "🔔 Скоро ваша запись!\n\nСегодня в {}:\n🎯 {}\n♢ Мастер: {}\n\nЖдем вас!",
                appointment.time.format("%H:%M"),
                appointment.service_name.as_deref().unwrap_or("-"),
                appointment.specialist_name.as_deref().unwrap_or("-"),
            );

            if self.deliver(chat_id, &message).await {
                self.dedup.mark_sent(appointment.id, NotificationKind::Hourly).await;
                report.sent += 1;
            } else {
                report.failed += 1;
            }
        }

        info!(
            "hourly client reminders: {} candidates, {} sent, {} deduped, {} failed",
            report.candidates, report.sent, report.skipped, report.failed
        );
        Ok(report)
    }

    /// Confirmation to the client (kind=immediate) and new-booking alert to
    /// the specialist (kind=masternew), scanning appointments created today.
    #[instrument(skip(self))]
    pub async fn run_immediate_scan(
        &self,
        now: NaiveDateTime,
    ) -> Result<JobReport, NotificationError> {
        let midnight = now.date().and_hms_opt(0, 0, 0).unwrap_or(now);
        let query = AppointmentsQuery {
            created_since: Some(midnight),
            ..Default::default()
        };
        let appointments = self
            .store
            .appointments(&query)
            .await
            .map_err(NotificationError::StoreUnavailable)?;

        let mut report = JobReport::default();
        for appointment in &appointments {
            if let Some(chat_id) = appointment.client_chat_id {
                report.candidates += 1;
                self.confirm_client(chat_id, appointment, &mut report).await;
            }
            if let Some(chat_id) = appointment.specialist_chat_id {
                report.candidates += 1;
                self.alert_specialist(chat_id, appointment, &mut report).await;
            }
        }

        info!(
            "immediate scan: {} candidates, {} sent, {} deduped, {} failed",
            report.candidates, report.sent, report.skipped, report.failed
        );
        Ok(report)
    }

    async fn confirm_client(&self, chat_id: i64, appointment: &Appointment, report: &mut JobReport) {
        if !self
            .dedup
            .should_send(appointment.id, NotificationKind::Immediate)
            .await
        {
            report.skipped += 1;
            return;
        }

        let message = format!(
            "✅ Ваша запись подтверждена!\n\n🎯 Услуга: {}\n♢ Мастер: {}\n≣ Дата: {}\n⏰ Время: {}",
            appointment.service_name.as_deref().unwrap_or("-"),
            appointment.specialist_name.as_deref().unwrap_or("-"),
            appointment.date.format("%d.%m.%Y"),
            appointment.time.format("%H:%M"),
        );

        if self.deliver(chat_id, &message).await {
            self.dedup
                .mark_sent(appointment.id, NotificationKind::Immediate)
                .await;
            report.sent += 1;
        } else {
            report.failed += 1;
        }
    }

    async fn alert_specialist(&self, chat_id: i64, appointment: &Appointment, report: &mut JobReport) {
        if !self
            .dedup
            .should_send(appointment.id, NotificationKind::MasterNew)
            .await
        {
            report.skipped += 1;
            return;
        }

        let message = format!(
            "🔔 Новая запись!\n\n👤 Клиент: {} ({})\n🎯 Услуга: {}\n≣ Дата: {}\n⏰ Время: {}\n💵 Стоимость: {}₽",
            appointment.client_name,
            appointment.client_phone,
            appointment.service_name.as_deref().unwrap_or("-"),
            appointment.date.format("%d.%m.%Y"),
            appointment.time.format("%H:%M"),
            appointment.price.unwrap_or(0),
        );

        if self.deliver(chat_id, &message).await {
            self.dedup
                .mark_sent(appointment.id, NotificationKind::MasterNew)
                .await;
            report.sent += 1;
        } else {
            report.failed += 1;
        }
    }

    /// One send with the inter-send pause. Returns whether delivery worked.
    async fn deliver(&self, chat_id: i64, message: &str) -> bool {
        let outcome = self.gateway.send_message(chat_id, message, None).await;
        if !self.send_delay.is_zero() {
            tokio::time::sleep(self.send_delay).await;
        }
        match outcome {
            Ok(()) => true,
            Err(e) => {
                error!("notification to chat {} failed: {}", chat_id, e);
                false
            }
        }
    }
}
