use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Datelike, Duration, NaiveDate};
use tracing::{info, instrument, warn};

use availability_cell::AvailabilityService;
use messaging_cell::{InlineKeyboardButton, InlineKeyboardMarkup, MessagingGateway};
use shared_models::{ScheduleSlot, Service, Specialist};
use shared_store::StoreClient;
use shared_utils::time;

use crate::error::BookingError;
use crate::models::{ConversationState, Step};
use crate::services::ledger::SlotLedgerService;
use crate::session::{ClientContact, ClientDirectory, SessionStore};
use crate::validators::Validators;

const WEEKDAYS_RU: [&str; 7] = ["Пн", "Вт", "Ср", "Чт", "Пт", "Сб", "Вс"];

/// The multi-step booking dialog. One instance serves every chat; all
/// per-user progress lives in the session store.
pub struct BookingConversationService {
    sessions: Arc<dyn SessionStore>,
    directory: Arc<ClientDirectory>,
    availability: Arc<AvailabilityService>,
    ledger: Arc<SlotLedgerService>,
    gateway: Arc<dyn MessagingGateway>,
    store: Arc<StoreClient>,
    validators: Validators,
}

impl BookingConversationService {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        directory: Arc<ClientDirectory>,
        availability: Arc<AvailabilityService>,
        ledger: Arc<SlotLedgerService>,
        gateway: Arc<dyn MessagingGateway>,
        store: Arc<StoreClient>,
    ) -> Self {
        Self {
            sessions,
            directory,
            availability,
            ledger,
            gateway,
            store,
            validators: Validators::new(),
        }
    }

    /// Last-resort user notice after a handler error. A stale reference ends
    /// the conversation; a store outage leaves the step untouched so the
    /// user can retry. Delivery failures here are only logged.
    pub async fn notify_failure(&self, chat_id: i64, error: &BookingError) {
        let text = match error {
            BookingError::NotFound(_) => {
                self.sessions.clear(chat_id).await;
                "❌ Запись не может быть продолжена. Наберите /start, чтобы начать заново."
            }
            BookingError::Messaging(_) => return,
            _ => "❌ Ошибка подключения к серверу\n\nПопробуйте позже.",
        };
        if let Err(e) = self.gateway.send_message(chat_id, text, None).await {
            warn!("failed to deliver error notice to chat {}: {}", chat_id, e);
        }
    }

    #[instrument(skip(self, text))]
    pub async fn handle_command(&self, chat_id: i64, text: &str) -> Result<(), BookingError> {
        match text.trim() {
            "/start" => {
                self.sessions.clear(chat_id).await;
                self.gateway
                    .send_message(
                        chat_id,
                        "Здравствуйте! Это запись к нашим мастерам.\n\nКак вы хотите записаться?",
                        Some(entry_menu()),
                    )
                    .await?;
            }
            "/cancel" => {
                self.sessions.clear(chat_id).await;
                self.gateway
                    .send_message(
                        chat_id,
                        "Запись отменена. Наберите /start, чтобы начать заново.",
                        None,
                    )
                    .await?;
            }
            other => {
                info!("unknown command from chat {}: {}", chat_id, other);
                self.gateway
                    .send_message(chat_id, "Не понимаю. Наберите /start, чтобы записаться.", None)
                    .await?;
            }
        }
        Ok(())
    }

    #[instrument(skip(self, text))]
    pub async fn handle_text(&self, chat_id: i64, text: &str) -> Result<(), BookingError> {
        let state = self.state(chat_id).await;

        match state.step {
            Step::EnteringName => self.on_name_entered(chat_id, state, text).await,
            Step::EnteringPhone => self.on_phone_entered(chat_id, state, text).await,
            _ => {
                self.gateway
                    .send_message(chat_id, "Не понимаю. Наберите /start, чтобы записаться.", None)
                    .await?;
                Ok(())
            }
        }
    }

    #[instrument(skip(self, callback_id, data))]
    pub async fn handle_callback(
        &self,
        chat_id: i64,
        callback_id: &str,
        data: &str,
    ) -> Result<(), BookingError> {
        // A tap on a date without open slots is a notice, not a transition.
        if data == "date:none" {
            self.gateway
                .answer_callback(callback_id, Some("На эту дату нет свободного времени"))
                .await?;
            return Ok(());
        }
        self.gateway.answer_callback(callback_id, None).await?;

        match data.split_once(':') {
            Some(("menu", "main")) => {
                self.sessions.clear(chat_id).await;
                self.gateway
                    .send_message(chat_id, "Как вы хотите записаться?", Some(entry_menu()))
                    .await?;
                Ok(())
            }
            Some(("book", "service")) => self.list_services(chat_id).await,
            Some(("book", "specialist")) => self.list_specialists(chat_id).await,
            Some(("svc", id)) => match id.parse() {
                Ok(service_id) => self.on_service_selected(chat_id, service_id).await,
                Err(_) => Ok(()),
            },
            Some(("spec", id)) => match id.parse() {
                Ok(specialist_id) => self.on_specialist_selected(chat_id, specialist_id).await,
                Err(_) => Ok(()),
            },
            Some(("week", raw)) => self.on_week_nav(chat_id, raw).await,
            Some(("date", raw)) => self.on_date_selected(chat_id, raw).await,
            Some(("slot", id)) => match id.parse() {
                Ok(slot_id) => self.on_slot_selected(chat_id, slot_id).await,
                Err(_) => Ok(()),
            },
            _ => {
                warn!("unknown callback data from chat {}: {}", chat_id, data);
                Ok(())
            }
        }
    }

    // --- entry lists -----------------------------------------------------

    async fn list_services(&self, chat_id: i64) -> Result<(), BookingError> {
        let services = self.availability.services_with_open_slots().await?;
        if services.is_empty() {
            self.gateway
                .send_message(
                    chat_id,
                    "❌ На данный момент нет доступных услуг со свободным временем\n\nПопробуйте позже.",
                    Some(entry_menu()),
                )
                .await?;
            return Ok(());
        }

        let mut state = ConversationState::idle();
        state.step = Step::SelectingService;
        self.sessions.set(chat_id, state).await;

        let mut keyboard = InlineKeyboardMarkup::new();
        for service in &services {
            keyboard = keyboard.row(format_service(service), format!("svc:{}", service.id));
        }
        keyboard = keyboard.row("☰ Главное меню", "menu:main");

        self.gateway
            .send_message(chat_id, "Выберите услугу:", Some(keyboard))
            .await?;
        Ok(())
    }

    async fn list_specialists(&self, chat_id: i64) -> Result<(), BookingError> {
        let specialists = self.availability.specialists_with_open_slots().await?;
        if specialists.is_empty() {
            self.gateway
                .send_message(
                    chat_id,
                    "❌ На данный момент нет доступных мастеров со свободным временем\n\nПопробуйте позже.",
                    Some(entry_menu()),
                )
                .await?;
            return Ok(());
        }

        let mut state = ConversationState::idle();
        state.step = Step::SelectingSpecialist;
        self.sessions.set(chat_id, state).await;

        let mut keyboard = InlineKeyboardMarkup::new();
        for specialist in &specialists {
            keyboard = keyboard.row(specialist.name.clone(), format!("spec:{}", specialist.id));
        }
        keyboard = keyboard.row("☰ Главное меню", "menu:main");

        self.gateway
            .send_message(chat_id, "Выберите мастера:", Some(keyboard))
            .await?;
        Ok(())
    }

    // --- selection steps -------------------------------------------------

    async fn on_service_selected(&self, chat_id: i64, service_id: i64) -> Result<(), BookingError> {
        let mut state = self.state(chat_id).await;
        if state.step != Step::SelectingService {
            info!("ignoring service tap from chat {} at step {:?}", chat_id, state.step);
            return Ok(());
        }
        state.selections.service_id = Some(service_id);

        // Specialist-first entry already carries a specialist; both orders
        // converge on the date grid once the pair is complete.
        if state.selections.specialist_id.is_some() {
            return self.show_date_grid(chat_id, state, None).await;
        }

        let specialists = self.availability.specialists_for_service(service_id).await?;
        if specialists.is_empty() {
            self.gateway
                .send_message(
                    chat_id,
                    "❌ Нет мастеров со свободным временем для этой услуги\n\nПопробуйте выбрать другую услугу.",
                    Some(entry_menu()),
                )
                .await?;
            return Ok(());
        }

        state.step = Step::SelectingSpecialist;
        self.sessions.set(chat_id, state).await;

        let mut keyboard = InlineKeyboardMarkup::new();
        for specialist in &specialists {
            keyboard = keyboard.row(specialist.name.clone(), format!("spec:{}", specialist.id));
        }
        keyboard = keyboard.row("☰ Главное меню", "menu:main");

        self.gateway
            .send_message(chat_id, "Выберите мастера:", Some(keyboard))
            .await?;
        Ok(())
    }

    async fn on_specialist_selected(
        &self,
        chat_id: i64,
        specialist_id: i64,
    ) -> Result<(), BookingError> {
        let mut state = self.state(chat_id).await;
        if state.step != Step::SelectingSpecialist {
            info!(
                "ignoring specialist tap from chat {} at step {:?}",
                chat_id, state.step
            );
            return Ok(());
        }
        state.selections.specialist_id = Some(specialist_id);

        if state.selections.service_id.is_some() {
            return self.show_date_grid(chat_id, state, None).await;
        }

        let services = self.availability.services_for_specialist(specialist_id).await?;
        if services.is_empty() {
            self.gateway
                .send_message(
                    chat_id,
                    "❌ Нет услуг со свободным временем для этого мастера\n\nПопробуйте выбрать другого мастера.",
                    Some(entry_menu()),
                )
                .await?;
            return Ok(());
        }

        state.step = Step::SelectingService;
        self.sessions.set(chat_id, state).await;

        let mut keyboard = InlineKeyboardMarkup::new();
        for service in &services {
            keyboard = keyboard.row(format_service(service), format!("svc:{}", service.id));
        }
        keyboard = keyboard.row("☰ Главное меню", "menu:main");

        self.gateway
            .send_message(chat_id, "Выберите услугу для мастера:", Some(keyboard))
            .await?;
        Ok(())
    }

    async fn on_week_nav(&self, chat_id: i64, raw: &str) -> Result<(), BookingError> {
        let state = self.state(chat_id).await;
        if state.step != Step::SelectingDate {
            return Ok(());
        }
        let Some(pivot) = self.validators.calendar_date(raw) else {
            return Ok(());
        };
        self.show_date_grid(chat_id, state, Some(pivot)).await
    }

    /// One week of dates around the pivot. The first render probes forward
    /// for the next non-empty week; navigation never goes behind the current
    /// week.
    async fn show_date_grid(
        &self,
        chat_id: i64,
        mut state: ConversationState,
        pivot: Option<NaiveDate>,
    ) -> Result<(), BookingError> {
        let specialist_id = state
            .selections
            .specialist_id
            .ok_or_else(|| BookingError::NotFound("мастер не выбран".into()))?;
        let service_id = state
            .selections
            .service_id
            .ok_or_else(|| BookingError::NotFound("услуга не выбрана".into()))?;

        let today = time::today();
        let current_monday = time::start_of_week(today);

        let monday = match (pivot, state.pivot) {
            (Some(requested), _) => time::start_of_week(requested).max(current_monday),
            (None, Some(kept)) => kept,
            (None, None) => {
                // first render: jump to the first week that has anything
                match self
                    .availability
                    .next_nonempty_week(specialist_id, service_id, today)
                    .await?
                {
                    Some((week_start, _)) => week_start,
                    None => current_monday,
                }
            }
        };

        let (from, to) = AvailabilityService::week_window(monday, today);
        let open: HashSet<NaiveDate> = self
            .availability
            .available_dates(specialist_id, service_id, from, to)
            .await?
            .into_iter()
            .collect();

        let specialist = self.specialist_profile(specialist_id).await?;
        let service = self.service_profile(service_id).await?;

        let mut keyboard = InlineKeyboardMarkup::new();
        for offset in 0..7 {
            let date = monday + Duration::days(offset);
            let label = format!(
                "{} ({})",
                date.format("%d.%m"),
                WEEKDAYS_RU[date.weekday().num_days_from_monday() as usize]
            );
            if open.contains(&date) {
                keyboard = keyboard.row(format!("📅 {}", label), format!("date:{}", date));
            } else {
                keyboard = keyboard.row(format!("❌ {}", label), "date:none");
            }
        }
        keyboard = keyboard.buttons_row(vec![
            InlineKeyboardButton::new("⬅️ Пред. неделя", format!("week:{}", monday - Duration::days(7))),
            InlineKeyboardButton::new("След. неделя ➡️", format!("week:{}", monday + Duration::days(7))),
        ]);
        keyboard = keyboard.row("☰ Главное меню", "menu:main");

        let caption = format!(
            "✮ Услуга: {}\n♢ Мастер: {}\n\nНеделя: {} - {}\nВыберите дату записи:",
            service.name,
            specialist.name,
            monday.format("%d.%m"),
            (monday + Duration::days(6)).format("%d.%m"),
        );

        state.step = Step::SelectingDate;
        state.pivot = Some(monday);
        self.sessions.set(chat_id, state).await;

        match &specialist.photo_url {
            Some(photo_url) => {
                self.gateway
                    .send_photo(chat_id, photo_url, &caption, Some(keyboard))
                    .await?
            }
            None => {
                self.gateway
                    .send_message(chat_id, &caption, Some(keyboard))
                    .await?
            }
        }
        Ok(())
    }

    async fn on_date_selected(&self, chat_id: i64, raw: &str) -> Result<(), BookingError> {
        let mut state = self.state(chat_id).await;
        if state.step != Step::SelectingDate {
            return Ok(());
        }
        let Some(date) = self.validators.calendar_date(raw) else {
            return Ok(());
        };
        let specialist_id = state
            .selections
            .specialist_id
            .ok_or_else(|| BookingError::NotFound("мастер не выбран".into()))?;
        let service_id = state
            .selections
            .service_id
            .ok_or_else(|| BookingError::NotFound("услуга не выбрана".into()))?;

        let options = self
            .availability
            .time_slots(specialist_id, service_id, date)
            .await?;
        if options.is_empty() {
            // no transition; the date may have emptied since the grid was drawn
            self.gateway
                .send_message(chat_id, "❌ Нет свободного времени на эту дату", None)
                .await?;
            return Ok(());
        }

        state.selections.date = Some(date);
        state.step = Step::SelectingTime;
        self.sessions.set(chat_id, state).await;

        let mut keyboard = InlineKeyboardMarkup::new();
        for option in &options {
            keyboard = keyboard.row(
                format!("⏰ {}", option.time.format("%H:%M")),
                format!("slot:{}", option.slot_id),
            );
        }
        keyboard = keyboard.row("☰ Главное меню", "menu:main");

        self.gateway
            .send_message(
                chat_id,
                &format!("Доступное время на {}:", date.format("%d.%m.%Y")),
                Some(keyboard),
            )
            .await?;
        Ok(())
    }

    async fn on_slot_selected(&self, chat_id: i64, slot_id: i64) -> Result<(), BookingError> {
        let mut state = self.state(chat_id).await;
        if state.step != Step::SelectingTime {
            return Ok(());
        }
        let specialist_id = state
            .selections
            .specialist_id
            .ok_or_else(|| BookingError::NotFound("мастер не выбран".into()))?;
        let service_id = state
            .selections
            .service_id
            .ok_or_else(|| BookingError::NotFound("услуга не выбрана".into()))?;
        let date = state
            .selections
            .date
            .ok_or_else(|| BookingError::NotFound("дата не выбрана".into()))?;

        let slots = self
            .availability
            .open_slots(specialist_id, service_id, date)
            .await?;
        let Some(slot) = slots.into_iter().find(|slot| slot.id == slot_id) else {
            self.gateway
                .send_message(chat_id, "❌ Это время уже занято, выберите другое", None)
                .await?;
            return Ok(());
        };

        state.selections.slot_id = Some(slot.id);
        state.selections.time = Some(slot.time);

        // Known client: skip the name/phone steps and claim right away.
        if let Some(contact) = self.directory.get(chat_id).await {
            return self.claim_and_confirm(chat_id, state, &contact).await;
        }

        let specialist = self.specialist_profile(specialist_id).await?;
        let service = self.service_profile(service_id).await?;

        state.step = Step::EnteringName;
        self.sessions.set(chat_id, state).await;

        self.gateway
            .send_message(
                chat_id,
                &format!(
                    "Вы выбрали:\n\n✮ {}\n♢ {}\n≣ {} {}\n\n✎ Введите ваше имя:",
                    service.name,
                    specialist.name,
                    date.format("%d.%m.%Y"),
                    slot.time.format("%H:%M"),
                ),
                None,
            )
            .await?;
        Ok(())
    }

    // --- text steps ------------------------------------------------------

    async fn on_name_entered(
        &self,
        chat_id: i64,
        mut state: ConversationState,
        text: &str,
    ) -> Result<(), BookingError> {
        let Some(name) = self.validators.client_name(text) else {
            // re-prompt at the same state
            self.gateway
                .send_message(chat_id, "❌ Имя не может быть пустым!", None)
                .await?;
            return Ok(());
        };

        state.selections.client_name = Some(name);
        state.step = Step::EnteringPhone;
        self.sessions.set(chat_id, state).await;

        self.gateway
            .send_message(
                chat_id,
                "📞 Теперь введите ваш телефон в формате +7XXXXXXXXXX:\n\nПример: +79255355278",
                None,
            )
            .await?;
        Ok(())
    }

    async fn on_phone_entered(
        &self,
        chat_id: i64,
        mut state: ConversationState,
        text: &str,
    ) -> Result<(), BookingError> {
        let phone = text.trim();
        if !self.validators.valid_phone(phone) {
            self.gateway
                .send_message(
                    chat_id,
                    "❌ Неверный формат телефона!\n\nПожалуйста, введите телефон в формате +7XXXXXXXXXX\nПример: +79255355278",
                    None,
                )
                .await?;
            return Ok(());
        }

        state.selections.client_phone = Some(phone.to_string());
        let contact = ClientContact {
            name: state
                .selections
                .client_name
                .clone()
                .ok_or_else(|| BookingError::NotFound("имя не указано".into()))?,
            phone: phone.to_string(),
        };
        self.claim_and_confirm(chat_id, state, &contact).await
    }

    // --- claim -----------------------------------------------------------

    /// Creates the appointment and claims the slot. On a remote failure the
    /// session is left untouched so the user can retry from the same step.
    async fn claim_and_confirm(
        &self,
        chat_id: i64,
        state: ConversationState,
        contact: &ClientContact,
    ) -> Result<(), BookingError> {
        let specialist_id = state
            .selections
            .specialist_id
            .ok_or_else(|| BookingError::NotFound("мастер не выбран".into()))?;
        let service_id = state
            .selections
            .service_id
            .ok_or_else(|| BookingError::NotFound("услуга не выбрана".into()))?;
        let date = state
            .selections
            .date
            .ok_or_else(|| BookingError::NotFound("дата не выбрана".into()))?;
        let slot_time = state
            .selections
            .time
            .ok_or_else(|| BookingError::NotFound("время не выбрано".into()))?;
        let slot_id = state
            .selections
            .slot_id
            .ok_or_else(|| BookingError::NotFound("слот не выбран".into()))?;

        // Names are fetched before the claim so a store hiccup here stays
        // retryable instead of surfacing after the appointment exists.
        let specialist = self.specialist_profile(specialist_id).await?;
        let service = self.service_profile(service_id).await?;

        let slot = ScheduleSlot {
            id: slot_id,
            specialist_id,
            service_id,
            date,
            time: slot_time,
            available: true,
        };

        match self.ledger.claim_slot(&slot, &contact.name, &contact.phone).await {
            Ok(appointment) => {
                self.directory
                    .record(chat_id, &contact.name, &contact.phone)
                    .await;
                self.sessions.clear(chat_id).await;
                info!(
                    "chat {} booked appointment {} for {} {}",
                    chat_id, appointment.id, date, slot_time
                );

                self.gateway
                    .send_message(
                        chat_id,
                        &format!(
                            "✅ Запись успешно создана!\n\n✮ Услуга: {}\n♢ Мастер: {}\n≣ Дата: {}\n⏰ Время: {}\n\n📌 Мы напомним вам о записи:\n• За день до визита (в 18:00)\n• За час до записи",
                            service.name,
                            specialist.name,
                            date.format("%d.%m.%Y"),
                            slot_time.format("%H:%M"),
                        ),
                        Some(entry_menu()),
                    )
                    .await?;
                Ok(())
            }
            Err(BookingError::SlotTaken) => {
                self.sessions.clear(chat_id).await;
                self.gateway
                    .send_message(
                        chat_id,
                        "❌ Это время уже заняли. Наберите /start, чтобы выбрать другое.",
                        None,
                    )
                    .await?;
                Ok(())
            }
            Err(other) => Err(other),
        }
    }

    // --- lookups ---------------------------------------------------------

    async fn specialist_profile(&self, specialist_id: i64) -> Result<Specialist, BookingError> {
        self.store
            .specialists_all()
            .await
            .map_err(BookingError::RemoteUnavailable)?
            .into_iter()
            .find(|specialist| specialist.id == specialist_id)
            .ok_or_else(|| BookingError::NotFound("мастер не найден".into()))
    }

    async fn service_profile(&self, service_id: i64) -> Result<Service, BookingError> {
        self.store
            .services_all()
            .await
            .map_err(BookingError::RemoteUnavailable)?
            .into_iter()
            .find(|service| service.id == service_id)
            .ok_or_else(|| BookingError::NotFound("услуга не найдена".into()))
    }

    async fn state(&self, chat_id: i64) -> ConversationState {
        self.sessions.get(chat_id).await.unwrap_or_default()
    }
}

fn entry_menu() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new()
        .row("Выбрать услугу", "book:service")
        .row("Выбрать мастера", "book:specialist")
}

fn format_service(service: &Service) -> String {
    match service.price {
        Some(price) => format!("{} - {}₽", service.name, price),
        None => service.name.clone(),
    }
}
