use chrono::{NaiveDate, NaiveTime, Timelike};
use regex::Regex;

/// Input validation for the booking dialog and the admin slot path. Patterns
/// are compiled once at construction.
pub struct Validators {
    phone: Regex,
    admin_time: Regex,
}

impl Validators {
    pub fn new() -> Self {
        Self {
            phone: Regex::new(r"^\+7\d{10}$").expect("phone pattern is valid"),
            admin_time: Regex::new(r"^([0-1]?[0-9]|2[0-3]):([0-5][0-9])$")
                .expect("time pattern is valid"),
        }
    }

    pub fn valid_phone(&self, raw: &str) -> bool {
        self.phone.is_match(raw)
    }

    /// Trimmed, non-empty client name.
    pub fn client_name(&self, raw: &str) -> Option<String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    /// Admin-entered slot time: HH:MM with minutes on a 5-minute grid.
    pub fn admin_time(&self, raw: &str) -> Option<NaiveTime> {
        if !self.admin_time.is_match(raw) {
            return None;
        }
        let time = NaiveTime::parse_from_str(raw, "%H:%M").ok()?;
        if time.minute() % 5 != 0 {
            return None;
        }
        Some(time)
    }

    pub fn calendar_date(&self, raw: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
    }
}

impl Default for Validators {
    fn default() -> Self {
        Self::new()
    }
}
