use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Wire types for the Booking Store API. All rows travel in camelCase JSON;
/// availability flags cross the wire as 0/1, times as "HH:MM" and creation
/// timestamps as "YYYY-MM-DD HH:MM:SS" in store-local (Moscow) wall clock.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Specialist {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub chat_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub price: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSlot {
    pub id: i64,
    pub specialist_id: i64,
    pub service_id: i64,
    pub date: NaiveDate,
    #[serde(with = "wire_time")]
    pub time: NaiveTime,
    #[serde(with = "int_bool")]
    pub available: bool,
}

impl ScheduleSlot {
    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }
}

/// Payload for `POST /schedule`. Slots are always born available.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSlot {
    pub specialist_id: i64,
    pub service_id: i64,
    pub date: NaiveDate,
    #[serde(with = "wire_time")]
    pub time: NaiveTime,
    #[serde(with = "int_bool")]
    pub available: bool,
}

/// Payload for `POST /appointment`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAppointment {
    pub specialist_id: i64,
    pub service_id: i64,
    pub date: NaiveDate,
    #[serde(with = "wire_time")]
    pub time: NaiveTime,
    pub client_name: String,
    pub client_phone: String,
}

/// Appointment row as the store returns it. List endpoints join in the
/// client/service/specialist names and chat ids; the create response omits
/// them, hence the optionals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: i64,
    pub specialist_id: i64,
    pub service_id: i64,
    pub date: NaiveDate,
    #[serde(with = "wire_time")]
    pub time: NaiveTime,
    #[serde(default)]
    pub price: Option<i64>,
    pub client_name: String,
    pub client_phone: String,
    #[serde(default)]
    pub client_chat_id: Option<i64>,
    #[serde(default)]
    pub specialist_chat_id: Option<i64>,
    #[serde(default)]
    pub service_name: Option<String>,
    #[serde(default)]
    pub specialist_name: Option<String>,
    #[serde(default, with = "wire_datetime_opt")]
    pub created_at: Option<NaiveDateTime>,
}

impl Appointment {
    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }
}

/// Reminder kinds tracked by the notification dedup store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotificationKind {
    #[serde(rename = "immediate")]
    Immediate,
    #[serde(rename = "masternew")]
    MasterNew,
    #[serde(rename = "daily")]
    Daily,
    #[serde(rename = "hourly")]
    Hourly,
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            NotificationKind::Immediate => write!(f, "immediate"),
            NotificationKind::MasterNew => write!(f, "masternew"),
            NotificationKind::Daily => write!(f, "daily"),
            NotificationKind::Hourly => write!(f, "hourly"),
        }
    }
}

pub mod int_bool {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        Ok(u8::deserialize(deserializer)? != 0)
    }
}

pub mod wire_time {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M:%S"))
            .map_err(serde::de::Error::custom)
    }
}

pub mod wire_datetime_opt {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(dt) => serializer.serialize_str(&dt.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDateTime>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => NaiveDateTime::parse_from_str(&raw, FORMAT)
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}
