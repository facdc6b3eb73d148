use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Where a user currently stands in the booking dialog. A confirmed booking
/// has no step: the session is destroyed on completion, so the terminal
/// state is the absence of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Idle,
    SelectingService,
    SelectingSpecialist,
    SelectingDate,
    SelectingTime,
    EnteringName,
    EnteringPhone,
}

/// What the user has picked so far. Filled in as the dialog advances; both
/// entry orders (service first or specialist first) converge once both ids
/// are present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Selections {
    pub service_id: Option<i64>,
    pub specialist_id: Option<i64>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub slot_id: Option<i64>,
    pub client_name: Option<String>,
    pub client_phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    pub step: Step,
    pub selections: Selections,
    /// Pivot for week navigation on the date grid.
    pub pivot: Option<NaiveDate>,
}

impl ConversationState {
    pub fn idle() -> Self {
        Self {
            step: Step::Idle,
            selections: Selections::default(),
            pivot: None,
        }
    }
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::idle()
    }
}
