use serde::{Deserialize, Serialize};

/// Inline keyboard in Bot API `reply_markup` shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub callback_data: String,
}

impl InlineKeyboardMarkup {
    pub fn new() -> Self {
        Self {
            inline_keyboard: Vec::new(),
        }
    }

    /// One full-width button per row, the layout every menu here uses.
    pub fn row(mut self, text: impl Into<String>, callback_data: impl Into<String>) -> Self {
        self.inline_keyboard.push(vec![InlineKeyboardButton {
            text: text.into(),
            callback_data: callback_data.into(),
        }]);
        self
    }

    pub fn buttons_row(mut self, buttons: Vec<InlineKeyboardButton>) -> Self {
        self.inline_keyboard.push(buttons);
        self
    }
}

impl Default for InlineKeyboardMarkup {
    fn default() -> Self {
        Self::new()
    }
}

impl InlineKeyboardButton {
    pub fn new(text: impl Into<String>, callback_data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            callback_data: callback_data.into(),
        }
    }
}

/// Inbound webhook update, reduced to the fields the conversation engine
/// consumes.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    #[serde(default)]
    pub data: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_parses_callback_query() {
        let raw = r#"{
            "update_id": 9000,
            "callback_query": {
                "id": "cb-1",
                "from": { "id": 100500 },
                "data": "svc:3"
            }
        }"#;
        let update: Update = serde_json::from_str(raw).unwrap();
        let callback = update.callback_query.unwrap();
        assert_eq!(callback.from.id, 100500);
        assert_eq!(callback.data.as_deref(), Some("svc:3"));
    }

    #[test]
    fn keyboard_serializes_to_reply_markup_shape() {
        let keyboard = InlineKeyboardMarkup::new()
            .row("Выбрать услугу", "book:service")
            .row("Выбрать мастера", "book:specialist");

        let value = serde_json::to_value(&keyboard).unwrap();
        assert_eq!(value["inline_keyboard"][0][0]["callback_data"], "book:service");
        assert_eq!(value["inline_keyboard"][1][0]["text"], "Выбрать мастера");
    }
}
