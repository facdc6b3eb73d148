pub mod error;
pub mod gateway;
pub mod models;

pub use error::MessagingError;
pub use gateway::{MessagingGateway, TelegramGateway};
pub use models::{
    CallbackQuery, Chat, InlineKeyboardButton, InlineKeyboardMarkup, Message, Update, User,
};
