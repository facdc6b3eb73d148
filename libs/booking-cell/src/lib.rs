pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod session;
pub mod services;
pub mod validators;

pub use error::BookingError;
pub use models::{ConversationState, Selections, Step};
pub use services::engine::BookingConversationService;
pub use services::ledger::SlotLedgerService;
pub use session::{ClientContact, ClientDirectory, InMemorySessionStore, SessionStore};
pub use validators::Validators;
