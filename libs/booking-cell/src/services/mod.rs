pub mod engine;
pub mod ledger;

pub use engine::BookingConversationService;
pub use ledger::SlotLedgerService;
