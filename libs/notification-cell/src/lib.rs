pub mod error;
pub mod services;

pub use error::NotificationError;
pub use services::dedup::NotificationDedupService;
pub use services::jobs::{JobReport, NotificationJobs};
pub use services::scheduler::NotificationScheduler;
