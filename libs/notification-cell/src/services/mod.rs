pub mod dedup;
pub mod jobs;
pub mod scheduler;

pub use dedup::NotificationDedupService;
pub use jobs::{JobReport, NotificationJobs};
pub use scheduler::NotificationScheduler;
