pub mod scheduler;

pub use scheduler::{MAX_EASE_FACTOR, MIN_EASE_FACTOR, SchedulerPolicy, compute_next};
