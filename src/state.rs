//! Application state shared across handlers.

use crate::db::DbPool;
use crate::srs::SchedulerPolicy;

#[derive(Clone)]
pub struct AppState {
    /// Shared database connection (users, catalog, decks, schedule state)
    pub db: DbPool,

    /// Scheduling constants, resolved once at startup
    pub policy: SchedulerPolicy,
}

impl AppState {
    pub fn new(db: DbPool, policy: SchedulerPolicy) -> Self {
        Self { db, policy }
    }
}
