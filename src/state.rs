use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rusqlite::Connection;

use crate::config::AppConfig;

pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(conn: Connection, config: AppConfig) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
            config,
        }
    }

    /// Locks the shared connection, recovering it if a previous holder
    /// panicked. Every workflow writes through a rusqlite `Transaction`,
    /// which rolls back when dropped during unwinding, so the connection
    /// is never left mid-write.
    pub fn conn(&self) -> MutexGuard<'_, Connection> {
        self.db.lock().unwrap_or_else(|poisoned: PoisonError<_>| {
            tracing::warn!("database connection lock was poisoned, recovering");
            self.db.clear_poison();
            poisoned.into_inner()
        })
    }
}
