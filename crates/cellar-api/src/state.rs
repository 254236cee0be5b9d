use std::sync::{Arc, Mutex, PoisonError};

use rusqlite::Connection;

use cellar_core::config::Config;

/// Shared application state: one SQLite connection behind a mutex plus the
/// loaded configuration.
///
/// Queries run synchronously while the lock is held and the guard never
/// crosses an await point; with a single local writer this is cheaper than a
/// pool.
pub struct AppState {
    db: Mutex<Connection>,
    pub config: Config,
}

impl AppState {
    #[must_use]
    pub fn new(conn: Connection, config: Config) -> Arc<Self> {
        Arc::new(Self {
            db: Mutex::new(conn),
            config,
        })
    }

    /// Run a closure against the database connection.
    pub fn with_db<T>(&self, f: impl FnOnce(&Connection) -> T) -> T {
        let guard = self.db.lock().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }
}
