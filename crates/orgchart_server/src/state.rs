//! Shared handler state.

use crate::error::ApiError;
use orgchart_core::db::open_db;
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::Arc;

/// Per-process handler state: where the database lives.
///
/// Handlers receive this through `axum::extract::State`; there is no global
/// connection handle.
#[derive(Debug, Clone)]
pub struct AppState {
    db_path: Arc<PathBuf>,
}

impl AppState {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: Arc::new(db_path.into()),
        }
    }

    /// Runs `work` on the blocking pool with a fresh connection.
    ///
    /// The connection is closed when `work` returns.
    pub async fn with_connection<T, F>(&self, work: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, ApiError> + Send + 'static,
    {
        let db_path = Arc::clone(&self.db_path);
        tokio::task::spawn_blocking(move || {
            let conn = open_db(db_path.as_path())?;
            work(&conn)
        })
        .await?
    }
}
