pub mod handlers;
pub mod payloads;
pub mod routes;

use diesel::SqliteConnection;

use crate::database::DbPool;
use crate::error::Result;

pub use routes::create_router;

#[derive(Clone)]
pub struct AppState {
    pool: DbPool,
}

impl AppState {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Runs `f` on a pooled connection on the blocking thread pool. The
    /// connection goes back to the pool when `f` returns.
    pub async fn with_connection<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();

        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get()?;
            f(&mut *connection)
        })
        .await?
    }

    /// Like [`AppState::with_connection`], inside a `BEGIN IMMEDIATE`
    /// transaction that rolls back when `f` fails.
    pub async fn in_transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        self.with_connection(move |connection| connection.immediate_transaction(f))
            .await
    }
}
