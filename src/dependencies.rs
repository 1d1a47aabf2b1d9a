//! Database and cache handles shared through the application state.
//! Used by: state, handlers.

use std::sync::Mutex;

use redis::aio::MultiplexedConnection;
use redis::Client;
use rusqlite::Connection;

use crate::error::{lock_err, Error, Result};

const SQLITE_SCHEME: &str = "sqlite://";

/// SQLite connection behind a mutex; callers borrow it for the length of a closure.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Accepts a plain path, `:memory:`, or a `sqlite://` URL.
    pub fn open(url: &str) -> Result<Self> {
        let path = url.strip_prefix(SQLITE_SCHEME).unwrap_or(url);
        if path.is_empty() {
            return Err(Error::Config("DATABASE_URL has no path".into()));
        }
        let conn = Connection::open(path)?;
        tracing::info!(path = %path, "database opened");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::open(":memory:")
    }

    pub fn with_connection<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self.conn.lock().map_err(lock_err("database"))?;
        f(&conn)
    }

    pub fn ping(&self) -> Result<()> {
        self.with_connection(|conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
            Ok(())
        })
    }
}

/// Redis client. Opening it only parses the URL; connections are made on demand.
pub struct Cache {
    client: Client,
}

impl Cache {
    pub fn open(url: &str) -> Result<Self> {
        let client = Client::open(url)?;
        tracing::info!(url = %sanitize_url(url), "cache client configured");
        Ok(Self { client })
    }

    pub async fn connection(&self) -> Result<MultiplexedConnection> {
        Ok(self.client.get_multiplexed_async_connection().await?)
    }

    pub async fn ping(&self) -> Result<()> {
        let mut conn = self.connection().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

/// Hides the password part of a connection URL for logging.
pub(crate) fn sanitize_url(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(mut parsed) => {
            if parsed.password().is_some() {
                let _ = parsed.set_password(Some("***"));
            }
            parsed.to_string()
        }
        Err(_) => "invalid_url".to_string(),
    }
}
