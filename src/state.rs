//! Shared application state.

use std::sync::Arc;

use crate::config::Settings;
use crate::dependencies::{Cache, Database};
use crate::error::Result;
use crate::security::CredentialService;
use crate::telemetry::Metrics;

pub struct AppStateInner {
    pub settings: Settings,
    pub credentials: CredentialService,
    pub database: Database,
    pub cache: Cache,
    pub metrics: Metrics,
}

pub type AppState = Arc<AppStateInner>;

struct StateBuilder {
    settings: Settings,
    database: Database,
}

impl StateBuilder {
    fn build(self) -> Result<AppState> {
        let credentials = CredentialService::new(&self.settings)?;
        let cache = Cache::open(&self.settings.redis_url)?;

        if self.settings.debug {
            tracing::warn!("debug mode enabled");
        }

        Ok(Arc::new(AppStateInner {
            settings: self.settings,
            credentials,
            database: self.database,
            cache,
            metrics: Metrics::new(),
        }))
    }
}

pub fn build_state(settings: Settings) -> Result<AppState> {
    let database = Database::open(&settings.database_url)?;
    StateBuilder { settings, database }.build()
}

#[cfg(test)]
pub fn test_settings() -> Settings {
    Settings::from_lookup(|key| match key {
        "DATABASE_URL" => Some(":memory:".into()),
        "REDIS_URL" => Some("redis://127.0.0.1:1/0".into()),
        "SECRET_KEY" => Some("test-secret".into()),
        "PASSWORD_HASH_MEMORY_KIB" => Some("256".into()),
        "PASSWORD_HASH_ITERATIONS" => Some("1".into()),
        _ => None,
    })
    .expect("test settings are complete")
}

#[cfg(test)]
pub fn build_test_state() -> Result<AppState> {
    StateBuilder {
        settings: test_settings(),
        database: Database::open_in_memory()?,
    }
    .build()
}
