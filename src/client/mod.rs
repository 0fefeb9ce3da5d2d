//! Client
//!
//! The facade application code talks to: `from(table)` for data,
//! `auth()` for the session stub.
//!
//! ```ignore
//! let client = Client::offline();
//! let provas = client.from("provas").select("*").order("ano", OrderOptions::desc()).await;
//! ```

mod table;

use std::sync::{Arc, OnceLock};

use crate::auth::AuthStub;
use crate::config::{AuthConfig, ClientConfig, ConfigResult};
use crate::core::Engine;
use crate::fault::FaultInjector;
use crate::observability::MetricsRegistry;
use crate::store::TableStore;

pub use table::TableHandle;

/// Engine plus auth stub
#[derive(Debug)]
pub struct Client {
    engine: Engine,
    auth_config: AuthConfig,
    /// Built on first use; seeding hashes every account password
    auth: OnceLock<AuthStub>,
}

impl Client {
    /// Builds a client from configuration.
    ///
    /// Fault rules are read from `MOCKBASE_FAULT`.
    pub fn new(config: ClientConfig) -> ConfigResult<Self> {
        config.validate()?;
        let store = Arc::new(TableStore::from_config(&config)?);
        let engine = Engine::new(store)
            .with_strict(config.strict)
            .with_faults(Arc::new(FaultInjector::from_env()));

        Ok(Self::from_engine(engine, config.auth))
    }

    /// Built-in fixtures, default settings, no fault rules
    pub fn offline() -> Self {
        let store = TableStore::from_config(&ClientConfig::default())
            .unwrap_or_else(|_| TableStore::new());
        Self::with_store(Arc::new(store))
    }

    /// Shares an existing store; default settings otherwise
    pub fn with_store(store: Arc<TableStore>) -> Self {
        Self::from_engine(Engine::new(store), AuthConfig::default())
    }

    /// Toggles strict mode
    pub fn strict(mut self, strict: bool) -> Self {
        self.engine = self.engine.with_strict(strict);
        self
    }

    fn from_engine(engine: Engine, auth_config: AuthConfig) -> Self {
        Self {
            engine,
            auth_config,
            auth: OnceLock::new(),
        }
    }

    /// Handle on a table, created on first reference
    pub fn from(&self, table: &str) -> TableHandle<'_> {
        TableHandle::new(&self.engine, table)
    }

    pub fn auth(&self) -> &AuthStub {
        self.auth.get_or_init(|| AuthStub::new(&self.auth_config))
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn store(&self) -> Arc<TableStore> {
        self.engine.shared_store()
    }

    pub fn faults(&self) -> &FaultInjector {
        self.engine.faults()
    }

    pub fn metrics(&self) -> &MetricsRegistry {
        self.engine.metrics()
    }

    pub fn is_strict(&self) -> bool {
        self.engine.is_strict()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_offline_client_has_fixtures() {
        let client = Client::offline();
        let provas = client.from("provas").select("*").collect();
        assert_eq!(provas.len(), 5);
        assert_eq!(client.from("provas").select_all().collect(), provas);
    }

    #[test]
    fn test_handles_share_rows() {
        let client = Client::with_store(Arc::new(TableStore::new()));
        client.from("items").insert(json!({"id": 1}));

        assert_eq!(client.from("items").select("*").collect().len(), 1);
    }

    #[test]
    fn test_clients_share_a_store() {
        let store = Arc::new(TableStore::new());
        let a = Client::with_store(Arc::clone(&store));
        let b = Client::with_store(store);

        a.from("items").insert(json!({"id": 1}));
        assert_eq!(b.from("items").select("*").collect().len(), 1);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = ClientConfig::empty();
        config.auth.min_password_length = 0;
        assert!(Client::new(config).is_err());
    }
}
