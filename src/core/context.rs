//! Engine Context
//!
//! Shared state behind every table handle: the store, the fault
//! injector, the counters and the strict-mode flag.

use std::sync::Arc;

use crate::fault::FaultInjector;
use crate::observability::{Logger, MetricsRegistry};
use crate::store::TableStore;

use super::error::EngineResult;
use super::operation::OperationKind;

/// Context carried by every table handle and query builder
#[derive(Debug, Clone)]
pub struct Engine {
    store: Arc<TableStore>,
    faults: Arc<FaultInjector>,
    metrics: Arc<MetricsRegistry>,
    strict: bool,
}

impl Engine {
    /// Create an engine over the given store with no fault rules
    pub fn new(store: Arc<TableStore>) -> Self {
        Self {
            store,
            faults: Arc::new(FaultInjector::new()),
            metrics: Arc::new(MetricsRegistry::new()),
            strict: false,
        }
    }

    /// Enable or disable strict mode
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Replace the fault injector
    pub fn with_faults(mut self, faults: Arc<FaultInjector>) -> Self {
        self.faults = faults;
        self
    }

    pub fn store(&self) -> &TableStore {
        &self.store
    }

    pub fn shared_store(&self) -> Arc<TableStore> {
        Arc::clone(&self.store)
    }

    pub fn faults(&self) -> &FaultInjector {
        &self.faults
    }

    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Fails the operation if a fault rule matches it
    pub fn guard(&self, table: &str, operation: OperationKind) -> EngineResult<()> {
        match self.faults.check(table, operation) {
            Some(err) => {
                self.metrics.increment_faults_injected();
                Logger::warn(
                    "FAULT_INJECTED",
                    &[("operation", operation.name()), ("table", table)],
                );
                Err(err)
            }
            None => Ok(()),
        }
    }
}
