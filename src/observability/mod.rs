//! Observability subsystem for mockbase
//!
//! - Structured logging (JSON lines)
//! - Operation counters
//!
//! Observability is read-only: nothing here changes what an operation
//! returns.
//!
//! ```ignore
//! use mockbase::observability::Logger;
//!
//! Logger::info("FIXTURES_LOADED", &[("tables", "4")]);
//! ```

mod logger;
mod metrics;

pub use logger::{Logger, Severity, LOG_ENV};
pub use metrics::{MetricsRegistry, MetricsSnapshot};
