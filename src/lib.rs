//! mockbase - an in-memory stand-in for a hosted table backend
//!
//! Tables are named, ordered sequences of JSON rows, seeded from fixture
//! files and mutated in place. Reads go through a fluent builder that
//! resolves to a `{ data, error }` envelope:
//!
//! ```ignore
//! use mockbase::{Client, OrderOptions};
//!
//! let client = Client::offline();
//! let questoes = client
//!     .from("questoes")
//!     .select("*")
//!     .eq("id_prova", 1)
//!     .order("nr_questao", OrderOptions::asc())
//!     .await;
//! ```

pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod core;
pub mod fault;
pub mod mutation;
pub mod observability;
pub mod query;
pub mod store;

pub use crate::auth::{AuthError, AuthResponse, AuthStub, Credentials, Session, SignUpRequest, User};
pub use crate::client::{Client, TableHandle};
pub use crate::config::{ClientConfig, ConfigError};
pub use crate::core::{Engine, EngineError, EngineResult, OperationKind};
pub use crate::fault::{FaultInjector, FaultRule};
pub use crate::mutation::{Payload, UpsertOptions, UpsertResponse};
pub use crate::query::{Data, FilterExpr, FilterOperator, OrderOptions, QueryBuilder, QueryParams, Response};
pub use crate::store::{FixtureSet, Row, TableStore};
