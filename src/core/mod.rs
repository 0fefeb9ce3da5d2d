//! # mockbase Core Module
//!
//! Shared abstractions for every engine call: the engine context,
//! the operation kinds and the error type carried by result envelopes.

pub mod context;
pub mod error;
pub mod operation;

pub use context::Engine;
pub use error::{EngineError, EngineResult};
pub use operation::OperationKind;
