//! Write path: insert, update, delete and upsert over the table store.

mod payload;
mod upsert;
mod verbs;

pub use payload::Payload;
pub use upsert::{upsert, UpsertOptions, UpsertResponse};
pub use verbs::{delete, delete_where, insert, update, update_by};
