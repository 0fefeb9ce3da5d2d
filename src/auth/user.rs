//! # Users and Sessions
//!
//! Shapes returned by the auth stub, serialized the way the remote
//! client exposes them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use uuid::Uuid;

use super::crypto::generate_token;

/// Display name given to users who sign up without one
pub const DEFAULT_DISPLAY_NAME: &str = "Usuário";

/// Signed-in user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,

    pub email: String,

    /// Free-form profile fields (`nome`, ...)
    #[serde(default)]
    pub user_metadata: Map<String, Value>,

    pub created_at: DateTime<Utc>,
}

impl User {
    /// A user with a generated `user_<uuid>` id
    pub fn generated(email: impl Into<String>) -> Self {
        Self::with_id(format!("user_{}", Uuid::new_v4()), email)
    }

    pub fn with_id(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            user_metadata: Map::new(),
            created_at: Utc::now(),
        }
    }

    /// Sets `user_metadata.nome`
    pub fn with_name(mut self, nome: impl Into<String>) -> Self {
        self.user_metadata.insert("nome".to_string(), json!(nome.into()));
        self
    }

    /// `user_metadata.nome`, if set
    pub fn name(&self) -> Option<&str> {
        self.user_metadata.get("nome").and_then(Value::as_str)
    }
}

/// Active session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub user: User,
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Opens a session for `user` with a fresh token
    pub fn open(user: User) -> Self {
        Self {
            access_token: generate_token(),
            user,
            created_at: Utc::now(),
        }
    }
}
