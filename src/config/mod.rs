//! Client configuration
//!
//! Loaded from a JSON file. Every field is optional; an empty object
//! yields the same configuration as `ClientConfig::default()`.
//!
//! ```json
//! {
//!   "table_keys": { "imagens": "id_imagem" },
//!   "builtin_fixtures": true,
//!   "fixtures_dir": "./fixtures",
//!   "strict": false,
//!   "auth": { "min_password_length": 6 }
//! }
//! ```

mod errors;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use errors::{ConfigError, ConfigResult};

/// Configuration for a `Client` and its table store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Identifying column per table, used by `update` (default `id`)
    #[serde(default)]
    pub table_keys: HashMap<String, String>,

    /// Seed the built-in exam fixtures (default true)
    #[serde(default = "default_builtin_fixtures")]
    pub builtin_fixtures: bool,

    /// Directory of `<table>.json` fixture files
    #[serde(default)]
    pub fixtures_dir: Option<PathBuf>,

    /// Report the extended error taxonomy instead of degrading silently
    #[serde(default)]
    pub strict: bool,

    /// Auth stub settings
    #[serde(default)]
    pub auth: AuthConfig,
}

/// Auth stub configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Minimum accepted password length (default 6)
    #[serde(default = "default_min_password_length")]
    pub min_password_length: usize,

    /// Accounts that sign in with their own identity
    #[serde(default = "default_accounts")]
    pub accounts: Vec<SeedAccount>,
}

/// A predefined account known to the auth stub
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedAccount {
    pub id: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub nome: Option<String>,
}

fn default_builtin_fixtures() -> bool {
    true
}

fn default_min_password_length() -> usize {
    6
}

fn default_accounts() -> Vec<SeedAccount> {
    vec![SeedAccount {
        id: "user_aluno_demo".to_string(),
        email: "aluno@demo.local".to_string(),
        password: "123456".to_string(),
        nome: Some("Aluno Demo".to_string()),
    }]
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            table_keys: HashMap::new(),
            builtin_fixtures: default_builtin_fixtures(),
            fixtures_dir: None,
            strict: false,
            auth: AuthConfig::default(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            min_password_length: default_min_password_length(),
            accounts: default_accounts(),
        }
    }
}

impl ClientConfig {
    /// Configuration with no fixtures at all
    pub fn empty() -> Self {
        Self {
            builtin_fixtures: false,
            ..Self::default()
        }
    }

    /// Load configuration from file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::read(path.display().to_string(), e))?;

        let config: ClientConfig = serde_json::from_str(&content)
            .map_err(|e| ConfigError::parse(path.display().to_string(), e))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.auth.min_password_length == 0 {
            return Err(ConfigError::invalid("auth.min_password_length must be > 0"));
        }

        for (table, key) in &self.table_keys {
            if table.trim().is_empty() || key.trim().is_empty() {
                return Err(ConfigError::invalid(
                    "table_keys entries must name both a table and a column",
                ));
            }
        }

        for account in &self.auth.accounts {
            if account.email.is_empty() || account.password.is_empty() {
                return Err(ConfigError::invalid(format!(
                    "Seed account '{}' needs an email and a password",
                    account.id
                )));
            }
        }

        Ok(())
    }

    /// Enable strict mode
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Set the identifying column of a table
    pub fn with_table_key(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.table_keys.insert(table.into(), column.into());
        self
    }
}
