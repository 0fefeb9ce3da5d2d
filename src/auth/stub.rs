//! # Auth Stub
//!
//! Session emulator exposed next to the table engine. It accepts any
//! well-formed credentials; only seeded accounts check their password.
//!
//! | Input | Outcome |
//! |---|---|
//! | empty email or password | `MissingCredentials` |
//! | seeded email, right password | that account's user |
//! | seeded email, wrong password | `InvalidCredentials` (never a fresh user) |
//! | password below policy minimum | `WeakPassword` |
//! | anything else | fresh `user_<uuid>` |

use std::future::{ready, IntoFuture, Ready};
use std::sync::{RwLock, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::crypto::{hash_password, verify_password, PasswordPolicy};
use super::errors::{AuthError, AuthResult};
use super::user::{Session, User, DEFAULT_DISPLAY_NAME};
use crate::config::AuthConfig;
use crate::observability::Logger;

/// Email and password
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Sign-up request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub options: SignUpOptions,
}

/// Extra sign-up data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignUpOptions {
    /// Copied into `user_metadata`
    #[serde(default)]
    pub data: Map<String, Value>,
}

/// `data` of an auth envelope
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AuthData {
    pub user: Option<User>,
    pub session: Option<Session>,
}

/// `{ data: { user, session }, error }`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AuthResponse {
    pub data: AuthData,
    pub error: Option<AuthError>,
}

impl AuthResponse {
    fn signed_in(session: Session) -> Self {
        Self {
            data: AuthData {
                user: Some(session.user.clone()),
                session: Some(session),
            },
            error: None,
        }
    }

    fn failure(error: AuthError) -> Self {
        Self {
            data: AuthData::default(),
            error: Some(error),
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.data.user.as_ref()
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

impl IntoFuture for AuthResponse {
    type Output = AuthResponse;
    type IntoFuture = Ready<AuthResponse>;

    fn into_future(self) -> Self::IntoFuture {
        ready(self)
    }
}

/// `{ error }`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SignOutResponse {
    pub error: Option<AuthError>,
}

impl IntoFuture for SignOutResponse {
    type Output = SignOutResponse;
    type IntoFuture = Ready<SignOutResponse>;

    fn into_future(self) -> Self::IntoFuture {
        ready(self)
    }
}

/// A predefined account
#[derive(Debug)]
struct SeededAccount {
    user: User,
    password_hash: String,
}

/// Auth stub holding at most one session
#[derive(Debug)]
pub struct AuthStub {
    policy: PasswordPolicy,
    accounts: Vec<SeededAccount>,
    session: RwLock<Option<Session>>,
}

impl Default for AuthStub {
    fn default() -> Self {
        Self::new(&AuthConfig::default())
    }
}

impl AuthStub {
    /// Builds the stub, hashing every seeded password.
    ///
    /// An account whose password cannot be hashed is left out.
    pub fn new(config: &AuthConfig) -> Self {
        let mut accounts = Vec::with_capacity(config.accounts.len());
        for seed in &config.accounts {
            match hash_password(&seed.password) {
                Ok(password_hash) => {
                    let mut user = User::with_id(&seed.id, &seed.email);
                    if let Some(nome) = &seed.nome {
                        user = user.with_name(nome);
                    }
                    accounts.push(SeededAccount { user, password_hash });
                }
                Err(err) => Logger::error(
                    "AUTH_SEED_FAILED",
                    &[("account", &seed.id), ("code", err.code())],
                ),
            }
        }

        Self {
            policy: PasswordPolicy::new(config.min_password_length),
            accounts,
            session: RwLock::new(None),
        }
    }

    pub fn policy(&self) -> &PasswordPolicy {
        &self.policy
    }

    /// Signs in; see the module table for outcomes
    pub fn sign_in_with_password(&self, credentials: Credentials) -> AuthResponse {
        into_response(self.try_sign_in(&credentials))
    }

    /// Registers and signs in. A seeded email signs in instead.
    pub fn sign_up(&self, request: SignUpRequest) -> AuthResponse {
        into_response(self.try_sign_up(request))
    }

    /// The signed-in user, or null
    pub fn get_user(&self) -> AuthResponse {
        AuthResponse {
            data: AuthData {
                user: self.current().map(|s| s.user),
                session: None,
            },
            error: None,
        }
    }

    /// The current session, or null
    pub fn get_session(&self) -> AuthResponse {
        match self.current() {
            Some(session) => AuthResponse::signed_in(session),
            None => AuthResponse::default(),
        }
    }

    /// Ends the current session
    pub fn sign_out(&self) -> SignOutResponse {
        match self.write() {
            Ok(mut session) => {
                if let Some(ended) = session.take() {
                    Logger::info("AUTH_SIGN_OUT", &[("user", &ended.user.id)]);
                }
                SignOutResponse { error: None }
            }
            Err(err) => SignOutResponse { error: Some(err) },
        }
    }

    fn try_sign_in(&self, credentials: &Credentials) -> AuthResult<Session> {
        let email = credentials.email.trim();
        if email.is_empty() || credentials.password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let user = match self.find_account(email) {
            Some(account) => {
                if !verify_password(&credentials.password, &account.password_hash)? {
                    return Err(AuthError::InvalidCredentials);
                }
                account.user.clone()
            }
            None => {
                self.policy.validate(&credentials.password)?;
                User::generated(email)
            }
        };

        self.open(user)
    }

    fn try_sign_up(&self, request: SignUpRequest) -> AuthResult<Session> {
        let email = request.email.trim();
        if self.find_account(email).is_some() {
            return self.try_sign_in(&Credentials::new(email, request.password));
        }
        if email.is_empty() || request.password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }
        self.policy.validate(&request.password)?;

        let mut user = User::generated(email);
        user.user_metadata = request.options.data;
        if user.name().is_none() {
            user = user.with_name(DEFAULT_DISPLAY_NAME);
        }

        self.open(user)
    }

    fn find_account(&self, email: &str) -> Option<&SeededAccount> {
        self.accounts
            .iter()
            .find(|a| a.user.email.eq_ignore_ascii_case(email))
    }

    fn open(&self, user: User) -> AuthResult<Session> {
        let session = Session::open(user);
        *self.write()? = Some(session.clone());
        Logger::info(
            "AUTH_SIGN_IN",
            &[("email", &session.user.email), ("user", &session.user.id)],
        );
        Ok(session)
    }

    fn current(&self) -> Option<Session> {
        self.session.read().ok().and_then(|s| s.clone())
    }

    fn write(&self) -> AuthResult<RwLockWriteGuard<'_, Option<Session>>> {
        self.session
            .write()
            .map_err(|_| AuthError::StorageError("Session lock poisoned".to_string()))
    }
}

fn into_response(result: AuthResult<Session>) -> AuthResponse {
    match result {
        Ok(session) => AuthResponse::signed_in(session),
        Err(err) => AuthResponse::failure(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stub() -> AuthStub {
        AuthStub::default()
    }

    #[test]
    fn test_missing_credentials() {
        let response = stub().sign_in_with_password(Credentials::new("", "123456"));
        assert_eq!(response.error, Some(AuthError::MissingCredentials));
        assert!(response.user().is_none());
    }

    #[test]
    fn test_seeded_account() {
        let auth = stub();

        let response = auth.sign_in_with_password(Credentials::new("aluno@demo.local", "123456"));
        assert_eq!(response.user().unwrap().id, "user_aluno_demo");
        assert_eq!(response.user().unwrap().name(), Some("Aluno Demo"));

        let response = auth.sign_in_with_password(Credentials::new("Aluno@Demo.local", "wrong1"));
        assert_eq!(response.error, Some(AuthError::InvalidCredentials));
    }

    #[test]
    fn test_unknown_email_gets_fresh_user() {
        let auth = stub();

        let response = auth.sign_in_with_password(Credentials::new("novo@x.com", "abc"));
        assert!(matches!(response.error, Some(AuthError::WeakPassword(_))));

        let response = auth.sign_in_with_password(Credentials::new("novo@x.com", "abcdef"));
        let user = response.user().unwrap();
        assert!(user.id.starts_with("user_"));
        assert_eq!(user.email, "novo@x.com");
    }

    #[test]
    fn test_sign_up_default_name() {
        let auth = stub();

        let response = auth.sign_up(SignUpRequest {
            email: "a@x.com".into(),
            password: "abcdef".into(),
            options: SignUpOptions::default(),
        });
        assert_eq!(response.user().unwrap().name(), Some(DEFAULT_DISPLAY_NAME));

        let mut data = Map::new();
        data.insert("nome".into(), json!("Bia"));
        let response = auth.sign_up(SignUpRequest {
            email: "b@x.com".into(),
            password: "abcdef".into(),
            options: SignUpOptions { data },
        });
        assert_eq!(response.user().unwrap().name(), Some("Bia"));
    }

    #[test]
    fn test_session_lifecycle() {
        let auth = stub();
        assert!(auth.get_user().user().is_none());

        auth.sign_in_with_password(Credentials::new("x@x.com", "abcdef"));
        assert_eq!(auth.get_user().user().unwrap().email, "x@x.com");
        assert!(auth.get_session().data.session.is_some());

        assert!(auth.sign_out().error.is_none());
        assert!(auth.get_user().user().is_none());
        assert!(auth.get_user().is_ok());
    }

    #[test]
    fn test_failed_sign_in_keeps_session() {
        let auth = stub();
        auth.sign_in_with_password(Credentials::new("x@x.com", "abcdef"));
        auth.sign_in_with_password(Credentials::new("", ""));
        assert_eq!(auth.get_user().user().unwrap().email, "x@x.com");
    }
}
