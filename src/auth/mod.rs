//! # Auth Stub
//!
//! A session emulator shipped next to the table engine. It holds one
//! session at a time and never talks to a network.

pub mod crypto;
pub mod errors;
mod stub;
pub mod user;

pub use crypto::PasswordPolicy;
pub use errors::{AuthError, AuthResult};
pub use stub::{
    AuthData, AuthResponse, AuthStub, Credentials, SignOutResponse, SignUpOptions, SignUpRequest,
};
pub use user::{Session, User, DEFAULT_DISPLAY_NAME};
