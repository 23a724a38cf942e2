//! `coursehub-auth`: authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: user lookup
//! and secret verification are consumed through traits.

pub mod authorize;
pub mod credentials;
pub mod password;
pub mod principal;
pub mod user;
pub mod verifier;

pub use authorize::{authorize, AuthzError, NOT_OWNER_MESSAGE};
pub use credentials::{AuthError, BasicCredentials};
pub use password::{
    hash_blocking, verify_blocking, BcryptHasher, HashError, PasswordHash, SecretHasher,
    SecretVerifier,
};
pub use principal::Principal;
pub use user::{AccountDraft, NewAccount, PasswordInput};
pub use verifier::{CredentialVerifier, LookupError, UserLookup};
