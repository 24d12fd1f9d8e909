//! Rolodex authentication core
//!
//! - [`credentials`]: registration and password verification against salted
//!   Argon2id hashes
//! - [`token`]: signed, expiring bearer tokens carrying the username
//! - [`password`]: the hashing primitives both of the above build on
//!
//! Nothing here knows about HTTP. Failures are returned as error kinds and
//! the transport decides how much of them to reveal.

pub mod credentials;
pub mod password;
pub mod token;

pub use credentials::{validate_username, CredentialError, CredentialStore};
pub use password::{
    hash_password_with_config, validate_password_input, verify_password, PasswordConfig,
    PasswordError,
};
pub use token::{
    AuthenticatedIdentity, Claims, SignedToken, TokenConfig, TokenError, TokenService,
};
