//! Auth Subsystem
//!
//! Username/password accounts with PBKDF2 password storage and stateless
//! HS256 bearer tokens. Every authenticated request re-resolves the token
//! subject against the user store; there is no session cache and no
//! revocation list.

mod password;
mod token;
mod users;

pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenSigner};
pub use users::{NewUser, UserDirectory};

use storage::StorageError;
use thiserror::Error;

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Incorrect username or password")]
    InvalidCredentials,

    #[error("Username already registered")]
    UsernameTaken,

    #[error("Could not validate credentials")]
    InvalidToken,

    #[error(transparent)]
    Storage(StorageError),
}

impl From<StorageError> for AuthError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Duplicate(_) => AuthError::UsernameTaken,
            other => AuthError::Storage(other),
        }
    }
}
