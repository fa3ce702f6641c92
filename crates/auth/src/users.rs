//! User Directory

use crate::{hash_password, verify_password, AuthError};
use serde::Deserialize;
use std::sync::Arc;
use storage::{UserRecord, UserStore};
use tracing::info;

/// Registration input, password still in the clear.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub password: String,
}

/// Account operations over the injected user store.
pub struct UserDirectory {
    users: Arc<dyn UserStore>,
}

impl UserDirectory {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Create an account. The username must be free; the store enforces
    /// uniqueness so a duplicate registration cannot shadow an existing
    /// account's credentials.
    pub fn register(&self, new_user: NewUser) -> Result<(), AuthError> {
        let record = UserRecord {
            username: new_user.username,
            email: new_user.email,
            full_name: new_user.full_name,
            hashed_password: hash_password(&new_user.password),
            disabled: false,
        };
        self.users.insert(record.clone())?;
        info!(username = %record.username, "User registered");
        Ok(())
    }

    /// Check credentials. Unknown usernames and wrong passwords are
    /// indistinguishable to the caller.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<UserRecord, AuthError> {
        let user = self
            .users
            .get(username)?
            .ok_or(AuthError::InvalidCredentials)?;
        if !verify_password(password, &user.hashed_password) {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(user)
    }

    /// Resolve a token subject back to its account. Done on every
    /// authenticated request; a deleted account invalidates outstanding
    /// tokens implicitly.
    pub fn lookup(&self, username: &str) -> Result<UserRecord, AuthError> {
        self.users.get(username)?.ok_or(AuthError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::MemoryStore;

    fn directory() -> UserDirectory {
        UserDirectory::new(Arc::new(MemoryStore::new()))
    }

    fn alice() -> NewUser {
        NewUser {
            username: "alice".to_string(),
            email: Some("alice@example.com".to_string()),
            full_name: None,
            password: "hunter2".to_string(),
        }
    }

    #[test]
    fn test_register_and_authenticate() {
        let directory = directory();
        directory.register(alice()).unwrap();

        let user = directory.authenticate("alice", "hunter2").unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.email.as_deref(), Some("alice@example.com"));
        assert!(!user.disabled);
    }

    #[test]
    fn test_wrong_password_rejected() {
        let directory = directory();
        directory.register(alice()).unwrap();

        assert!(matches!(
            directory.authenticate("alice", "wrong"),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            directory.authenticate("nobody", "hunter2"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let directory = directory();
        directory.register(alice()).unwrap();

        let mut again = alice();
        again.password = "different".to_string();
        assert!(matches!(
            directory.register(again),
            Err(AuthError::UsernameTaken)
        ));

        // Original credentials still work
        assert!(directory.authenticate("alice", "hunter2").is_ok());
    }

    #[test]
    fn test_lookup_unknown_user() {
        let directory = directory();
        assert!(matches!(
            directory.lookup("ghost"),
            Err(AuthError::InvalidToken)
        ));
    }
}
