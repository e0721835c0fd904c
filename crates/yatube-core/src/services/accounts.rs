//! Account lookup and password authentication.

use std::sync::Arc;

use crate::domain::{NewUser, User};
use crate::error::{DomainError, RepoError};
use crate::ports::{PasswordService, UserRepository};

/// Resolves session users and checks login credentials.
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    passwords: Arc<dyn PasswordService>,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserRepository>, passwords: Arc<dyn PasswordService>) -> Self {
        Self { users, passwords }
    }

    /// Check a username/password pair.
    ///
    /// Unknown users and wrong passwords both fail with `Unauthorized` so the
    /// caller cannot tell them apart.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, DomainError> {
        let Some(user) = self.users.find_by_username(username).await? else {
            tracing::info!(username, "Login attempt for unknown user");
            return Err(DomainError::Unauthorized);
        };

        let valid = self
            .passwords
            .verify(password, &user.password_hash)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        if !valid {
            tracing::info!(user_id = user.id, "Login attempt with wrong password");
            return Err(DomainError::Unauthorized);
        }

        Ok(user)
    }

    /// Load the user a session points at, if it still exists.
    pub async fn user(&self, user_id: i32) -> Result<Option<User>, DomainError> {
        Ok(self.users.find_by_id(user_id).await?)
    }

    /// Create an account with a freshly hashed password.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, DomainError> {
        let password_hash = self
            .passwords
            .hash(password)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        self.users
            .create(NewUser::new(
                username.to_string(),
                email.to_string(),
                password_hash,
            ))
            .await
            .map_err(|e| match e {
                RepoError::Constraint(_) => {
                    DomainError::Duplicate(format!("username {} is taken", username))
                }
                other => other.into(),
            })
    }
}
