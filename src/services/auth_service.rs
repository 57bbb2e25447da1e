//! Domain service for accounts: registration, credential checks and
//! resolving the user behind a session.
//!
//! The web layer only talks to the [`AuthService`] trait object held in
//! application state, so tests can swap the implementation.

use thiserror::Error;

use crate::forms::{FormErrors, RegistrationForm};
use crate::models::User;

pub const USERNAME_TAKEN: &str = "A user with that username already exists.";

pub const INVALID_LOGIN: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid registration data")]
    Invalid(FormErrors),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Validates the form, checks the username is free and stores the new
    /// account with a salted password hash.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Invalid`] with field errors when the submission is
    /// rejected; nothing is persisted in that case.
    async fn register(&self, form: &RegistrationForm) -> Result<User, AuthError>;

    /// Returns the user when the credentials match and records the login time.
    async fn authenticate(&self, username: &str, password: &str)
    -> Result<Option<User>, AuthError>;

    /// Looks up the user a session points at.
    async fn user_by_id(&self, id: i32) -> Result<Option<User>, AuthError>;
}
