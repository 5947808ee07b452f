//! Domain service for authentication.
//!
//! Handles login, session identity lookups, and self-service password
//! changes. Failed logins never disclose whether the login or the
//! password was wrong.

use serde::Serialize;
use thiserror::Error;

use crate::entities::accounts::Role;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Not authenticated")]
    Unauthorized,

    #[error("Validation failed: {0}")]
    Validation(String),

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

/// The signed-in identity as the client sees it. Rebuilt from the
/// database on every request that needs it, so the balance is current.
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub username: String,
    pub display_name: String,
    pub role: Role,
    pub role_display: String,
    pub points: i64,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Verifies credentials and returns the signed-in identity.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for an unknown login and
    /// for a wrong password alike.
    async fn login(&self, username: &str, password: &str) -> Result<SessionInfo, AuthError>;

    /// Re-reads the identity behind an established session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Unauthorized`] when the account behind the
    /// session no longer exists.
    async fn current_account(&self, username: &str) -> Result<SessionInfo, AuthError>;

    /// Changes the caller's own password.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] if the current password is wrong
    /// or the new password is unacceptable.
    async fn change_password(
        &self,
        username: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError>;
}
