//! `SeaORM` implementation of the `AuthService` trait.

use crate::config::AuthConfig;
use crate::db::{Account, Store};
use crate::services::auth_service::{AuthError, AuthService, SessionInfo};
use async_trait::async_trait;

fn session_info(account: &Account) -> SessionInfo {
    SessionInfo {
        username: account.username.clone(),
        display_name: account.display_name().to_string(),
        role: account.role,
        role_display: account.role.display_name().to_string(),
        points: account.points,
    }
}

pub struct SeaOrmAuthService {
    store: Store,
    config: AuthConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, config: AuthConfig) -> Self {
        Self { store, config }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn login(&self, username: &str, password: &str) -> Result<SessionInfo, AuthError> {
        // Verify credentials against database
        let is_valid = self
            .store
            .verify_account_password(username, password)
            .await?;

        if !is_valid {
            return Err(AuthError::InvalidCredentials);
        }

        // The row can vanish between the checks; keep the failure generic
        let account = self
            .store
            .get_account(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        tracing::info!(username = %account.username, role = ?account.role, "Login succeeded");

        Ok(session_info(&account))
    }

    async fn current_account(&self, username: &str) -> Result<SessionInfo, AuthError> {
        let account = self
            .store
            .get_account(username)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        Ok(session_info(&account))
    }

    async fn change_password(
        &self,
        username: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        // Validate new password
        if new_password.len() < self.config.min_password_len {
            return Err(AuthError::Validation(format!(
                "New password must be at least {} characters",
                self.config.min_password_len
            )));
        }

        if current_password == new_password {
            return Err(AuthError::Validation(
                "New password must be different from current password".to_string(),
            ));
        }

        // Verify current password
        let is_valid = self
            .store
            .verify_account_password(username, current_password)
            .await?;

        if !is_valid {
            return Err(AuthError::Validation(
                "Current password is incorrect".to_string(),
            ));
        }

        // Update password
        self.store
            .update_account_password(username, new_password, &self.config)
            .await?;

        tracing::info!(username = %username, "Password changed");

        Ok(())
    }
}
