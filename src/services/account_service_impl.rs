//! `SeaORM` implementation of the `AccountService` trait.

use crate::config::AuthConfig;
use crate::db::{self, Account, AccountChanges, NewAccount, Store};
use crate::services::account_service::{
    AccountError, AccountService, CreateAccount, CreatedAccount, PointsOp, UpdateAccount,
};
use async_trait::async_trait;

pub struct SeaOrmAccountService {
    store: Store,
    config: AuthConfig,
}

impl SeaOrmAccountService {
    #[must_use]
    pub const fn new(store: Store, config: AuthConfig) -> Self {
        Self { store, config }
    }

    /// Classify a failed conditional write: the row either raced away or
    /// moved past the version the caller saw.
    async fn stale_or_missing(&self, username: &str) -> AccountError {
        match self.store.get_account(username).await {
            Ok(Some(_)) => AccountError::Conflict,
            Ok(None) => AccountError::NotFound,
            Err(err) => AccountError::Internal(err.to_string()),
        }
    }

    async fn reload(&self, username: &str) -> Result<Account, AccountError> {
        self.store
            .get_account(username)
            .await?
            .ok_or(AccountError::NotFound)
    }
}

fn validate_username(username: &str) -> Result<(), AccountError> {
    if username.is_empty() {
        return Err(AccountError::Validation("Login is required".to_string()));
    }
    if username.len() > 64 {
        return Err(AccountError::Validation(
            "Login must be at most 64 characters".to_string(),
        ));
    }
    if username.chars().any(char::is_whitespace) {
        return Err(AccountError::Validation(
            "Login must not contain whitespace".to_string(),
        ));
    }
    Ok(())
}

fn validate_optional_password(password: Option<&str>) -> Result<(), AccountError> {
    if password == Some("") {
        return Err(AccountError::Validation(
            "Password must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// The display name is optional; an empty or blank string means "none".
fn normalize_full_name(full_name: Option<String>) -> Option<String> {
    full_name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
}

#[async_trait]
impl AccountService for SeaOrmAccountService {
    async fn list_accounts(&self, actor: &Account) -> Result<Vec<Account>, AccountError> {
        if !actor.role.is_admin() {
            return Err(AccountError::Forbidden);
        }

        Ok(self.store.list_accounts().await?)
    }

    async fn create_account(
        &self,
        actor: &Account,
        new: CreateAccount,
    ) -> Result<CreatedAccount, AccountError> {
        // Role policy comes first so an over-reaching request dies before
        // any other work
        if !actor.role.can_assign(new.role) {
            return Err(AccountError::Forbidden);
        }

        let username = new.username.trim().to_string();
        validate_username(&username)?;
        validate_optional_password(new.password.as_deref())?;

        if self.store.get_account(&username).await?.is_some() {
            return Err(AccountError::AlreadyExists);
        }

        let (password, generated) = match new.password {
            Some(provided) => (provided, None),
            None => {
                let generated = db::repositories::account::generate_password(
                    self.config.generated_password_len,
                );
                (generated.clone(), Some(generated))
            }
        };

        let account = self
            .store
            .create_account(
                NewAccount {
                    username: username.clone(),
                    password,
                    full_name: normalize_full_name(new.full_name),
                    role: new.role,
                    points: new.points.max(1),
                },
                &self.config,
            )
            .await?;

        metrics::counter!("accounts_created_total").increment(1);
        tracing::info!(
            username = %account.username,
            role = ?account.role,
            actor = %actor.username,
            "Account created"
        );

        Ok(CreatedAccount {
            account,
            generated_password: generated,
        })
    }

    async fn update_account(
        &self,
        actor: &Account,
        username: &str,
        changes: UpdateAccount,
    ) -> Result<Account, AccountError> {
        let target = self.reload(username).await?;

        if !actor.role.can_manage(target.role) {
            return Err(AccountError::Forbidden);
        }
        if changes.role != target.role && !actor.role.can_assign(changes.role) {
            return Err(AccountError::Forbidden);
        }
        // The seeded superadmin keeps its tier no matter who asks
        if target.username == db::BOOTSTRAP_USERNAME
            && changes.role != crate::entities::accounts::Role::Superadmin
        {
            return Err(AccountError::Forbidden);
        }

        validate_optional_password(changes.password.as_deref())?;

        let updated = self
            .store
            .update_account(
                username,
                AccountChanges {
                    full_name: normalize_full_name(changes.full_name),
                    role: changes.role,
                    points: changes.points.max(1),
                    password: changes.password,
                },
                changes.expected_version,
                &self.config,
            )
            .await?;

        if !updated {
            return Err(self.stale_or_missing(username).await);
        }

        tracing::info!(username = %username, actor = %actor.username, "Account updated");

        self.reload(username).await
    }

    async fn delete_account(&self, actor: &Account, username: &str) -> Result<(), AccountError> {
        let target = self.reload(username).await?;

        if !actor.role.can_manage(target.role) {
            return Err(AccountError::Forbidden);
        }
        if target.username == db::BOOTSTRAP_USERNAME {
            return Err(AccountError::Forbidden);
        }
        if target.username == actor.username {
            return Err(AccountError::Validation(
                "Accounts cannot delete themselves".to_string(),
            ));
        }

        if !self.store.delete_account(username).await? {
            return Err(AccountError::NotFound);
        }

        tracing::info!(username = %username, actor = %actor.username, "Account deleted");

        Ok(())
    }

    async fn adjust_points(
        &self,
        actor: &Account,
        username: &str,
        op: PointsOp,
        amount: i64,
    ) -> Result<Account, AccountError> {
        // Rejected before any read or write touches the target
        if amount <= 0 {
            return Err(AccountError::Validation(
                "Amount must be a positive number".to_string(),
            ));
        }

        let target = self.reload(username).await?;

        if !actor.role.can_manage(target.role) {
            return Err(AccountError::Forbidden);
        }

        // Administrative adjustments never drop a balance below one point
        let new_points = match op {
            PointsOp::Add => target.points.saturating_add(amount),
            PointsOp::Remove => target.points.saturating_sub(amount).max(1),
            PointsOp::Set => amount.max(1),
        };

        let updated = self
            .store
            .set_account_points(username, new_points, target.version)
            .await?;

        if !updated {
            return Err(self.stale_or_missing(username).await);
        }

        metrics::counter!("points_adjustments_total").increment(1);
        tracing::info!(
            username = %username,
            op = ?op,
            amount,
            new_points,
            actor = %actor.username,
            "Points adjusted"
        );

        self.reload(username).await
    }
}
