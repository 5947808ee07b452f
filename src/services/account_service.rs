//! Domain service for account administration.
//!
//! Covers listing, creation, editing, deletion, and point adjustments.
//! Every operation takes the acting account and checks its role before
//! touching anything; a caller without the right tier is refused before
//! any write happens.

use serde::Deserialize;
use thiserror::Error;

use crate::db::Account;
use crate::entities::accounts::Role;

/// Errors specific to account administration.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Account not found")]
    NotFound,

    #[error("An account with this login already exists")]
    AlreadyExists,

    #[error("Operation not permitted for this role")]
    Forbidden,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Account was changed by someone else; reload and try again")]
    Conflict,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AccountError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AccountError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Point adjustment modes. `Add` credits, `Remove` debits down to the
/// floor of one point, `Set` overwrites, also floored at one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointsOp {
    Add,
    Remove,
    Set,
}

/// A new account as requested by an administrator. Without a password,
/// one is generated and handed back exactly once.
#[derive(Debug, Clone)]
pub struct CreateAccount {
    pub username: String,
    pub password: Option<String>,
    pub full_name: Option<String>,
    pub role: Role,
    pub points: i64,
}

/// Replacement values for an account edit. The username itself is fixed
/// for the life of an account and cannot appear here.
#[derive(Debug, Clone)]
pub struct UpdateAccount {
    pub full_name: Option<String>,
    pub role: Role,
    pub points: i64,
    pub password: Option<String>,
    pub expected_version: i32,
}

/// Result of a create: the stored account, plus the generated password
/// when the request left it to us.
#[derive(Debug, Clone)]
pub struct CreatedAccount {
    pub account: Account,
    pub generated_password: Option<String>,
}

/// Domain service trait for account administration.
#[async_trait::async_trait]
pub trait AccountService: Send + Sync {
    /// Lists every account.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::Forbidden`] for non-administrative actors.
    async fn list_accounts(&self, actor: &Account) -> Result<Vec<Account>, AccountError>;

    /// Creates an account.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::Forbidden`] when the actor may not hand out
    /// the requested role, [`AccountError::AlreadyExists`] on a duplicate
    /// login.
    async fn create_account(
        &self,
        actor: &Account,
        new: CreateAccount,
    ) -> Result<CreatedAccount, AccountError>;

    /// Overwrites the editable fields of an account.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::Conflict`] when the caller's version is
    /// stale; nothing is written in that case.
    async fn update_account(
        &self,
        actor: &Account,
        username: &str,
        changes: UpdateAccount,
    ) -> Result<Account, AccountError>;

    /// Deletes an account. The bootstrap superadmin is never deletable.
    async fn delete_account(&self, actor: &Account, username: &str) -> Result<(), AccountError>;

    /// Applies a point adjustment and returns the updated account.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::Validation`] for a non-positive amount,
    /// before anything is written.
    async fn adjust_points(
        &self,
        actor: &Account,
        username: &str,
        op: PointsOp,
        amount: i64,
    ) -> Result<Account, AccountError>;
}
