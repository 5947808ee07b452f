//! Domain service for the shop.
//!
//! Purchases spend points and open a pending order; fulfillment closes
//! it. An order moves from pending to fulfilled exactly once and never
//! back.

use thiserror::Error;

use crate::db::Account;
use crate::entities::orders;

/// Errors specific to shop operations.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order not found")]
    NotFound,

    #[error("Order was already fulfilled")]
    AlreadyFulfilled,

    #[error("Not enough points for this purchase")]
    InsufficientPoints,

    #[error("Account not found")]
    AccountNotFound,

    #[error("Operation not permitted for this role")]
    Forbidden,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Balance changed during purchase; try again")]
    Conflict,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for OrderError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for OrderError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Domain service trait for the shop.
#[async_trait::async_trait]
pub trait OrderService: Send + Sync {
    /// Lists orders, newest first, optionally narrowed to pending ones.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::Forbidden`] for non-administrative actors.
    async fn list_orders(
        &self,
        actor: &Account,
        pending_only: bool,
    ) -> Result<Vec<orders::Model>, OrderError>;

    /// Spends the actor's points on `product`, opening a pending order.
    /// The order row and the point debit land in one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::InsufficientPoints`] when the fresh balance
    /// does not cover the cost; nothing is written in that case.
    async fn purchase(
        &self,
        actor: &Account,
        product: &str,
        cost: i64,
    ) -> Result<orders::Model, OrderError>;

    /// Marks a pending order fulfilled, stamping the actor as handler.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::AlreadyFulfilled`] on a repeat attempt.
    async fn fulfill_order(
        &self,
        actor: &Account,
        order_id: i64,
    ) -> Result<orders::Model, OrderError>;
}
