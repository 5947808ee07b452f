//! `SeaORM` implementation of the `OrderService` trait.

use crate::db::{Account, NewOrder, Store};
use crate::entities::accounts::Role;
use crate::entities::orders;
use crate::services::order_service::{OrderError, OrderService};
use async_trait::async_trait;

pub struct SeaOrmOrderService {
    store: Store,
}

impl SeaOrmOrderService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl OrderService for SeaOrmOrderService {
    async fn list_orders(
        &self,
        actor: &Account,
        pending_only: bool,
    ) -> Result<Vec<orders::Model>, OrderError> {
        if !actor.role.is_admin() {
            return Err(OrderError::Forbidden);
        }

        Ok(self.store.list_orders(pending_only).await?)
    }

    async fn purchase(
        &self,
        actor: &Account,
        product: &str,
        cost: i64,
    ) -> Result<orders::Model, OrderError> {
        if actor.role != Role::User {
            return Err(OrderError::Forbidden);
        }

        let product = product.trim();
        if product.is_empty() {
            return Err(OrderError::Validation(
                "Product name is required".to_string(),
            ));
        }
        if cost <= 0 {
            return Err(OrderError::Validation(
                "Cost must be a positive number".to_string(),
            ));
        }

        // The session snapshot may be stale; the guard runs on a fresh row
        let purchaser = self
            .store
            .get_account(&actor.username)
            .await?
            .ok_or(OrderError::AccountNotFound)?;

        if purchaser.points < cost {
            return Err(OrderError::InsufficientPoints);
        }

        let order = self
            .store
            .create_order_with_debit(
                NewOrder {
                    username: purchaser.username.clone(),
                    user_full_name: purchaser.full_name.clone(),
                    product: product.to_string(),
                    cost,
                },
                purchaser.points - cost,
                purchaser.version,
            )
            .await?
            .ok_or(OrderError::Conflict)?;

        metrics::counter!("orders_created_total").increment(1);
        tracing::info!(
            order_id = order.id,
            username = %order.username,
            product = %order.product,
            cost,
            "Order placed"
        );

        Ok(order)
    }

    async fn fulfill_order(
        &self,
        actor: &Account,
        order_id: i64,
    ) -> Result<orders::Model, OrderError> {
        if !actor.role.is_admin() {
            return Err(OrderError::Forbidden);
        }

        let fulfilled = self
            .store
            .fulfill_order(order_id, actor.display_name())
            .await?;

        if !fulfilled {
            // Find out which way the conditional write missed
            return match self.store.get_order(order_id).await? {
                None => Err(OrderError::NotFound),
                Some(_) => Err(OrderError::AlreadyFulfilled),
            };
        }

        let order = self
            .store
            .get_order(order_id)
            .await?
            .ok_or_else(|| OrderError::Internal("Fulfilled order not found".to_string()))?;

        metrics::counter!("orders_fulfilled_total").increment(1);
        tracing::info!(
            order_id,
            fulfilled_by = %actor.username,
            "Order fulfilled"
        );

        Ok(order)
    }
}
