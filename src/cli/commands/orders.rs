//! Order listing and fulfillment command handlers

use crate::config::Config;
use crate::entities::orders::OrderStatus;
use crate::services::{OrderError, OrderService, SeaOrmOrderService};

pub async fn cmd_order_list(config: &Config, all: bool) -> anyhow::Result<()> {
    let (store, actor) = super::open_store(config).await?;
    let service = SeaOrmOrderService::new(store);

    let orders = service.list_orders(&actor, !all).await?;

    if orders.is_empty() {
        if all {
            println!("No orders recorded.");
        } else {
            println!("No pending orders.");
            println!();
            println!("Use '--all' to include fulfilled orders.");
        }
        return Ok(());
    }

    let heading = if all { "Orders" } else { "Pending Orders" };
    println!("{} ({} total)", heading, orders.len());
    println!("{:-<70}", "");

    for order in &orders {
        let marker = match order.status {
            OrderStatus::Pending => "○",
            OrderStatus::Fulfilled => "✓",
        };

        println!(
            "{} #{} {} - {} points",
            marker, order.id, order.product, order.cost
        );
        println!(
            "  For: {} ({}) | Placed: {}",
            order.recipient_name(),
            order.username,
            order.created_at
        );
        if let Some(handler) = &order.fulfilled_by {
            println!("  Fulfilled by: {handler}");
        }
    }

    println!();
    println!("Legend: ○ Pending | ✓ Fulfilled");

    Ok(())
}

pub async fn cmd_order_fulfill(config: &Config, id: i64) -> anyhow::Result<()> {
    let (store, actor) = super::open_store(config).await?;
    let service = SeaOrmOrderService::new(store);

    match service.fulfill_order(&actor, id).await {
        Ok(order) => {
            println!(
                "✓ Fulfilled order #{}: {} for {}",
                order.id,
                order.product,
                order.recipient_name()
            );
        }
        Err(OrderError::NotFound) => println!("Order #{id} not found."),
        Err(OrderError::AlreadyFulfilled) => {
            println!("Order #{id} has already been fulfilled.");
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
