//! CSV export command handlers

use crate::config::Config;
use crate::services::{
    AccountService, OrderService, ReportService, SeaOrmAccountService, SeaOrmOrderService,
};

pub async fn cmd_export_users(config: &Config, output: Option<&str>) -> anyhow::Result<()> {
    let (store, actor) = super::open_store(config).await?;
    let service = SeaOrmAccountService::new(store, config.auth.clone());

    let accounts = service.list_accounts(&actor).await?;
    let visible = ReportService::visible_accounts(actor.role, accounts);
    let csv = ReportService::accounts_csv(&visible)?;

    let path = output.map_or_else(ReportService::accounts_filename, ToString::to_string);
    tokio::fs::write(&path, csv).await?;

    println!("✓ Wrote {} account rows to {path}", visible.len());

    Ok(())
}

pub async fn cmd_export_orders(config: &Config, output: Option<&str>) -> anyhow::Result<()> {
    let (store, actor) = super::open_store(config).await?;
    let service = SeaOrmOrderService::new(store);

    let orders = service.list_orders(&actor, false).await?;
    let csv = ReportService::orders_csv(&orders)?;

    let path = output.map_or_else(ReportService::orders_filename, ToString::to_string);
    tokio::fs::write(&path, csv).await?;

    println!("✓ Wrote {} order rows to {path}", orders.len());

    Ok(())
}
