mod export;
mod orders;
mod users;

pub use export::{cmd_export_orders, cmd_export_users};
pub use orders::{cmd_order_fulfill, cmd_order_list};
pub use users::{cmd_user_create, cmd_user_list, cmd_user_points, cmd_user_remove};

use crate::config::Config;
use crate::db::{Account, BOOTSTRAP_USERNAME, Store};

/// Every command acts as the bootstrap administrator, so it can manage
/// any account and fulfill any order.
async fn open_store(config: &Config) -> anyhow::Result<(Store, Account)> {
    let store = Store::new(&config.general.database_path).await?;
    store.ensure_bootstrap_admin(&config.auth).await?;

    let actor = store
        .get_account(BOOTSTRAP_USERNAME)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Bootstrap administrator account is missing"))?;

    Ok((store, actor))
}
