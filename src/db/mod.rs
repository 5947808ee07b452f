use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::AuthConfig;
use crate::entities::orders;

pub mod migrator;
pub mod repositories;

pub use repositories::BOOTSTRAP_USERNAME;
pub use repositories::account::{Account, AccountChanges, NewAccount};
pub use repositories::order::NewOrder;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn account_repo(&self) -> repositories::account::AccountRepository {
        repositories::account::AccountRepository::new(self.conn.clone())
    }

    fn order_repo(&self) -> repositories::order::OrderRepository {
        repositories::order::OrderRepository::new(self.conn.clone())
    }

    // ========== Account Repository Methods ==========

    pub async fn list_accounts(&self) -> Result<Vec<Account>> {
        self.account_repo().list().await
    }

    pub async fn get_account(&self, username: &str) -> Result<Option<Account>> {
        self.account_repo().get_by_username(username).await
    }

    pub async fn create_account(&self, new: NewAccount, config: &AuthConfig) -> Result<Account> {
        self.account_repo().insert(new, config).await
    }

    pub async fn verify_account_password(&self, username: &str, password: &str) -> Result<bool> {
        self.account_repo()
            .verify_password(username, password)
            .await
    }

    pub async fn update_account_password(
        &self,
        username: &str,
        new_password: &str,
        config: &AuthConfig,
    ) -> Result<()> {
        self.account_repo()
            .update_password(username, new_password, config)
            .await
    }

    pub async fn update_account(
        &self,
        username: &str,
        changes: AccountChanges,
        expected_version: i32,
        config: &AuthConfig,
    ) -> Result<bool> {
        self.account_repo()
            .update(username, changes, expected_version, config)
            .await
    }

    pub async fn set_account_points(
        &self,
        username: &str,
        points: i64,
        expected_version: i32,
    ) -> Result<bool> {
        self.account_repo()
            .set_points(username, points, expected_version)
            .await
    }

    pub async fn delete_account(&self, username: &str) -> Result<bool> {
        self.account_repo().delete(username).await
    }

    pub async fn ensure_bootstrap_admin(&self, config: &AuthConfig) -> Result<bool> {
        self.account_repo().ensure_bootstrap_admin(config).await
    }

    // ========== Order Repository Methods ==========

    pub async fn list_orders(&self, pending_only: bool) -> Result<Vec<orders::Model>> {
        self.order_repo().list(pending_only).await
    }

    pub async fn get_order(&self, id: i64) -> Result<Option<orders::Model>> {
        self.order_repo().get(id).await
    }

    pub async fn create_order_with_debit(
        &self,
        new: NewOrder,
        new_balance: i64,
        expected_version: i32,
    ) -> Result<Option<orders::Model>> {
        self.order_repo()
            .create_with_debit(new, new_balance, expected_version)
            .await
    }

    pub async fn fulfill_order(&self, id: i64, fulfilled_by: &str) -> Result<bool> {
        self.order_repo().fulfill(id, fulfilled_by).await
    }
}
