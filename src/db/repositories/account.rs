use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tokio::task;

use crate::config::AuthConfig;
use crate::entities::accounts::{self, Role};

/// Account data returned from the repository (without the password hash)
#[derive(Debug, Clone)]
pub struct Account {
    pub id: i32,
    pub username: String,
    pub full_name: Option<String>,
    pub role: Role,
    pub points: i64,
    pub version: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl From<accounts::Model> for Account {
    fn from(model: accounts::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            full_name: model.full_name,
            role: model.role,
            points: model.points,
            version: model.version,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl Account {
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.username)
    }
}

/// Field values for a new account row. The password arrives in the clear
/// and is hashed inside the repository.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub password: String,
    pub full_name: Option<String>,
    pub role: Role,
    pub points: i64,
}

/// Replacement field values for an existing account row. `password` is
/// hashed and written only when present; everything else always overwrites.
#[derive(Debug, Clone)]
pub struct AccountChanges {
    pub full_name: Option<String>,
    pub role: Role,
    pub points: i64,
    pub password: Option<String>,
}

pub struct AccountRepository {
    conn: DatabaseConnection,
}

impl AccountRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// List all accounts ordered by username
    pub async fn list(&self) -> Result<Vec<Account>> {
        let rows = accounts::Entity::find()
            .order_by_asc(accounts::Column::Username)
            .all(&self.conn)
            .await
            .context("Failed to list accounts")?;

        Ok(rows.into_iter().map(Account::from).collect())
    }

    /// Get account by username
    pub async fn get_by_username(&self, username: &str) -> Result<Option<Account>> {
        let account = accounts::Entity::find()
            .filter(accounts::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query account by username")?;

        Ok(account.map(Account::from))
    }

    /// Insert a new account, hashing the password first
    pub async fn insert(&self, new: NewAccount, config: &AuthConfig) -> Result<Account> {
        let password = new.password.clone();
        let config = config.clone();
        let password_hash = task::spawn_blocking(move || hash_password(&password, &config))
            .await
            .context("Password hashing task panicked")??;

        let now = chrono::Utc::now().to_rfc3339();

        let active = accounts::ActiveModel {
            username: Set(new.username),
            password_hash: Set(password_hash),
            full_name: Set(new.full_name),
            role: Set(new.role),
            points: Set(new.points),
            version: Set(0),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert account")?;

        Ok(Account::from(model))
    }

    /// Verify password for an account. Unknown usernames report `false`
    /// the same way wrong passwords do.
    /// Note: This uses `spawn_blocking` because Argon2 hashing is CPU-intensive
    /// and would block the async runtime if run directly.
    pub async fn verify_password(&self, username: &str, password: &str) -> Result<bool> {
        let account = accounts::Entity::find()
            .filter(accounts::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query account for password verification")?;

        let Some(account) = account else {
            return Ok(false);
        };

        let password_hash = account.password_hash;
        let password = password.to_string();

        // Run CPU-intensive password verification in a blocking task
        let is_valid = task::spawn_blocking(move || {
            let parsed_hash = PasswordHash::new(&password_hash)
                .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

            let argon2 = Argon2::default();
            Ok::<bool, anyhow::Error>(
                argon2
                    .verify_password(password.as_bytes(), &parsed_hash)
                    .is_ok(),
            )
        })
        .await
        .context("Password verification task panicked")??;

        Ok(is_valid)
    }

    /// Update password for an account (hashes the new password)
    pub async fn update_password(
        &self,
        username: &str,
        new_password: &str,
        config: &AuthConfig,
    ) -> Result<()> {
        let account = accounts::Entity::find()
            .filter(accounts::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query account for password update")?
            .ok_or_else(|| anyhow::anyhow!("Account not found: {username}"))?;

        let password = new_password.to_string();
        let config = config.clone();
        let new_hash = task::spawn_blocking(move || hash_password(&password, &config))
            .await
            .context("Password hashing task panicked")??;

        let now = chrono::Utc::now().to_rfc3339();
        let version = account.version;

        let mut active: accounts::ActiveModel = account.into();
        active.password_hash = Set(new_hash);
        active.version = Set(version + 1);
        active.updated_at = Set(now);
        active.update(&self.conn).await?;

        Ok(())
    }

    /// Overwrite the editable fields of an account. The write only lands
    /// when the stored version still matches `expected_version`; a stale
    /// caller gets `false` and nothing changes.
    pub async fn update(
        &self,
        username: &str,
        changes: AccountChanges,
        expected_version: i32,
        config: &AuthConfig,
    ) -> Result<bool> {
        let now = chrono::Utc::now().to_rfc3339();

        let mut update = accounts::Entity::update_many()
            .col_expr(
                accounts::Column::FullName,
                sea_orm::sea_query::Expr::value(changes.full_name),
            )
            .col_expr(
                accounts::Column::Role,
                sea_orm::sea_query::Expr::value(changes.role),
            )
            .col_expr(
                accounts::Column::Points,
                sea_orm::sea_query::Expr::value(changes.points),
            )
            .col_expr(
                accounts::Column::Version,
                sea_orm::sea_query::Expr::value(expected_version + 1),
            )
            .col_expr(
                accounts::Column::UpdatedAt,
                sea_orm::sea_query::Expr::value(now),
            );

        if let Some(password) = changes.password {
            let config = config.clone();
            let new_hash = task::spawn_blocking(move || hash_password(&password, &config))
                .await
                .context("Password hashing task panicked")??;
            update = update.col_expr(
                accounts::Column::PasswordHash,
                sea_orm::sea_query::Expr::value(new_hash),
            );
        }

        let result = update
            .filter(accounts::Column::Username.eq(username))
            .filter(accounts::Column::Version.eq(expected_version))
            .exec(&self.conn)
            .await
            .context("Failed to update account")?;

        Ok(result.rows_affected > 0)
    }

    /// Write a new points balance, guarded by the version counter
    pub async fn set_points(
        &self,
        username: &str,
        points: i64,
        expected_version: i32,
    ) -> Result<bool> {
        let now = chrono::Utc::now().to_rfc3339();

        let result = accounts::Entity::update_many()
            .col_expr(
                accounts::Column::Points,
                sea_orm::sea_query::Expr::value(points),
            )
            .col_expr(
                accounts::Column::Version,
                sea_orm::sea_query::Expr::value(expected_version + 1),
            )
            .col_expr(
                accounts::Column::UpdatedAt,
                sea_orm::sea_query::Expr::value(now),
            )
            .filter(accounts::Column::Username.eq(username))
            .filter(accounts::Column::Version.eq(expected_version))
            .exec(&self.conn)
            .await
            .context("Failed to update account points")?;

        Ok(result.rows_affected > 0)
    }

    /// Delete an account by username, reporting whether a row was removed
    pub async fn delete(&self, username: &str) -> Result<bool> {
        let result = accounts::Entity::delete_many()
            .filter(accounts::Column::Username.eq(username))
            .exec(&self.conn)
            .await
            .context("Failed to delete account")?;

        Ok(result.rows_affected > 0)
    }

    /// Reinstate the bootstrap superadmin if the row went missing or was
    /// demoted by hand-editing the database. Returns `true` when a repair
    /// was needed.
    pub async fn ensure_bootstrap_admin(&self, config: &AuthConfig) -> Result<bool> {
        let existing = accounts::Entity::find()
            .filter(accounts::Column::Username.eq(super::BOOTSTRAP_USERNAME))
            .one(&self.conn)
            .await
            .context("Failed to query bootstrap account")?;

        match existing {
            None => {
                self.insert(
                    NewAccount {
                        username: super::BOOTSTRAP_USERNAME.to_string(),
                        password: super::BOOTSTRAP_PASSWORD.to_string(),
                        full_name: Some("Administrator".to_string()),
                        role: Role::Superadmin,
                        points: 1,
                    },
                    config,
                )
                .await?;
                Ok(true)
            }
            Some(account) if account.role != Role::Superadmin => {
                let now = chrono::Utc::now().to_rfc3339();
                let version = account.version;

                let mut active: accounts::ActiveModel = account.into();
                active.role = Set(Role::Superadmin);
                active.version = Set(version + 1);
                active.updated_at = Set(now);
                active.update(&self.conn).await?;
                Ok(true)
            }
            Some(_) => Ok(false),
        }
    }
}

/// Hash a password using Argon2id with the configured cost parameters
pub fn hash_password(password: &str, config: &AuthConfig) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let params = Params::new(
        config.argon2_memory_cost_kib,
        config.argon2_time_cost,
        config.argon2_parallelism,
        None, // output length (use default)
    )
    .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// Generate a random alphanumeric password for accounts created without one
#[must_use]
pub fn generate_password(length: usize) -> String {
    use rand::Rng;

    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

    let mut rng = rand::rng();
    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::generate_password;

    #[test]
    fn generated_passwords_have_requested_length() {
        assert_eq!(generate_password(6).len(), 6);
        assert_eq!(generate_password(12).len(), 12);
    }

    #[test]
    fn generated_passwords_are_alphanumeric() {
        let password = generate_password(64);
        assert!(password.chars().all(char::is_alphanumeric));
    }
}
