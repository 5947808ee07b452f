use serde::Serialize;

use crate::db::Account;
use crate::entities::accounts::Role;
use crate::entities::orders::{self, OrderStatus};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct AccountDto {
    pub username: String,
    pub full_name: Option<String>,
    pub display_name: String,
    pub role: Role,
    pub role_display: String,
    pub points: i64,
    pub version: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Account> for AccountDto {
    fn from(account: Account) -> Self {
        Self {
            display_name: account.display_name().to_string(),
            username: account.username,
            full_name: account.full_name,
            role: account.role,
            role_display: account.role.display_name().to_string(),
            points: account.points,
            version: account.version,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AccountPageDto {
    pub accounts: Vec<AccountDto>,
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
    pub total_pages: usize,
}

#[derive(Debug, Serialize)]
pub struct CreatedAccountDto {
    pub account: AccountDto,
    /// Present exactly once, when the server picked the password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OrderDto {
    pub id: i64,
    pub username: String,
    pub recipient: String,
    pub product: String,
    pub cost: i64,
    pub status: OrderStatus,
    pub status_display: String,
    pub fulfilled_by: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<orders::Model> for OrderDto {
    fn from(order: orders::Model) -> Self {
        Self {
            recipient: order.recipient_name().to_string(),
            id: order.id,
            username: order.username,
            product: order.product,
            cost: order.cost,
            status: order.status,
            status_display: order.status.display_name().to_string(),
            fulfilled_by: order.fulfilled_by,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthDto {
    pub status: String,
    pub database: bool,
    pub version: String,
    pub uptime_seconds: u64,
}
