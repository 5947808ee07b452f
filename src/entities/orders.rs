use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Login of the purchasing account, captured at purchase time.
    pub username: String,

    /// Display name of the purchaser at purchase time; may be empty when
    /// the account had none, in which case `username` stands in.
    pub user_full_name: Option<String>,

    pub product: String,

    pub cost: i64,

    pub status: OrderStatus,

    /// Display name of whoever fulfilled the order.
    pub fulfilled_by: Option<String>,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(
    Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[sea_orm(string_value = "pending")]
    Pending,

    #[sea_orm(string_value = "fulfilled")]
    Fulfilled,
}

impl OrderStatus {
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Fulfilled => "Fulfilled",
        }
    }
}

impl Model {
    /// Purchaser shown on receipts and reports.
    #[must_use]
    pub fn recipient_name(&self) -> &str {
        self.user_full_name.as_deref().unwrap_or(&self.username)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
