pub use super::accounts::Entity as Accounts;
pub use super::orders::Entity as Orders;
