//! CSV report builders for accounts and orders.
//!
//! Reports show what an operator would print and hand over: display
//! names with login fallbacks, human-readable role and status labels,
//! and never any credential material.

use anyhow::Result;

use crate::db::Account;
use crate::entities::accounts::Role;
use crate::entities::orders;

pub struct ReportService;

impl ReportService {
    #[must_use]
    pub fn accounts_filename() -> String {
        format!("users_{}.csv", chrono::Utc::now().format("%Y-%m-%d"))
    }

    #[must_use]
    pub fn orders_filename() -> String {
        format!("orders_{}.csv", chrono::Utc::now().format("%Y-%m-%d"))
    }

    /// Narrow an account list to what `viewer` may export. Supervisors
    /// only ever see plain user accounts; superadmins see everything.
    #[must_use]
    pub fn visible_accounts(viewer: Role, accounts: Vec<Account>) -> Vec<Account> {
        match viewer {
            Role::Superadmin => accounts,
            _ => accounts
                .into_iter()
                .filter(|account| account.role == Role::User)
                .collect(),
        }
    }

    /// Render accounts as CSV bytes, one row per account.
    pub fn accounts_csv(accounts: &[Account]) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());

        writer
            .write_record(["Name", "Login", "Role", "Points", "Created"])
            .map_err(|e| anyhow::anyhow!("Failed to write CSV header: {e}"))?;

        for account in accounts {
            let points = account.points.to_string();
            writer
                .write_record([
                    account.display_name(),
                    account.username.as_str(),
                    account.role.display_name(),
                    points.as_str(),
                    account.created_at.as_str(),
                ])
                .map_err(|e| anyhow::anyhow!("Failed to write CSV row: {e}"))?;
        }

        writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to finish CSV: {e}"))
    }

    /// Render orders as CSV bytes, one row per order.
    pub fn orders_csv(orders: &[orders::Model]) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());

        writer
            .write_record([
                "Recipient",
                "Login",
                "Product",
                "Cost",
                "Status",
                "Fulfilled By",
                "Created",
                "Updated",
            ])
            .map_err(|e| anyhow::anyhow!("Failed to write CSV header: {e}"))?;

        for order in orders {
            let cost = order.cost.to_string();
            writer
                .write_record([
                    order.recipient_name(),
                    order.username.as_str(),
                    order.product.as_str(),
                    cost.as_str(),
                    order.status.display_name(),
                    order.fulfilled_by.as_deref().unwrap_or(""),
                    order.created_at.as_str(),
                    order.updated_at.as_str(),
                ])
                .map_err(|e| anyhow::anyhow!("Failed to write CSV row: {e}"))?;
        }

        writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to finish CSV: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::orders::OrderStatus;

    fn account(username: &str, full_name: Option<&str>, role: Role) -> Account {
        Account {
            id: 1,
            username: username.to_string(),
            full_name: full_name.map(ToString::to_string),
            role,
            points: 5,
            version: 0,
            created_at: "2026-08-20T10:00:00+00:00".to_string(),
            updated_at: "2026-08-20T10:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn supervisors_only_export_user_rows() {
        let accounts = vec![
            account("admin", Some("Administrator"), Role::Superadmin),
            account("sup", None, Role::Supervisor),
            account("alice", Some("Alice Cooper"), Role::User),
        ];

        let visible = ReportService::visible_accounts(Role::Supervisor, accounts.clone());
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].username, "alice");

        let all = ReportService::visible_accounts(Role::Superadmin, accounts);
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn accounts_csv_uses_display_labels_and_no_secrets() {
        let accounts = vec![
            account("admin", Some("Administrator"), Role::Superadmin),
            account("bob", None, Role::User),
        ];

        let bytes = ReportService::accounts_csv(&accounts).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert!(text.starts_with("Name,Login,Role,Points,Created"));
        assert!(text.contains("Administrator,admin,Super Administrator,5"));
        // missing display name falls back to the login
        assert!(text.contains("bob,bob,User,5"));
        assert!(!text.to_lowercase().contains("password"));
    }

    #[test]
    fn orders_csv_renders_status_and_handler() {
        let orders = vec![orders::Model {
            id: 1,
            username: "alice".to_string(),
            user_full_name: Some("Alice Cooper".to_string()),
            product: "Mug".to_string(),
            cost: 3,
            status: OrderStatus::Fulfilled,
            fulfilled_by: Some("Administrator".to_string()),
            created_at: "2026-08-20T10:00:00+00:00".to_string(),
            updated_at: "2026-08-21T09:00:00+00:00".to_string(),
        }];

        let bytes = ReportService::orders_csv(&orders).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert!(text.starts_with("Recipient,Login,Product,Cost,Status,Fulfilled By,Created,Updated"));
        assert!(text.contains("Alice Cooper,alice,Mug,3,Fulfilled,Administrator"));
    }

    #[test]
    fn pending_orders_leave_the_handler_blank() {
        let orders = vec![orders::Model {
            id: 2,
            username: "bob".to_string(),
            user_full_name: None,
            product: "Sticker Pack".to_string(),
            cost: 1,
            status: OrderStatus::Pending,
            fulfilled_by: None,
            created_at: "2026-08-20T10:00:00+00:00".to_string(),
            updated_at: "2026-08-20T10:00:00+00:00".to_string(),
        }];

        let bytes = ReportService::orders_csv(&orders).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert!(text.contains("bob,bob,Sticker Pack,1,Pending,,"));
    }

    #[test]
    fn filenames_carry_the_date() {
        let name = ReportService::accounts_filename();
        assert!(name.starts_with("users_"));
        assert!(name.ends_with(".csv"));
        assert_eq!(name.len(), "users_2026-08-23.csv".len());
    }
}
