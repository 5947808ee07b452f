pub mod account;
pub mod order;

/// Login of the seeded superadmin. The account must always exist and keep
/// its role; deletion and demotion are refused everywhere.
pub const BOOTSTRAP_USERNAME: &str = "admin";

/// First-run password for the bootstrap account.
pub(crate) const BOOTSTRAP_PASSWORD: &str = "1234";
