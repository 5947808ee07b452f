use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Login name, unique and immutable once created.
    #[sea_orm(unique)]
    pub username: String,

    /// Argon2id password hash
    pub password_hash: String,

    /// Display name; falls back to `username` wherever shown.
    pub full_name: Option<String>,

    pub role: Role,

    pub points: i64,

    /// Bumped on every update; writers carrying a stale value are rejected.
    pub version: i32,

    pub created_at: String,

    pub updated_at: String,
}

/// Authorization tier. Stored as a closed string set; rows carrying any
/// other value fail to load instead of being granted a fallback tier.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[sea_orm(string_value = "user")]
    User,

    #[sea_orm(string_value = "supervisor")]
    Supervisor,

    #[sea_orm(string_value = "superadmin")]
    Superadmin,
}

impl Role {
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Supervisor => "Supervisor",
            Self::Superadmin => "Super Administrator",
        }
    }

    /// Whether this role carries any administrative capability.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Supervisor | Self::Superadmin)
    }

    /// Whether this role may edit, delete, or adjust the points of an
    /// account holding `target`.
    #[must_use]
    pub const fn can_manage(self, target: Self) -> bool {
        match self {
            Self::Superadmin => true,
            Self::Supervisor => matches!(target, Self::User),
            Self::User => false,
        }
    }

    /// Whether this role may hand out `assigned` when creating or editing
    /// an account.
    #[must_use]
    pub const fn can_assign(self, assigned: Self) -> bool {
        match self {
            Self::Superadmin => true,
            Self::Supervisor => matches!(assigned, Self::User),
            Self::User => false,
        }
    }
}

impl Model {
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.username)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn superadmin_manages_every_tier() {
        assert!(Role::Superadmin.can_manage(Role::User));
        assert!(Role::Superadmin.can_manage(Role::Supervisor));
        assert!(Role::Superadmin.can_manage(Role::Superadmin));
        assert!(Role::Superadmin.can_assign(Role::Supervisor));
    }

    #[test]
    fn supervisor_only_manages_users() {
        assert!(Role::Supervisor.can_manage(Role::User));
        assert!(!Role::Supervisor.can_manage(Role::Supervisor));
        assert!(!Role::Supervisor.can_manage(Role::Superadmin));
        assert!(Role::Supervisor.can_assign(Role::User));
        assert!(!Role::Supervisor.can_assign(Role::Supervisor));
        assert!(!Role::Supervisor.can_assign(Role::Superadmin));
    }

    #[test]
    fn user_has_no_administrative_reach() {
        assert!(!Role::User.is_admin());
        assert!(!Role::User.can_manage(Role::User));
        assert!(!Role::User.can_assign(Role::User));
    }

    #[test]
    fn display_name_falls_back_to_username() {
        let account = Model {
            id: 1,
            username: "alice".to_string(),
            password_hash: String::new(),
            full_name: None,
            role: Role::User,
            points: 1,
            version: 0,
            created_at: String::new(),
            updated_at: String::new(),
        };
        assert_eq!(account.display_name(), "alice");

        let named = Model {
            full_name: Some("Alice Cooper".to_string()),
            ..account
        };
        assert_eq!(named.display_name(), "Alice Cooper");
    }
}
