pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, SessionInfo};
pub use auth_service_impl::SeaOrmAuthService;

pub mod account_service;
pub mod account_service_impl;
pub use account_service::{
    AccountError, AccountService, CreateAccount, CreatedAccount, PointsOp, UpdateAccount,
};
pub use account_service_impl::SeaOrmAccountService;

pub mod order_service;
pub mod order_service_impl;
pub use order_service::{OrderError, OrderService};
pub use order_service_impl::SeaOrmOrderService;

pub mod report;
pub use report::ReportService;
