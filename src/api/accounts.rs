use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::{
    AccountDto, AccountPageDto, ApiError, ApiResponse, AppState, CreatedAccountDto,
    MessageResponse, auth::require_account,
};
use crate::entities::accounts::Role;
use crate::listing::{self, ListView};
use crate::services::{AccountError, CreateAccount, PointsOp, UpdateAccount};

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::NotFound => Self::NotFound("Account not found".to_string()),
            AccountError::AlreadyExists => {
                Self::Conflict("An account with this login already exists".to_string())
            }
            AccountError::Forbidden => {
                Self::Forbidden("Operation not permitted for this role".to_string())
            }
            AccountError::Validation(msg) => Self::ValidationError(msg),
            AccountError::Conflict => {
                Self::Conflict("Account was changed by someone else; reload and try again".to_string())
            }
            AccountError::Database(msg) => Self::DatabaseError(msg),
            AccountError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AccountListQuery {
    /// Case-insensitive substring matched against name and login.
    pub search: Option<String>,
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

const fn default_page() -> usize {
    1
}

const fn default_page_size() -> usize {
    crate::listing::DEFAULT_PAGE_SIZE
}

#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub username: String,
    pub password: Option<String>,
    pub full_name: Option<String>,
    #[serde(default = "default_role")]
    pub role: Role,
    #[serde(default = "default_points")]
    pub points: i64,
}

const fn default_role() -> Role {
    Role::User
}

const fn default_points() -> i64 {
    1
}

#[derive(Debug, Deserialize)]
pub struct UpdateAccountRequest {
    pub full_name: Option<String>,
    pub role: Role,
    pub points: i64,
    pub password: Option<String>,
    /// The version the client last saw; a stale one is rejected.
    pub version: i32,
}

#[derive(Debug, Deserialize)]
pub struct AdjustPointsRequest {
    pub op: PointsOp,
    pub amount: i64,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /accounts
/// Filtered, paginated account listing for administrative roles
pub async fn list_accounts(
    State(state): State<Arc<AppState>>,
    session: Session,
    Query(query): Query<AccountListQuery>,
) -> Result<Json<ApiResponse<AccountPageDto>>, ApiError> {
    let actor = require_account(&state, &session).await?;

    let accounts = state.accounts.list_accounts(&actor).await?;

    let mut view = ListView::new(query.page_size);
    view.set_filter(query.search.as_deref().unwrap_or_default());

    let filtered: Vec<_> = accounts
        .into_iter()
        .filter(|account| {
            listing::matches_filter(account.full_name.as_deref(), &account.username, view.filter())
        })
        .collect();

    view.set_page(query.page, filtered.len());

    let page = AccountPageDto {
        accounts: view.slice(&filtered).iter().cloned().map(AccountDto::from).collect(),
        page: view.page(),
        page_size: view.page_size(),
        total: filtered.len(),
        total_pages: listing::page_count(filtered.len(), view.page_size()),
    };

    Ok(Json(ApiResponse::success(page)))
}

/// POST /accounts
/// Create an account; responds with the generated password when none was given
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<CreateAccountRequest>,
) -> Result<Json<ApiResponse<CreatedAccountDto>>, ApiError> {
    let actor = require_account(&state, &session).await?;

    let created = state
        .accounts
        .create_account(
            &actor,
            CreateAccount {
                username: payload.username,
                password: payload.password,
                full_name: payload.full_name,
                role: payload.role,
                points: payload.points,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(CreatedAccountDto {
        account: AccountDto::from(created.account),
        generated_password: created.generated_password,
    })))
}

/// PUT /accounts/{username}
/// Overwrite the editable fields of an account
pub async fn update_account(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(username): Path<String>,
    Json(payload): Json<UpdateAccountRequest>,
) -> Result<Json<ApiResponse<AccountDto>>, ApiError> {
    let actor = require_account(&state, &session).await?;

    let account = state
        .accounts
        .update_account(
            &actor,
            &username,
            UpdateAccount {
                full_name: payload.full_name,
                role: payload.role,
                points: payload.points,
                password: payload.password,
                expected_version: payload.version,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(AccountDto::from(account))))
}

/// DELETE /accounts/{username}
pub async fn delete_account(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(username): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let actor = require_account(&state, &session).await?;

    state.accounts.delete_account(&actor, &username).await?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: format!("Account {username} deleted"),
    })))
}

/// POST /accounts/{username}/points
/// Apply an add/remove/set point adjustment
pub async fn adjust_points(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(username): Path<String>,
    Json(payload): Json<AdjustPointsRequest>,
) -> Result<Json<ApiResponse<AccountDto>>, ApiError> {
    let actor = require_account(&state, &session).await?;

    let account = state
        .accounts
        .adjust_points(&actor, &username, payload.op, payload.amount)
        .await?;

    Ok(Json(ApiResponse::success(AccountDto::from(account))))
}
