use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState, OrderDto, auth::require_account};
use crate::services::OrderError;

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::NotFound => Self::NotFound("Order not found".to_string()),
            OrderError::AlreadyFulfilled => {
                Self::Conflict("Order has already been fulfilled".to_string())
            }
            OrderError::InsufficientPoints => {
                Self::ValidationError("Not enough points for this purchase".to_string())
            }
            OrderError::AccountNotFound => {
                Self::Unauthorized("Session account no longer exists".to_string())
            }
            OrderError::Forbidden => {
                Self::Forbidden("Operation not permitted for this role".to_string())
            }
            OrderError::Validation(msg) => Self::ValidationError(msg),
            OrderError::Conflict => {
                Self::Conflict("Balance changed during purchase; try again".to_string())
            }
            OrderError::Database(msg) => Self::DatabaseError(msg),
            OrderError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    /// "pending" restricts the listing to unfulfilled orders; "all" or absent
    /// returns everything.
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PurchaseRequest {
    pub product: String,
    pub cost: i64,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /orders
/// Order listing for administrative roles, newest first
pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    session: Session,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<ApiResponse<Vec<OrderDto>>>, ApiError> {
    let actor = require_account(&state, &session).await?;

    let pending_only = match query.status.as_deref() {
        Some("pending") => true,
        None | Some("all") => false,
        Some(other) => {
            return Err(ApiError::ValidationError(format!(
                "Unknown status filter: {other}"
            )));
        }
    };

    let orders = state.orders.list_orders(&actor, pending_only).await?;

    Ok(Json(ApiResponse::success(
        orders.into_iter().map(OrderDto::from).collect(),
    )))
}

/// POST /orders
/// Spend points on a product; the debit and the order land together
pub async fn purchase(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<PurchaseRequest>,
) -> Result<Json<ApiResponse<OrderDto>>, ApiError> {
    let actor = require_account(&state, &session).await?;

    let order = state
        .orders
        .purchase(&actor, &payload.product, payload.cost)
        .await?;

    Ok(Json(ApiResponse::success(OrderDto::from(order))))
}

/// POST /orders/{id}/fulfill
/// Mark a pending order fulfilled, stamped with the acting administrator
pub async fn fulfill_order(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<OrderDto>>, ApiError> {
    let actor = require_account(&state, &session).await?;

    let order = state.orders.fulfill_order(&actor, id).await?;

    Ok(Json(ApiResponse::success(OrderDto::from(order))))
}
