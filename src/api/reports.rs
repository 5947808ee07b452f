use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, AppState, auth::require_account};
use crate::services::ReportService;

/// GET /reports/users
/// Account roster as a CSV download; supervisors only see user-role rows
pub async fn export_accounts(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Response, ApiError> {
    let actor = require_account(&state, &session).await?;

    let accounts = state.accounts.list_accounts(&actor).await?;
    let visible = ReportService::visible_accounts(actor.role, accounts);
    let csv = ReportService::accounts_csv(&visible)?;

    Ok(csv_download(ReportService::accounts_filename(), csv))
}

/// GET /reports/orders
/// Full order history as a CSV download
pub async fn export_orders(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Response, ApiError> {
    let actor = require_account(&state, &session).await?;

    let orders = state.orders.list_orders(&actor, false).await?;
    let csv = ReportService::orders_csv(&orders)?;

    Ok(csv_download(ReportService::orders_filename(), csv))
}

fn csv_download(filename: String, body: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response()
}
