use axum::{extract::State, response::Json};

use crate::api::AppState;
use crate::domain::DashboardMetrics;
use crate::errors::AppResult;

/// Landing dashboard metrics
#[utoipa::path(
    get,
    path = "/api/dashboard",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Totals, status breakdown and recent cases", body = DashboardMetrics),
        (status = 401, description = "No valid session")
    ),
    security(("bearer_auth" = []))
)]
pub async fn dashboard(State(state): State<AppState>) -> AppResult<Json<DashboardMetrics>> {
    let metrics = state.dashboard_service.metrics().await?;
    Ok(Json(metrics))
}
