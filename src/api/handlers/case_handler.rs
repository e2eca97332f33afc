//! Case lookup handlers.

use axum::{extract::State, response::Json, routing::get, Router};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::api::extractors::ApiQuery;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::config::{DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE};
use crate::domain::{
    AssignmentStats, CaseRecord, DateField, DateRange, Role, SearchSummary, SortOrder, StatusQuery,
};
use crate::errors::{AppError, AppResult};
use crate::types::{Paginated, PaginationMeta, PaginationParams};

/// Case routes (mounted under `/api/expedientes`, behind the session gate)
pub fn case_routes() -> Router<AppState> {
    Router::new()
        .route("/search", get(search_by_case_number))
        .route("/filter", get(filter_by_status))
        .route("/by-name", get(search_by_party_name))
}

fn page_params(page: Option<i64>, per_page: Option<i64>) -> PaginationParams {
    PaginationParams::new(
        page.unwrap_or(DEFAULT_PAGE_NUMBER as i64),
        per_page.unwrap_or(DEFAULT_PAGE_SIZE as i64),
    )
}

fn required(value: Option<String>, name: &str) -> AppResult<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::validation(format!("{} is required", name)))
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CaseNumberParams {
    /// Full or short case number; spaces are ignored
    #[param(example = "2024-00123")]
    pub radicado: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StatusFilterParams {
    /// Status vocabulary word, e.g. ACTIVO, PENDIENTE, SALIO
    #[param(example = "ACTIVO")]
    pub estado: Option<String>,
    /// Cap on cases fetched from storage (default 100, max 1000)
    pub limit: Option<i64>,
    /// Intake date order, `desc` by default
    pub order: Option<SortOrder>,
    pub fecha_desde: Option<NaiveDate>,
    pub fecha_hasta: Option<NaiveDate>,
    /// Which dates the range applies to, `ingreso` by default
    pub tipo_fecha: Option<DateField>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PartyNameParams {
    /// At least 3 characters of a plaintiff or defendant name
    #[param(example = "PEREZ")]
    pub nombre: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// A page of case records
#[derive(Debug, Serialize, ToSchema)]
pub struct CasePage {
    pub data: Vec<CaseRecord>,
    pub meta: PaginationMeta,
    /// Present when more than one case matched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<SearchSummary>,
}

impl From<Paginated<CaseRecord>> for CasePage {
    fn from(page: Paginated<CaseRecord>) -> Self {
        Self {
            data: page.data,
            meta: page.meta,
            summary: None,
        }
    }
}

/// Status filter results with the options actually applied
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusFilterPage {
    #[serde(flatten)]
    pub page: CasePage,
    pub limit: u64,
    pub order: SortOrder,
}

/// Search cases by full or short case number
#[utoipa::path(
    get,
    path = "/api/expedientes/search",
    tag = "Cases",
    params(CaseNumberParams),
    responses(
        (status = 200, description = "Matching cases, possibly none", body = CasePage),
        (status = 400, description = "Missing case number"),
        (status = 401, description = "No valid session")
    ),
    security(("bearer_auth" = []))
)]
pub async fn search_by_case_number(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<CaseNumberParams>,
) -> AppResult<Json<CasePage>> {
    let radicado = required(params.radicado, "radicado")?;
    let pagination = page_params(params.page, params.per_page);
    let matches = state
        .case_service
        .search_by_case_number(&radicado, &pagination)
        .await?;

    let mut page = CasePage::from(matches.page);
    page.summary = matches.summary;

    Ok(Json(page))
}

/// Filter cases by status
#[utoipa::path(
    get,
    path = "/api/expedientes/filter",
    tag = "Cases",
    params(StatusFilterParams),
    responses(
        (status = 200, description = "Matching cases, possibly none", body = StatusFilterPage),
        (status = 400, description = "Missing status or invalid date range"),
        (status = 401, description = "No valid session")
    ),
    security(("bearer_auth" = []))
)]
pub async fn filter_by_status(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<StatusFilterParams>,
) -> AppResult<Json<StatusFilterPage>> {
    let estado = required(params.estado, "estado")?;
    let date_range = DateRange::new(
        params.fecha_desde,
        params.fecha_hasta,
        params.tipo_fecha.unwrap_or_default(),
    )?;
    let query = StatusQuery::new(
        &estado,
        params.limit,
        params.order.unwrap_or_default(),
        date_range,
    )?;

    let pagination = page_params(params.page, params.per_page);
    let page = state
        .case_service
        .filter_by_status(&query, &pagination)
        .await?;

    Ok(Json(StatusFilterPage {
        page: page.into(),
        limit: query.limit,
        order: query.order,
    }))
}

/// Search cases by plaintiff or defendant name
#[utoipa::path(
    get,
    path = "/api/expedientes/by-name",
    tag = "Cases",
    params(PartyNameParams),
    responses(
        (status = 200, description = "Matching cases, possibly none", body = CasePage),
        (status = 400, description = "Name shorter than 3 characters"),
        (status = 401, description = "No valid session")
    ),
    security(("bearer_auth" = []))
)]
pub async fn search_by_party_name(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PartyNameParams>,
) -> AppResult<Json<CasePage>> {
    let nombre = required(params.nombre, "nombre")?;
    let pagination = page_params(params.page, params.per_page);

    let page = state
        .case_service
        .search_by_party_name(&nombre, &pagination)
        .await?;

    Ok(Json(page.into()))
}

/// The caller's workload
#[derive(Debug, Serialize, ToSchema)]
pub struct AssignedCasesPage {
    /// Role whose cases are listed; absent for accounts without a role
    pub rol: Option<Role>,
    #[serde(flatten)]
    pub page: CasePage,
    #[serde(rename = "estadisticas")]
    pub stats: AssignmentStats,
    pub message: String,
}

/// Cases assigned to the caller's role
///
/// A case is assigned to a role when its `responsable` holds the role name.
/// The role is read from the account, not from the session token, so a
/// role change applies without logging in again.
#[utoipa::path(
    get,
    path = "/api/asignacion",
    tag = "Cases",
    params(PaginationParams),
    responses(
        (status = 200, description = "Assigned cases and per-status counts", body = AssignedCasesPage),
        (status = 401, description = "No valid session")
    ),
    security(("bearer_auth" = []))
)]
pub async fn assigned_cases(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> AppResult<Json<AssignedCasesPage>> {
    let user = state.user_service.get_user(current.id).await?;
    let assigned = state
        .case_service
        .assigned_cases(user.role, &params)
        .await?;

    let message = match assigned.role {
        None => "No role assigned; ask an administrator for one".to_string(),
        Some(role) if assigned.stats.total == 0 => format!("No cases assigned to {}", role),
        Some(role) => format!("{} case(s) assigned to {}", assigned.stats.total, role),
    };

    Ok(Json(AssignedCasesPage {
        rol: assigned.role,
        page: assigned.page.into(),
        stats: assigned.stats,
        message,
    }))
}
