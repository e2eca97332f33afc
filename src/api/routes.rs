//! Application route configuration.

use axum::{
    extract::State,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method, StatusCode,
    },
    middleware,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{
    auth_handler::me,
    auth_routes,
    case_handler::assigned_cases,
    case_routes,
    dashboard_handler::dashboard,
    password_handler::validate_password_strength,
    user_handler::{list_roles, role_stats},
    user_routes,
};
use super::middleware::{require_admin, session_gate};
use super::openapi::ApiDoc;
use super::AppState;

/// Create the application router with all routes configured
pub fn create_router(state: AppState) -> Router {
    // Session first, then the admin check.
    let admin = Router::new()
        .nest("/users", user_routes())
        .route("/roles", get(list_roles))
        .route("/roles/stats", get(role_stats))
        .route_layer(middleware::from_fn(require_admin));

    let protected = Router::new()
        .route("/me", get(me))
        .route("/dashboard", get(dashboard))
        .route("/asignacion", get(assigned_cases))
        .nest("/expedientes", case_routes())
        .merge(admin)
        .route_layer(middleware::from_fn_with_state(state.clone(), session_gate));

    let api = Router::new()
        .route("/validate-password", post(validate_password_strength))
        .merge(protected);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/auth", auth_routes(&state))
        .nest("/api", api)
        .layer(TimeoutLayer::new(state.config.request_timeout))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Juzgado case management API"
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    database: &'static str,
}

/// Health check pinging the connection pool
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    match state.database.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy",
                database: "up",
            }),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unhealthy",
                    database: "down",
                }),
            )
        }
    }
}
