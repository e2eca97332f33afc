//! Integration tests for API endpoints.
//!
//! The router runs against fake services and a disconnected database, so no
//! PostgreSQL instance is needed.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{NaiveDate, NaiveDateTime};
use http_body_util::BodyExt;
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use tower::ServiceExt;

use juzgado::api::create_router;
use juzgado::config::{Config, SESSION_COOKIE_NAME};
use juzgado::domain::{
    AssignedCases, AssignmentStats, BulkAssignmentResult, BulkRoleAssignment, Case, CaseRecord,
    CreateUser, DashboardMetrics, Role, RoleRecord, RoleStats, SearchSummary, StatusQuery,
    UpdateUser, User, UserList, UserResponse, UserStats,
};
use juzgado::errors::{AppError, AppResult};
use juzgado::infra::Database;
use juzgado::services::{
    issue_token, verify_token, AuthService, CaseNumberMatches, CaseService, Claims,
    DashboardService, Services, TokenResponse, UserService,
};
use juzgado::types::{paginate, Paginated, PaginationParams};
use juzgado::AppState;

const SECRET: &str = "integration-test-secret-with-32-chars!";

// =============================================================================
// Fake services
// =============================================================================

fn config() -> Config {
    Config::with_secret(SECRET)
}

fn user(id: i32, role: Option<Role>, is_admin: bool) -> User {
    User {
        id,
        name: Some(format!("Usuario {}", id)),
        username: format!("user{}", id),
        email: format!("user{}@juzgado.gov.co", id),
        password_hash: String::new(),
        role,
        is_admin,
        active: true,
        created_at: NaiveDateTime::default(),
    }
}

fn case(id: i32, short: &str, status: &str) -> Case {
    Case {
        id,
        case_number_full: Some(format!("0500140030022024{:05}00", id)),
        case_number_short: Some(short.to_string()),
        plaintiff: Some("JUAN PEREZ".into()),
        defendant: Some("MARIA LOPEZ".into()),
        status: Some(status.to_string()),
        status_detail: None,
        owner: None,
        location: None,
        request_type: None,
        origin_court: None,
        observations: None,
        intake_date: NaiveDate::from_ymd_opt(2024, 3, id as u32),
        created_at: NaiveDateTime::default(),
    }
}

fn record(id: i32, short: &str, status: &str) -> CaseRecord {
    CaseRecord::assemble(case(id, short, status), vec![], vec![], vec![])
}

struct FakeAuth;

#[async_trait]
impl AuthService for FakeAuth {
    async fn login(&self, identifier: String, password: String) -> AppResult<TokenResponse> {
        if identifier == "user1" && password == "Juzg4do#Seguro" {
            issue_token(&user(1, Some(Role::Escribiente), false), &config())
        } else {
            Err(AppError::InvalidCredentials)
        }
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        verify_token(token, &config())
    }
}

#[derive(Default)]
struct FakeCases {
    fail: bool,
}

#[async_trait]
impl CaseService for FakeCases {
    async fn search_by_case_number(
        &self,
        query: &str,
        params: &PaginationParams,
    ) -> AppResult<CaseNumberMatches> {
        let records = match query {
            "2024-00001" => vec![record(1, "2024-00001", "ACTIVO")],
            "2024-00002" => vec![
                record(2, "2024-00002", "ACTIVO"),
                record(3, "2024-00002", "INACTIVO"),
            ],
            _ => vec![],
        };
        let summary = (records.len() > 1).then(|| SearchSummary {
            cases: records.len(),
            docket_entries: 0,
            status_events: 0,
        });

        Ok(CaseNumberMatches {
            page: paginate(records, params.page, params.per_page),
            summary,
        })
    }

    async fn filter_by_status(
        &self,
        query: &StatusQuery,
        params: &PaginationParams,
    ) -> AppResult<Paginated<CaseRecord>> {
        if self.fail {
            return Err(AppError::Storage {
                context: "filtering cases by status".into(),
                source: sea_orm::DbErr::Custom("connection refused".into()),
            });
        }
        let records = (1..=3)
            .map(|id| record(id, &format!("2024-{:05}", id), "ACTIVO"))
            .take(query.limit as usize)
            .collect();
        Ok(paginate(records, params.page, params.per_page))
    }

    async fn search_by_party_name(
        &self,
        _name: &str,
        params: &PaginationParams,
    ) -> AppResult<Paginated<CaseRecord>> {
        Ok(Paginated::new(
            vec![record(4, "2024-00004", "ACTIVO")],
            params.page(),
            params.limit(),
            1,
        ))
    }

    async fn assigned_cases(
        &self,
        role: Option<Role>,
        params: &PaginationParams,
    ) -> AppResult<AssignedCases> {
        let records = match role {
            Some(_) => vec![
                record(5, "2024-00005", "ACTIVO PENDIENTE"),
                record(6, "2024-00006", "INACTIVO RESUELTO"),
            ],
            None => vec![],
        };
        let counts: Vec<(Option<String>, Option<String>, i64)> = records
            .iter()
            .map(|r| (r.case.status.clone(), None, 1))
            .collect();

        Ok(AssignedCases {
            role,
            page: paginate(records, params.page, params.per_page),
            stats: AssignmentStats::from_counts(&counts),
        })
    }
}

struct FakeDashboard;

#[async_trait]
impl DashboardService for FakeDashboard {
    async fn metrics(&self) -> AppResult<DashboardMetrics> {
        Ok(DashboardMetrics {
            total_cases: 2,
            total_filings: 0,
            total_docket_entries: 0,
            total_status_events: 0,
            cases_by_status: vec![],
            cases_by_owner: vec![],
            cases_by_type: vec![],
            recent_cases: vec![],
        })
    }
}

/// Counts every call that reaches a handler body.
#[derive(Default)]
struct CountingUsers {
    calls: Arc<AtomicUsize>,
}

impl CountingUsers {
    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl UserService for CountingUsers {
    async fn get_user(&self, id: i32) -> AppResult<User> {
        self.hit();
        Ok(user(id, Some(Role::Escribiente), false))
    }

    async fn list_users(&self) -> AppResult<UserList> {
        self.hit();
        let users = vec![user(1, Some(Role::Administrador), true), user(2, None, false)];
        Ok(UserList {
            stats: UserStats::from_users(&users),
            users: users.into_iter().map(UserResponse::from).collect(),
        })
    }

    async fn list_roles(&self) -> AppResult<Vec<RoleRecord>> {
        self.hit();
        Ok(vec![])
    }

    async fn create_user(&self, request: CreateUser) -> AppResult<User> {
        self.hit();
        Ok(User {
            username: request.username,
            ..user(10, None, request.is_admin)
        })
    }

    async fn update_user(&self, id: i32, _request: UpdateUser) -> AppResult<User> {
        self.hit();
        Ok(user(id, None, false))
    }

    async fn delete_user(&self, _actor_id: i32, _id: i32) -> AppResult<()> {
        self.hit();
        Ok(())
    }

    async fn role_stats(&self) -> AppResult<RoleStats> {
        self.hit();
        let users = vec![user(1, Some(Role::Escribiente), false), user(2, None, false)];
        Ok(RoleStats::from_users(&users))
    }

    async fn change_role(&self, id: i32, role: Option<&str>) -> AppResult<User> {
        self.hit();
        let role = match role.map(str::trim).filter(|r| !r.is_empty()) {
            Some(name) => Some(Role::parse_assignable(name)?),
            None => None,
        };
        Ok(user(id, role, false))
    }

    async fn assign_roles(&self, request: BulkRoleAssignment) -> AppResult<BulkAssignmentResult> {
        self.hit();
        Role::parse_assignable(&request.role)?;
        Ok(BulkAssignmentResult {
            succeeded: request.user_ids.len(),
            failed: 0,
        })
    }
}

// =============================================================================
// Test helpers
// =============================================================================

struct TestApp {
    router: Router,
    user_calls: Arc<AtomicUsize>,
}

fn app_with(cases: FakeCases) -> TestApp {
    let users = CountingUsers::default();
    let user_calls = users.calls.clone();

    let services = Services::new(
        Arc::new(FakeAuth),
        Arc::new(cases),
        Arc::new(FakeDashboard),
        Arc::new(users),
    );
    let database = Arc::new(Database::from_connection(DatabaseConnection::Disconnected));
    let state = AppState::new(&services, database, config());

    TestApp {
        router: create_router(state),
        user_calls,
    }
}

fn app() -> TestApp {
    app_with(FakeCases::default())
}

fn token_for(user: &User) -> String {
    issue_token(user, &config()).unwrap().access_token
}

fn clerk_token() -> String {
    token_for(&user(2, Some(Role::Escribiente), false))
}

fn admin_token() -> String {
    token_for(&user(1, Some(Role::Administrador), false))
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// =============================================================================
// Public endpoints
// =============================================================================

#[tokio::test]
async fn test_root_is_public() {
    let response = app().router.oneshot(get("/", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_health_reports_unreachable_database() {
    let response = app().router.oneshot(get("/health", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["database"], "down");
}

#[tokio::test]
async fn test_validate_password_reports_strength() {
    let response = app()
        .router
        .oneshot(post_json(
            "/api/validate-password",
            json!({ "password": "Juzg4do#Seguro" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["is_valid"], true);
    assert_eq!(body["strength"], "strong");
}

#[tokio::test]
async fn test_validate_password_empty_is_invalid_not_an_error() {
    let response = app()
        .router
        .oneshot(post_json("/api/validate-password", json!({ "password": "" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["is_valid"], false);
    assert_eq!(body["score"], 0);
}

#[tokio::test]
async fn test_validate_password_missing_field_is_client_error() {
    let response = app()
        .router
        .oneshot(post_json("/api/validate-password", json!({ "clave": "x" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_validate_password_wrong_type_is_client_error() {
    let response = app()
        .router
        .oneshot(post_json("/api/validate-password", json!({ "password": 12345 })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Sessions
// =============================================================================

#[tokio::test]
async fn test_login_sets_http_only_cookie() {
    let response = app()
        .router
        .oneshot(post_json(
            "/auth/login",
            json!({ "username": "user1", "password": "Juzg4do#Seguro" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with(&format!("{}=", SESSION_COOKIE_NAME)));
    assert!(cookie.contains("HttpOnly"));

    let body = body_json(response).await;
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["user"]["username"], "user1");
}

#[tokio::test]
async fn test_login_bad_credentials() {
    let response = app()
        .router
        .oneshot(post_json(
            "/auth/login",
            json!({ "username": "user1", "password": "nope" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"]["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_session_cookie_is_accepted() {
    let request = Request::builder()
        .uri("/api/me")
        .header(
            header::COOKIE,
            format!("{}={}", SESSION_COOKIE_NAME, clerk_token()),
        )
        .body(Body::empty())
        .unwrap();

    let response = app().router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["id"], 2);
}

#[tokio::test]
async fn test_tampered_token_rejected() {
    let mut token = clerk_token();
    token.push('x');

    let response = app()
        .router
        .oneshot(get("/api/dashboard", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Authorization gate
// =============================================================================

#[tokio::test]
async fn test_unauthenticated_request_never_reaches_handler() {
    let app = app();
    let calls = app.user_calls.clone();

    let response = app.router.oneshot(get("/api/users", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_non_admin_is_forbidden_and_handler_not_called() {
    let app = app();
    let calls = app.user_calls.clone();

    let response = app
        .router
        .oneshot(get("/api/users", Some(&clerk_token())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_admin_role_lists_users() {
    let app = app();
    let calls = app.user_calls.clone();

    let response = app
        .router
        .oneshot(get("/api/users", Some(&admin_token())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let body = body_json(response).await;
    assert_eq!(body["estadisticas"]["total"], 2);
    assert_eq!(body["estadisticas"]["without_role"], 1);
}

#[tokio::test]
async fn test_admin_flag_grants_role_listing() {
    let token = token_for(&user(5, None, true));
    let response = app()
        .router
        .oneshot(get("/api/roles", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_admin_creates_user() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/users")
        .header(header::AUTHORIZATION, format!("Bearer {}", admin_token()))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({
                "username": "nuevo",
                "email": "nuevo@juzgado.gov.co",
                "password": "Juzg4do#Seguro",
                "role": "ESCRIBIENTE"
            })
            .to_string(),
        ))
        .unwrap();

    let response = app().router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["data"]["username"], "nuevo");
}

#[tokio::test]
async fn test_create_user_with_bad_email_rejected_before_service() {
    let app = app();
    let calls = app.user_calls.clone();
    let request = Request::builder()
        .method("POST")
        .uri("/api/users")
        .header(header::AUTHORIZATION, format!("Bearer {}", admin_token()))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "username": "nuevo", "email": "no-es-correo", "password": "x" }).to_string(),
        ))
        .unwrap();

    let response = app.router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

// =============================================================================
// Case lookups
// =============================================================================

#[tokio::test]
async fn test_search_requires_session() {
    let response = app()
        .router
        .oneshot(get("/api/expedientes/search?radicado=2024-00001", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_search_single_match_has_no_summary() {
    let response = app()
        .router
        .oneshot(get(
            "/api/expedientes/search?radicado=2024-00001",
            Some(&clerk_token()),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["estadisticas"]["filings"], 0);
    assert_eq!(body["data"][0]["current_status"]["value"], "ACTIVO");
    assert!(body.get("summary").is_none());
}

#[tokio::test]
async fn test_search_several_matches_carries_summary() {
    let response = app()
        .router
        .oneshot(get(
            "/api/expedientes/search?radicado=2024-00002",
            Some(&clerk_token()),
        ))
        .await
        .unwrap();

    let body = body_json(response).await;
    assert_eq!(body["summary"]["cases"], 2);
}

#[tokio::test]
async fn test_search_no_match_is_empty_success() {
    let response = app()
        .router
        .oneshot(get(
            "/api/expedientes/search?radicado=1999-99999",
            Some(&clerk_token()),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["data"].as_array().unwrap().is_empty());
    assert_eq!(body["meta"]["total_pages"], 1);
}

#[tokio::test]
async fn test_search_without_case_number_is_bad_request() {
    let response = app()
        .router
        .oneshot(get("/api/expedientes/search", Some(&clerk_token())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_filter_page_past_the_end() {
    let response = app()
        .router
        .oneshot(get(
            "/api/expedientes/filter?estado=ACTIVO&page=5&per_page=10",
            Some(&clerk_token()),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["data"].as_array().unwrap().is_empty());
    assert_eq!(body["meta"]["current_page"], 5);
    assert_eq!(body["meta"]["total_items"], 3);
    assert_eq!(body["limit"], 100);
    assert_eq!(body["order"], "desc");
}

#[tokio::test]
async fn test_filter_rejects_inverted_date_range() {
    let response = app()
        .router
        .oneshot(get(
            "/api/expedientes/filter?estado=ACTIVO&fecha_desde=2024-05-01&fecha_hasta=2024-01-01",
            Some(&clerk_token()),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_filter_rejects_malformed_limit() {
    let response = app()
        .router
        .oneshot(get(
            "/api/expedientes/filter?estado=ACTIVO&limit=muchos",
            Some(&clerk_token()),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_storage_failure_is_server_error_not_empty() {
    let response = app_with(FakeCases { fail: true })
        .router
        .oneshot(get(
            "/api/expedientes/filter?estado=ACTIVO",
            Some(&clerk_token()),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "DATABASE_ERROR");
    assert!(!body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("connection refused"));
}

#[tokio::test]
async fn test_party_name_search_is_paginated() {
    let response = app()
        .router
        .oneshot(get(
            "/api/expedientes/by-name?nombre=perez&page=1&per_page=5",
            Some(&clerk_token()),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["meta"]["page_size"], 5);
    assert_eq!(body["data"][0]["id"], 4);
}

#[tokio::test]
async fn test_dashboard_with_session() {
    let response = app()
        .router
        .oneshot(get("/api/dashboard", Some(&clerk_token())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["total_cases"], 2);
}

// =============================================================================
// Login throttling
// =============================================================================

fn login_from(address: &str, username: &str, password: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-forwarded-for", address)
        .body(Body::from(
            json!({ "username": username, "password": password }).to_string(),
        ))
        .unwrap()
}

#[tokio::test]
async fn test_repeated_failed_logins_are_throttled() {
    let router = app().router;

    for _ in 0..5 {
        let response = router
            .clone()
            .oneshot(login_from("203.0.113.9", "user1", "nope"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let response = router
        .clone()
        .oneshot(login_from("203.0.113.9", "user1", "nope"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let retry_after: u64 = response
        .headers()
        .get(header::RETRY_AFTER)
        .unwrap()
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!(retry_after > 0);
    assert_eq!(body_json(response).await["error"]["code"], "TOO_MANY_ATTEMPTS");

    // The account stays locked from a fresh address, even with the right password.
    let response = router
        .oneshot(login_from("198.51.100.4", "USER1", "Juzg4do#Seguro"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key(header::RETRY_AFTER));
}

#[tokio::test]
async fn test_address_attempt_budget_applies_to_any_username() {
    let router = app().router;

    for i in 0..10 {
        let response = router
            .clone()
            .oneshot(login_from("203.0.113.20", &format!("nadie{}", i), "nope"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let response = router
        .clone()
        .oneshot(login_from("203.0.113.20", "user1", "Juzg4do#Seguro"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    let response = router
        .oneshot(login_from("203.0.113.21", "user1", "Juzg4do#Seguro"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// =============================================================================
// Role administration and assignments
// =============================================================================

fn json_request(method: &str, uri: &str, body: Value, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_role_stats_are_admin_only() {
    let app = app();
    let calls = app.user_calls.clone();

    let response = app
        .router
        .clone()
        .oneshot(get("/api/roles/stats", Some(&clerk_token())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let response = app
        .router
        .oneshot(get("/api/roles/stats", Some(&admin_token())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total_usuarios"], 2);
    assert_eq!(body["escribientes"], 1);
    assert_eq!(body["sin_rol"], 1);
}

#[tokio::test]
async fn test_admin_changes_one_role() {
    let response = app()
        .router
        .oneshot(json_request(
            "PUT",
            "/api/users/3/role",
            json!({ "role": "sustanciador" }),
            &admin_token(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["id"], 3);
    assert_eq!(body["data"]["role"], "SUSTANCIADOR");
}

#[tokio::test]
async fn test_role_change_cannot_grant_admin() {
    let response = app()
        .router
        .oneshot(json_request(
            "PUT",
            "/api/users/3/role",
            json!({ "role": "ADMINISTRADOR" }),
            &admin_token(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_bulk_role_assignment() {
    let response = app()
        .router
        .oneshot(json_request(
            "POST",
            "/api/users/roles/bulk",
            json!({ "user_ids": [2, 3], "role": "ESCRIBIENTE" }),
            &admin_token(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["exitosos"], 2);
    assert_eq!(body["fallidos"], 0);
}

#[tokio::test]
async fn test_bulk_role_assignment_without_users_rejected_before_service() {
    let app = app();
    let calls = app.user_calls.clone();

    let response = app
        .router
        .oneshot(json_request(
            "POST",
            "/api/users/roles/bulk",
            json!({ "user_ids": [], "role": "ESCRIBIENTE" }),
            &admin_token(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_assigned_cases_follow_account_role() {
    let response = app()
        .router
        .oneshot(get("/api/asignacion?page=1&per_page=1", Some(&clerk_token())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["rol"], "ESCRIBIENTE");
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["meta"]["total_items"], 2);
    assert_eq!(body["estadisticas"]["total"], 2);
    assert_eq!(body["estadisticas"]["activos"], 1);
    assert_eq!(body["estadisticas"]["porcentaje_activos"], 50.0);
}

#[tokio::test]
async fn test_assigned_cases_require_session() {
    let response = app()
        .router
        .oneshot(get("/api/asignacion", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
