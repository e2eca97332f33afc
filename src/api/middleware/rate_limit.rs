//! Login throttling in front of `/auth/login`.

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;

use crate::api::AppState;
use crate::errors::AppError;

/// Address the login attempt came from, as seen by the throttle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientAddress(pub String);

/// Extract the client identifier.
/// Uses X-Forwarded-For header if behind proxy, otherwise uses connection IP.
pub fn client_identifier(request: &Request) -> String {
    // First entry of the chain is the original client.
    if let Some(forwarded) = request
        .headers()
        .get("X-Forwarded-For")
        .and_then(|h| h.to_str().ok())
    {
        if let Some(ip) = forwarded.split(',').next().map(str::trim).filter(|ip| !ip.is_empty()) {
            return ip.to_string();
        }
    }

    if let Some(real_ip) = request
        .headers()
        .get("X-Real-IP")
        .and_then(|h| h.to_str().ok())
    {
        return real_ip.trim().to_string();
    }

    if let Some(connect_info) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        return connect_info.0.ip().to_string();
    }

    "unknown".to_string()
}

/// Refuse blocked or over-budget addresses with 429, and hand the address to
/// the login handler for per-username accounting.
pub async fn login_rate_limit(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let address = client_identifier(&request);

    if let Err(blocked) = state.login_throttle.admit_address(&address) {
        tracing::warn!(%address, retry_after = blocked.retry_after_secs(), "Login attempt refused");
        return Err(blocked.into());
    }

    request.extensions_mut().insert(ClientAddress(address));
    Ok(next.run(request).await)
}
