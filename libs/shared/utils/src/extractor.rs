use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use shared_config::AppConfig;
use shared_models::error::AppError;
use shared_models::identity::{Identity, Role};

pub const USER_ID_HEADER: &str = "X-User-ID";
pub const USER_ROLE_HEADER: &str = "X-User-Role";

/// Middleware resolving the caller identity from the gateway-injected
/// headers. The gateway has already authenticated the bearer token and
/// stripped it; a missing user id here means the request bypassed the
/// gateway and is rejected.
pub async fn identity_middleware(
    State(_config): State<Arc<AppConfig>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let user_id = request
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Unauthenticated("User ID not provided".to_string()))?
        .to_string();

    let role = request
        .headers()
        .get(USER_ROLE_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(Role::parse);

    request.extensions_mut().insert(Identity::new(user_id, role));

    Ok(next.run(request).await)
}
