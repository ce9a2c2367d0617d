use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{
    Authorization, HeaderMapExt,
    authorization::{Basic, Bearer},
};

use sha2::{Digest, Sha256};

use crate::{AppState, error::AppError, utils::verify_token};

/// 校验 Bearer 令牌，并把 `Claims` 放进请求扩展
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let bearer = req
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or(AppError::Unauthorized)?;

    let claims = verify_token(bearer.token(), &state.config).map_err(|e| {
        tracing::warn!("Rejected bearer token: {}", e);
        AppError::Unauthorized
    })?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// 管理员接口使用 HTTP Basic 认证
pub async fn basic_auth_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let credentials = req
        .headers()
        .typed_get::<Authorization<Basic>>()
        .ok_or(AppError::Unauthorized)?;

    let expected_user = state.config.admin_username.as_str();
    let expected_password = state.config.admin_password.as_str();

    let user_ok = constant_time_eq(credentials.username(), expected_user);
    let password_ok = constant_time_eq(credentials.password(), expected_password);
    if expected_user.is_empty() || !(user_ok & password_ok) {
        tracing::warn!("Basic auth failed for user {:?}", credentials.username());
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(req).await)
}

/// 先取摘要再逐字节比较，耗时与输入内容和长度无关
fn constant_time_eq(given: &str, expected: &str) -> bool {
    let given = Sha256::digest(given.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());
    given
        .iter()
        .zip(expected.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
