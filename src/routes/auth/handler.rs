use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{AppState, error::AppError, extract::ValidatedJson, utils::generate_token};

use super::model::{LoginRequest, LoginResponse};

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let Some(user) = state.users.find_by_email(&req.email).await? else {
        tracing::warn!("Login attempt for unknown email: {}", req.email);
        return Err(AppError::Unauthorized);
    };

    // 邮箱不存在和密码错误返回同样的结果
    let valid = user
        .verify_login(&req.password)
        .map_err(|e| AppError::Internal(format!("Failed to compare password hashes: {}", e)))?;
    if !valid {
        tracing::warn!("Invalid password provided for user {}", user.id);
        return Err(AppError::Unauthorized);
    }

    let (access_token, _) = generate_token(&user.id.to_string(), &state.config)
        .map_err(|e| AppError::Internal(format!("Failed to generate access token: {}", e)))?;

    tracing::info!("User logged in: {}", user.id);
    Ok((StatusCode::CREATED, Json(LoginResponse { access_token })))
}
