use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use crate::{
    AppState,
    database::StoreError,
    error::AppError,
    extract::{PageQuery, ValidatedJson},
    models::{Paginate, UserResponse},
    utils::{hash_password, parse_id},
};

use super::model::CreateUserRequest;

/// 创建管理员账号
#[axum::debug_handler]
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let password_hash = hash_password(&req.password)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;

    let user = state
        .users
        .create_admin(req.email, req.phone, password_hash)
        .await
        .map_err(|e| match e {
            StoreError::Duplicate => AppError::Conflict("User already exists".to_string()),
            other => AppError::Store(other),
        })?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

#[axum::debug_handler]
pub async fn get_all_users(
    State(state): State<AppState>,
    page: PageQuery,
) -> Result<impl IntoResponse, AppError> {
    let (users, total) = state.users.find_page(page.page, page.size).await?;
    let items: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();
    tracing::info!(
        page_number = page.page,
        page_size = page.size,
        fetched = items.len(),
        "Paginated users fetched"
    );
    Ok(Json(Paginate::new(page.page, page.size, total, items)))
}

#[axum::debug_handler]
pub async fn remove_user_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    state.users.remove(id).await?;
    Ok(Json(json!({ "id": id })))
}
