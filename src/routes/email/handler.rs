use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use crate::{AppState, error::AppError, extract::ValidatedJson, mailer::contact_message};

use super::model::SendEmailRequest;

/// 联系表单，限流在路由中间件里完成
#[axum::debug_handler]
pub async fn send_email(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<SendEmailRequest>,
) -> Result<impl IntoResponse, AppError> {
    let message = contact_message(&req.name, &req.email, &req.phone, &req.text);
    state.mailer.send(message).await?;

    Ok((StatusCode::CREATED, Json(json!({ "status": true }))))
}
