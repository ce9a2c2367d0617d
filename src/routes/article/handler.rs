use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use crate::{
    AppState,
    error::AppError,
    extract::{PageQuery, ValidatedJson},
    models::Paginate,
    utils::parse_id,
};

use super::model::{CreateArticleRequest, PatchArticleRequest};

#[axum::debug_handler]
pub async fn create_article(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateArticleRequest>,
) -> Result<impl IntoResponse, AppError> {
    let article = state.articles.create(req.title, req.text, req.img).await?;
    Ok((StatusCode::CREATED, Json(article)))
}

#[axum::debug_handler]
pub async fn get_all_articles(
    State(state): State<AppState>,
    page: PageQuery,
) -> Result<impl IntoResponse, AppError> {
    let (items, total) = state.articles.find_page(page.page, page.size).await?;
    tracing::info!(
        page_number = page.page,
        page_size = page.size,
        fetched = items.len(),
        "Paginated articles fetched"
    );
    Ok(Json(Paginate::new(page.page, page.size, total, items)))
}

#[axum::debug_handler]
pub async fn get_article_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let article = state
        .articles
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound("Article"))?;
    Ok(Json(article))
}

#[axum::debug_handler]
pub async fn patch_article_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<PatchArticleRequest>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let article = state
        .articles
        .patch(id, req.into_fields())
        .await?
        .ok_or(AppError::NotFound("Article"))?;
    Ok(Json(article))
}

#[axum::debug_handler]
pub async fn remove_article_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    state.articles.remove(id).await?;
    Ok(Json(json!({ "id": id })))
}
