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

use super::model::{CreateProductRequest, PatchProductRequest};

#[axum::debug_handler]
pub async fn create_product(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateProductRequest>,
) -> Result<impl IntoResponse, AppError> {
    let product = state.products.create(req.title, req.text, req.short_text, req.img).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

#[axum::debug_handler]
pub async fn get_all_products(
    State(state): State<AppState>,
    page: PageQuery,
) -> Result<impl IntoResponse, AppError> {
    let (items, total) = state.products.find_page(page.page, page.size).await?;
    tracing::info!(
        page_number = page.page,
        page_size = page.size,
        fetched = items.len(),
        "Paginated products fetched"
    );
    Ok(Json(Paginate::new(page.page, page.size, total, items)))
}

#[axum::debug_handler]
pub async fn get_product_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let product = state
        .products
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound("Product"))?;
    Ok(Json(product))
}

#[axum::debug_handler]
pub async fn patch_product_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<PatchProductRequest>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let product = state
        .products
        .patch(id, req.into_fields())
        .await?
        .ok_or(AppError::NotFound("Product"))?;
    Ok(Json(product))
}

#[axum::debug_handler]
pub async fn remove_product_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    state.products.remove(id).await?;
    Ok(Json(json!({ "id": id })))
}
