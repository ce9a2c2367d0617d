// 请求提取器：带校验的 JSON 请求体和分页参数

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
};
use serde::{Deserialize, de::DeserializeOwned};
use validator::Validate;

use crate::error::AppError;

/// 解析并校验 JSON 请求体
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| {
            tracing::error!("Failed to parse request body: {}", e);
            AppError::InvalidBody(e.body_text())
        })?;

        value.validate().map_err(|e| {
            tracing::error!("Validation failed for request body: {}", e);
            AppError::from(e)
        })?;

        Ok(Self(value))
    }
}

const DEFAULT_PAGE: u64 = 1;
const DEFAULT_PAGE_SIZE: u64 = 10;

#[derive(Debug, Deserialize)]
struct RawPageQuery {
    page: Option<String>,
    size: Option<String>,
}

/// 分页参数 `?page=&size=`，默认第 1 页、每页 10 条
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageQuery {
    pub page: u64,
    pub size: u64,
}

impl PageQuery {
    fn parse(page: Option<&str>, size: Option<&str>) -> Result<Self, AppError> {
        let page = parse_positive(page, DEFAULT_PAGE).ok_or_else(|| {
            tracing::error!("Invalid page number: {:?}", page);
            AppError::BadRequest("Invalid page number".to_string())
        })?;
        let size = parse_positive(size, DEFAULT_PAGE_SIZE).ok_or_else(|| {
            tracing::error!("Invalid page size: {:?}", size);
            AppError::BadRequest("Invalid page size".to_string())
        })?;
        Ok(Self { page, size })
    }
}

fn parse_positive(raw: Option<&str>, default: u64) -> Option<u64> {
    match raw {
        None => Some(default),
        Some(v) => v.trim().parse::<u64>().ok().filter(|n| *n >= 1),
    }
}

impl<S> FromRequestParts<S> for PageQuery
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(raw) = Query::<RawPageQuery>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        PageQuery::parse(raw.page.as_deref(), raw.size.as_deref())
    }
}
