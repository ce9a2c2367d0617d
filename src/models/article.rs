use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const COLLECTION: &str = "articles";

/// 文章文档，存储和响应使用同一结构
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Article {
    pub id: Uuid,
    pub title: String,
    pub text: String,
    pub img: Option<String>,
    pub date: DateTime<Utc>,
}
