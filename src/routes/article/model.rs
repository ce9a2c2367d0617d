use serde::Deserialize;
use serde_json::{Map, Value};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateArticleRequest {
    #[validate(length(min = 3))]
    pub title: String,
    #[validate(length(min = 10))]
    pub text: String,
    #[validate(custom(function = "crate::utils::validate_img"))]
    pub img: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PatchArticleRequest {
    #[validate(length(min = 3))]
    pub title: Option<String>,
    #[validate(length(min = 10))]
    pub text: Option<String>,
    #[validate(custom(function = "crate::utils::validate_img"))]
    pub img: Option<String>,
}

impl PatchArticleRequest {
    /// 需要更新的字段，`img` 总是被覆盖（未提供即清空）
    pub fn into_fields(self) -> Map<String, Value> {
        let mut fields = Map::new();
        if let Some(title) = self.title {
            fields.insert("title".into(), Value::String(title));
        }
        if let Some(text) = self.text {
            fields.insert("text".into(), Value::String(text));
        }
        fields.insert("img".into(), self.img.map_or(Value::Null, Value::String));
        fields
    }
}
