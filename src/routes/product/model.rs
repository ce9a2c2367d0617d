use serde::Deserialize;
use serde_json::{Map, Value};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    #[validate(length(min = 3))]
    pub title: String,
    #[validate(length(min = 10, max = 20000))]
    pub text: String,
    #[validate(length(min = 10, max = 10000))]
    pub short_text: String,
    #[validate(custom(function = "crate::utils::validate_img"))]
    pub img: Option<String>,
}

/// 部分更新，`shortText` 为必填
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PatchProductRequest {
    #[validate(length(min = 3))]
    pub title: Option<String>,
    #[validate(length(min = 10, max = 20000))]
    pub text: Option<String>,
    #[validate(length(min = 10, max = 10000))]
    pub short_text: String,
    #[validate(custom(function = "crate::utils::validate_img"))]
    pub img: Option<String>,
}

impl PatchProductRequest {
    pub fn into_fields(self) -> Map<String, Value> {
        let mut fields = Map::new();
        if let Some(title) = self.title {
            fields.insert("title".into(), Value::String(title));
        }
        if let Some(text) = self.text {
            fields.insert("text".into(), Value::String(text));
        }
        fields.insert("shortText".into(), Value::String(self.short_text));
        fields.insert("img".into(), self.img.map_or(Value::Null, Value::String));
        fields
    }
}
