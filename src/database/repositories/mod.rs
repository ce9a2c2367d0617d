// 存储库
// 把文档存储中的 JSON 映射为具体的领域类型

pub mod article;
pub mod product;
pub mod user;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::database::{DocumentStore, StoreError};
use crate::models::common::offset;

pub use article::ArticleRepository;
pub use product::ProductRepository;
pub use user::UserRepository;

fn decode<T: DeserializeOwned>(doc: Value) -> Result<T, StoreError> {
    Ok(serde_json::from_value(doc)?)
}

/// 读取一页文档和集合总数
async fn fetch_page<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: &str,
    page_number: u64,
    page_size: u64,
) -> Result<(Vec<T>, u64), StoreError> {
    let total = store.count(collection).await?;
    let docs = store
        .find_page(collection, offset(page_number, page_size), page_size)
        .await?;
    let items = docs.into_iter().map(decode).collect::<Result<Vec<T>, _>>()?;

    tracing::debug!(
        collection,
        page_number,
        page_size,
        total,
        fetched = items.len(),
        "Fetched documents page"
    );

    Ok((items, total))
}
