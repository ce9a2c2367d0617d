mod handler;
mod model;

pub use handler::{create_article, get_all_articles, get_article_by_id, patch_article_by_id, remove_article_by_id};
pub use model::{CreateArticleRequest, PatchArticleRequest};
