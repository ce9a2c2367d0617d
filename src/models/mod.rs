pub mod article;
pub mod common;
pub mod product;
pub mod user;

pub use article::Article;
pub use common::Paginate;
pub use product::Product;
pub use user::{UserDocument, UserResponse};
