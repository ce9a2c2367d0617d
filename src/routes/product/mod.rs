mod handler;
mod model;

pub use handler::{create_product, get_all_products, get_product_by_id, patch_product_by_id, remove_product_by_id};
pub use model::{CreateProductRequest, PatchProductRequest};
