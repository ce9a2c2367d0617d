pub mod article;
pub mod auth;
pub mod email;
pub mod product;
pub mod user;
