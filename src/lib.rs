use std::sync::Arc;

use config::Config;
use database::{
    DocumentStore,
    repositories::{ArticleRepository, ProductRepository, UserRepository},
};
use mailer::Mailer;
use middleware::RateLimiter;

pub mod config;
pub mod database;
pub mod error;
pub mod extract;
pub mod mailer;
pub mod middleware;
pub mod models;
pub mod router;
pub mod routes;
pub mod utils;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub articles: ArticleRepository,
    pub products: ProductRepository,
    pub users: UserRepository,
    pub rate_limiter: Arc<RateLimiter>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn DocumentStore>,
        rate_limiter: Arc<RateLimiter>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            config,
            articles: ArticleRepository::new(store.clone()),
            products: ProductRepository::new(store.clone()),
            users: UserRepository::new(store),
            rate_limiter,
            mailer,
        }
    }
}
