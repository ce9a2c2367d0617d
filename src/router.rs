use axum::{
    Router,
    http::Method,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};

use crate::{
    AppState,
    middleware::{auth_middleware, basic_auth_middleware, log_requests, rate_limit},
    routes,
};

// 文章和商品：读取公开，写入需要令牌
fn content_routes(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/articles", get(routes::article::get_all_articles))
        .route("/articles/{id}", get(routes::article::get_article_by_id))
        .route("/products", get(routes::product::get_all_products))
        .route("/products/{id}", get(routes::product::get_product_by_id));

    let protected = Router::new()
        .route("/articles", post(routes::article::create_article))
        .route(
            "/articles/{id}",
            axum::routing::patch(routes::article::patch_article_by_id)
                .delete(routes::article::remove_article_by_id),
        )
        .route("/products", post(routes::product::create_product))
        .route(
            "/products/{id}",
            axum::routing::patch(routes::product::patch_product_by_id)
                .delete(routes::product::remove_product_by_id),
        )
        .route_layer(from_fn_with_state(state.clone(), auth_middleware));

    public.merge(protected)
}

// 用户管理：HTTP Basic
fn user_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            post(routes::user::create_user).get(routes::user::get_all_users),
        )
        .route(
            "/users/{id}",
            axum::routing::delete(routes::user::remove_user_by_id),
        )
        .route_layer(from_fn_with_state(state.clone(), basic_auth_middleware))
}

fn auth_routes() -> Router<AppState> {
    Router::new().route("/auth/login", post(routes::auth::login))
}

// 联系表单：限流在请求体解析之前
fn email_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/email", post(routes::email::send_email))
        .route_layer(from_fn_with_state(state.clone(), rate_limit))
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers(Any);

    Router::new()
        .merge(content_routes(&state))
        .merge(user_routes(&state))
        .merge(auth_routes())
        .merge(email_routes(&state))
        .layer(from_fn(log_requests))
        .layer(cors)
        .with_state(state)
}
