use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use edjr_backend::{
    AppState,
    config::Config,
    database::{DocumentStore, MemoryDocumentStore, PgDocumentStore},
    mailer,
    middleware::RateLimiter,
    router::create_router,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = Config::from_env().expect("Failed to load configuration");

    // 文档存储
    let store: Arc<dyn DocumentStore> = match config.database_url.as_deref() {
        Some(url) => Arc::new(
            PgDocumentStore::connect(url)
                .await
                .expect("Failed to connect to Postgres"),
        ),
        None => {
            tracing::warn!("DATABASE_URL is not set, using in-memory document store");
            Arc::new(MemoryDocumentStore::new())
        }
    };

    // 联系表单限流器，配置错误在启动时直接退出
    let rate_limiter = Arc::new(
        RateLimiter::new(
            config.contact_rate_limit_requests,
            config.contact_rate_limit_window(),
            config.contact_block_duration(),
        )
        .expect("Invalid contact rate limit configuration"),
    );
    let shutdown = CancellationToken::new();
    let sweeper = rate_limiter
        .clone()
        .spawn_sweeper(config.rate_limit_sweep_interval(), shutdown.clone())
        .expect("Invalid rate limit sweep interval");

    let mailer = mailer::from_config(&config).expect("Failed to configure mailer");

    let state = AppState::new(config.clone(), store, rate_limiter, Arc::from(mailer));
    let app = create_router(state);

    let addr = SocketAddr::new(
        config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Failed to start server");

    shutdown.cancel();
    if let Err(e) = sweeper.await {
        tracing::error!("Rate limiter sweeper ended abnormally: {}", e);
    }
    tracing::info!("Server shut down gracefully");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
