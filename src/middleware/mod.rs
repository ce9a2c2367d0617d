mod auth;
mod logging;
mod rate_limit;

pub use auth::{auth_middleware, basic_auth_middleware};
pub use logging::log_requests;
pub use rate_limit::{
    RateLimitConfigError, RateLimitError, RateLimiter, SweepStats, client_key, rate_limit,
};
