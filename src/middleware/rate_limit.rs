// 按客户端的滑动窗口限流，超限后临时封禁
// 状态只保存在进程内存中，由后台任务定期回收

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{AppState, error::AppError};

/// 构造限流器时的配置错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RateLimitConfigError {
    #[error("rate limit must allow at least one request")]
    ZeroLimit,
    #[error("rate limit window must be longer than zero")]
    ZeroWindow,
    #[error("block duration must be longer than zero")]
    ZeroBlockDuration,
    #[error("sweep interval must be longer than zero")]
    ZeroSweepInterval,
    #[error("{0} must not exceed {max} days", max = MAX_DURATION.as_secs() / 86400)]
    DurationTooLong(&'static str),
}

// 窗口、封禁和清理间隔的上限，保证时间点相加不会溢出
const MAX_DURATION: Duration = Duration::from_secs(10 * 365 * 86400);

fn check_duration(
    value: Duration,
    zero: RateLimitConfigError,
    name: &'static str,
) -> Result<(), RateLimitConfigError> {
    if value.is_zero() {
        return Err(zero);
    }
    if value > MAX_DURATION || Instant::now().checked_add(value).is_none() {
        return Err(RateLimitConfigError::DurationTooLong(name));
    }
    Ok(())
}

/// 请求被拒绝的原因
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RateLimitError {
    #[error("client {key} is blocked until {until}")]
    Blocked { key: String, until: DateTime<Utc> },
    #[error("client {key} exceeded the request limit and is blocked for {}s", block.as_secs())]
    LimitExceeded { key: String, block: Duration },
}

/// 一次后台清理回收的条目数
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepStats {
    pub expired_blocks: usize,
    pub dropped_keys: usize,
}

#[derive(Default)]
struct LimiterState {
    requests: HashMap<String, Vec<Instant>>,
    blocked: HashMap<String, Instant>,
}

/// 滑动窗口限流器
///
/// 两张表共用一把锁，每次检查或清理都在同一个临界区内完成。
pub struct RateLimiter {
    limit: usize,
    window: Duration,
    block_duration: Duration,
    state: Mutex<LimiterState>,
}

impl RateLimiter {
    pub fn new(
        limit: usize,
        window: Duration,
        block_duration: Duration,
    ) -> Result<Self, RateLimitConfigError> {
        if limit == 0 {
            return Err(RateLimitConfigError::ZeroLimit);
        }
        check_duration(window, RateLimitConfigError::ZeroWindow, "rate limit window")?;
        check_duration(
            block_duration,
            RateLimitConfigError::ZeroBlockDuration,
            "block duration",
        )?;

        Ok(Self {
            limit,
            window,
            block_duration,
            state: Mutex::new(LimiterState::default()),
        })
    }

    /// 检查一次请求，`Ok(())` 表示放行
    pub fn validate_request(&self, client_key: &str) -> Result<(), RateLimitError> {
        self.check_at(client_key, Instant::now())
    }

    pub(crate) fn check_at(&self, client_key: &str, now: Instant) -> Result<(), RateLimitError> {
        let mut state = self.state.lock();

        if let Some(&until) = state.blocked.get(client_key) {
            if now < until {
                return Err(RateLimitError::Blocked {
                    key: client_key.to_owned(),
                    until: wall_clock(until - now),
                });
            }
            state.blocked.remove(client_key);
        }

        let mut recent = state.requests.remove(client_key).unwrap_or_default();
        recent.retain(|&t| now.saturating_duration_since(t) <= self.window);

        if recent.len() >= self.limit {
            // 请求记录已经被移除，解封后从空窗口开始
            // block_duration 在构造时已限制在 MAX_DURATION 以内
            state
                .blocked
                .insert(client_key.to_owned(), now + self.block_duration);
            return Err(RateLimitError::LimitExceeded {
                key: client_key.to_owned(),
                block: self.block_duration,
            });
        }

        recent.push(now);
        state.requests.insert(client_key.to_owned(), recent);
        Ok(())
    }

    pub(crate) fn sweep_at(&self, now: Instant) -> SweepStats {
        let mut state = self.state.lock();
        let mut stats = SweepStats::default();

        let blocks_before = state.blocked.len();
        state.blocked.retain(|_, until| now < *until);
        stats.expired_blocks = blocks_before - state.blocked.len();

        let window = self.window;
        let keys_before = state.requests.len();
        state.requests.retain(|_, times| {
            times.retain(|&t| now.saturating_duration_since(t) <= window);
            !times.is_empty()
        });
        stats.dropped_keys = keys_before - state.requests.len();

        stats
    }

    /// 当前被跟踪的客户端数量（请求记录和封禁表）
    pub fn tracked_clients(&self) -> (usize, usize) {
        let state = self.state.lock();
        (state.requests.len(), state.blocked.len())
    }

    /// 启动后台清理任务，取消 `shutdown` 后任务退出
    pub fn spawn_sweeper(
        self: Arc<Self>,
        interval: Duration,
        shutdown: CancellationToken,
    ) -> Result<JoinHandle<()>, RateLimitConfigError> {
        check_duration(interval, RateLimitConfigError::ZeroSweepInterval, "sweep interval")?;

        Ok(tokio::spawn(async move {
            let start = tokio::time::Instant::now() + interval;
            let mut ticker = tokio::time::interval_at(start, interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => {
                        tracing::debug!("Rate limiter sweeper stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        let stats = self.sweep_at(Instant::now());
                        let (active, blocked) = self.tracked_clients();
                        tracing::info!(
                            expired_blocks = stats.expired_blocks,
                            dropped_keys = stats.dropped_keys,
                            active,
                            blocked,
                            "Rate limiter sweep completed"
                        );
                    }
                }
            }
        }))
    }
}

fn wall_clock(remaining: Duration) -> DateTime<Utc> {
    let remaining = chrono::Duration::from_std(remaining).unwrap_or_else(|_| chrono::Duration::zero());
    Utc::now() + remaining
}

/// 解析调用方的客户端标识
///
/// 转发头可以被伪造，只有在部署于可信代理之后才应该打开 `trust_forwarded`。
pub fn client_key(req: &Request<Body>, trust_forwarded: bool) -> String {
    let remote_ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip().to_string());

    let forwarded = if trust_forwarded {
        req.headers()
            .get("x-real-ip")
            .and_then(|h| h.to_str().ok())
            .filter(|ip| !ip.trim().is_empty())
            .or_else(|| {
                req.headers()
                    .get("x-forwarded-for")
                    .and_then(|h| h.to_str().ok())
                    .and_then(|s| s.split(',').find(|ip| !ip.trim().is_empty()))
            })
    } else {
        None
    };

    forwarded
        .or(remote_ip.as_deref())
        .unwrap_or("unknown")
        .trim()
        .to_string()
}

pub async fn rate_limit(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let key = client_key(&req, state.config.trust_forwarded_headers);

    if let Err(e) = state.rate_limiter.validate_request(&key) {
        tracing::warn!(client = %key, reason = %e, "Rate limit exceeded");
        return Err(AppError::TooManyRequests);
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const MINUTE: Duration = Duration::from_secs(60);

    fn limiter(limit: usize, window: Duration, block: Duration) -> RateLimiter {
        RateLimiter::new(limit, window, block).unwrap()
    }

    #[test]
    fn rejects_invalid_configuration() {
        assert_eq!(
            RateLimiter::new(0, MINUTE, MINUTE).err(),
            Some(RateLimitConfigError::ZeroLimit)
        );
        assert_eq!(
            RateLimiter::new(3, Duration::ZERO, MINUTE).err(),
            Some(RateLimitConfigError::ZeroWindow)
        );
        assert_eq!(
            RateLimiter::new(3, MINUTE, Duration::ZERO).err(),
            Some(RateLimitConfigError::ZeroBlockDuration)
        );
    }

    #[test]
    fn rejects_durations_that_would_overflow() {
        assert_eq!(
            RateLimiter::new(1, MINUTE, Duration::from_secs(u64::MAX)).err(),
            Some(RateLimitConfigError::DurationTooLong("block duration"))
        );
        assert_eq!(
            RateLimiter::new(1, Duration::MAX, MINUTE).err(),
            Some(RateLimitConfigError::DurationTooLong("rate limit window"))
        );

        // 上限以内的长封禁照常生效
        let rl = limiter(1, MINUTE, MAX_DURATION);
        let t0 = Instant::now();
        assert!(rl.check_at("k", t0).is_ok());
        assert!(matches!(
            rl.check_at("k", t0),
            Err(RateLimitError::LimitExceeded { .. })
        ));
        assert!(matches!(
            rl.check_at("k", t0 + 365 * 24 * 60 * MINUTE),
            Err(RateLimitError::Blocked { .. })
        ));
    }

    #[test]
    fn allows_limit_then_blocks_next_request() {
        let rl = limiter(3, MINUTE, 5 * MINUTE);
        let t0 = Instant::now();

        for i in 0..3 {
            assert!(rl.check_at("k", t0 + Duration::from_secs(i)).is_ok());
        }
        let err = rl.check_at("k", t0 + Duration::from_secs(4)).unwrap_err();
        assert!(matches!(err, RateLimitError::LimitExceeded { .. }));

        let err = rl.check_at("k", t0 + Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, RateLimitError::Blocked { .. }));
    }

    #[test]
    fn scenario_block_lifecycle() {
        let rl = limiter(3, MINUTE, 5 * MINUTE);
        let t0 = Instant::now();
        let key = "1.2.3.4";

        assert!(rl.check_at(key, t0).is_ok());
        assert!(rl.check_at(key, t0 + Duration::from_secs(5)).is_ok());
        assert!(rl.check_at(key, t0 + Duration::from_secs(10)).is_ok());

        let fourth = t0 + Duration::from_secs(15);
        assert!(matches!(
            rl.check_at(key, fourth),
            Err(RateLimitError::LimitExceeded { .. })
        ));

        assert!(matches!(
            rl.check_at(key, fourth + 4 * MINUTE),
            Err(RateLimitError::Blocked { .. })
        ));
        assert!(rl.check_at(key, fourth + 6 * MINUTE).is_ok());
    }

    #[test]
    fn request_at_block_expiry_is_allowed() {
        let rl = limiter(1, MINUTE, MINUTE);
        let t0 = Instant::now();

        assert!(rl.check_at("k", t0).is_ok());
        assert!(rl.check_at("k", t0).is_err());
        assert!(rl.check_at("k", t0 + MINUTE - Duration::from_millis(1)).is_err());
        assert!(rl.check_at("k", t0 + MINUTE).is_ok());
    }

    #[test]
    fn rejections_while_blocked_do_not_extend_block() {
        let rl = limiter(1, MINUTE, 2 * MINUTE);
        let t0 = Instant::now();

        assert!(rl.check_at("k", t0).is_ok());
        assert!(rl.check_at("k", t0).is_err());
        for s in (10..120).step_by(10) {
            assert!(rl.check_at("k", t0 + Duration::from_secs(s)).is_err());
        }
        assert!(rl.check_at("k", t0 + 2 * MINUTE).is_ok());
    }

    #[test]
    fn unblocked_client_starts_with_empty_window() {
        let rl = limiter(2, 10 * MINUTE, MINUTE);
        let t0 = Instant::now();

        assert!(rl.check_at("k", t0).is_ok());
        assert!(rl.check_at("k", t0).is_ok());
        assert!(rl.check_at("k", t0).is_err());

        // 窗口远长于封禁时间，若历史未清空这里会再次触发封禁
        let after = t0 + MINUTE;
        assert!(rl.check_at("k", after).is_ok());
        assert!(rl.check_at("k", after).is_ok());
        assert!(rl.check_at("k", after).is_err());
    }

    #[test]
    fn idle_client_log_behaves_as_empty() {
        let rl = limiter(2, MINUTE, 5 * MINUTE);
        let t0 = Instant::now();

        assert!(rl.check_at("k", t0).is_ok());
        assert!(rl.check_at("k", t0 + Duration::from_secs(1)).is_ok());

        let later = t0 + 2 * MINUTE;
        assert!(rl.check_at("k", later).is_ok());
        assert!(rl.check_at("k", later).is_ok());
        assert!(rl.check_at("k", later).is_err());
    }

    #[test]
    fn clients_are_counted_independently() {
        let rl = limiter(3, MINUTE, 5 * MINUTE);
        let t0 = Instant::now();

        for i in 0..3 {
            let t = t0 + Duration::from_secs(i);
            assert!(rl.check_at("A", t).is_ok());
            assert!(rl.check_at("B", t).is_ok());
        }
        assert!(rl.check_at("A", t0 + Duration::from_secs(5)).is_err());
        assert!(rl.check_at("B", t0 + Duration::from_secs(5)).is_err());
        assert!(rl.check_at("C", t0 + Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn sweep_keeps_only_fresh_timestamps() {
        let rl = limiter(5, MINUTE, 5 * MINUTE);
        let t0 = Instant::now();

        assert!(rl.check_at("k", t0).is_ok());
        assert!(rl.check_at("k", t0 + Duration::from_secs(50)).is_ok());

        let stats = rl.sweep_at(t0 + Duration::from_secs(90));
        assert_eq!(stats, SweepStats::default());
        assert_eq!(rl.tracked_clients(), (1, 0));

        let state = rl.state.lock();
        assert_eq!(state.requests["k"], vec![t0 + Duration::from_secs(50)]);
    }

    #[test]
    fn sweep_drops_idle_keys_and_expired_blocks() {
        let rl = limiter(1, MINUTE, MINUTE);
        let t0 = Instant::now();

        assert!(rl.check_at("idle", t0).is_ok());
        assert!(rl.check_at("blocked", t0).is_ok());
        assert!(rl.check_at("blocked", t0).is_err());
        assert_eq!(rl.tracked_clients(), (1, 1));

        let stats = rl.sweep_at(t0 + 2 * MINUTE);
        assert_eq!(
            stats,
            SweepStats {
                expired_blocks: 1,
                dropped_keys: 1
            }
        );
        assert_eq!(rl.tracked_clients(), (0, 0));
    }

    #[test]
    fn sweep_leaves_active_block_in_place() {
        let rl = limiter(1, MINUTE, 10 * MINUTE);
        let t0 = Instant::now();

        assert!(rl.check_at("k", t0).is_ok());
        assert!(rl.check_at("k", t0).is_err());

        rl.sweep_at(t0 + 5 * MINUTE);
        assert!(matches!(
            rl.check_at("k", t0 + 5 * MINUTE),
            Err(RateLimitError::Blocked { .. })
        ));
    }

    #[test]
    fn concurrent_requests_for_one_key_allow_exactly_limit() {
        let limit = 5;
        let rl = Arc::new(limiter(limit, MINUTE, MINUTE));
        let allowed = Arc::new(AtomicUsize::new(0));
        let rejected = Arc::new(AtomicUsize::new(0));

        let threads: Vec<_> = (0..8)
            .map(|_| {
                let rl = Arc::clone(&rl);
                let allowed = Arc::clone(&allowed);
                let rejected = Arc::clone(&rejected);
                std::thread::spawn(move || {
                    for _ in 0..limit * 4 {
                        match rl.validate_request("shared") {
                            Ok(()) => allowed.fetch_add(1, Ordering::SeqCst),
                            Err(_) => rejected.fetch_add(1, Ordering::SeqCst),
                        };
                    }
                })
            })
            .collect();

        for t in threads {
            t.join().unwrap();
        }

        assert_eq!(allowed.load(Ordering::SeqCst), limit);
        assert_eq!(rejected.load(Ordering::SeqCst), 8 * limit * 4 - limit);
    }

    #[test]
    fn client_key_prefers_forwarded_headers_when_trusted() {
        let req = Request::builder()
            .header("x-forwarded-for", " , 10.0.0.1, 10.0.0.2")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_key(&req, true), "10.0.0.1");
        assert_eq!(client_key(&req, false), "unknown");

        let mut req = Request::builder()
            .header("x-real-ip", "192.168.1.7")
            .body(Body::empty())
            .unwrap();
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 4000))));
        assert_eq!(client_key(&req, true), "192.168.1.7");
        assert_eq!(client_key(&req, false), "127.0.0.1");
    }

    #[tokio::test]
    async fn sweeper_stops_on_cancellation() {
        let rl = Arc::new(limiter(1, MINUTE, MINUTE));
        let token = CancellationToken::new();
        let handle = Arc::clone(&rl)
            .spawn_sweeper(Duration::from_millis(10), token.clone())
            .unwrap();

        tokio::time::sleep(Duration::from_millis(30)).await;
        token.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn sweeper_rejects_invalid_interval() {
        let rl = Arc::new(limiter(1, MINUTE, MINUTE));
        let token = CancellationToken::new();

        assert_eq!(
            Arc::clone(&rl)
                .spawn_sweeper(Duration::ZERO, token.clone())
                .err(),
            Some(RateLimitConfigError::ZeroSweepInterval)
        );
        assert_eq!(
            Arc::clone(&rl)
                .spawn_sweeper(Duration::MAX, token)
                .err(),
            Some(RateLimitConfigError::DurationTooLong("sweep interval"))
        );
    }
}
