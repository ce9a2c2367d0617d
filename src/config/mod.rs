use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub jwt_expiration_secs: u64,
    pub server_host: String,
    pub server_port: u16,
    pub admin_username: String,
    pub admin_password: String,
    pub contact_rate_limit_requests: usize,
    pub contact_rate_limit_window_secs: u64,
    pub contact_block_secs: u64,
    pub rate_limit_sweep_secs: u64,
    pub trust_forwarded_headers: bool,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub mail_from: Option<String>,
    pub mail_to: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            jwt_secret: String::new(),
            jwt_expiration_secs: 24 * 3600,
            server_host: "0.0.0.0".into(),
            server_port: 3000,
            admin_username: String::new(),
            admin_password: String::new(),
            // 3 次/分钟，超限封禁 5 分钟，每天清理一次
            contact_rate_limit_requests: 3,
            contact_rate_limit_window_secs: 60,
            contact_block_secs: 300,
            rate_limit_sweep_secs: 24 * 3600,
            trust_forwarded_headers: true,
            smtp_host: "smtp.gmail.com".into(),
            smtp_port: 587,
            smtp_username: None,
            smtp_password: None,
            mail_from: None,
            mail_to: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();

        let defaults = Config::default();

        let jwt_expiration = env::var("JWT_EXPIRATION")
            .ok()
            .and_then(|v| v.trim_end_matches('h').parse::<u64>().ok())
            .unwrap_or(24);

        Ok(Config {
            database_url: optional("DATABASE_URL"),
            jwt_secret: env::var("JWT_SECRET")?,
            jwt_expiration_secs: jwt_expiration * 3600,
            server_host: env::var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: parsed("SERVER_PORT", defaults.server_port),
            admin_username: env::var("ADMIN_USERNAME")?,
            admin_password: env::var("ADMIN_PASSWORD")?,
            contact_rate_limit_requests: parsed(
                "CONTACT_RATE_LIMIT_REQUESTS",
                defaults.contact_rate_limit_requests,
            ),
            contact_rate_limit_window_secs: parsed(
                "CONTACT_RATE_LIMIT_WINDOW",
                defaults.contact_rate_limit_window_secs,
            ),
            contact_block_secs: parsed("CONTACT_BLOCK_DURATION", defaults.contact_block_secs),
            rate_limit_sweep_secs: parsed("RATE_LIMIT_SWEEP_INTERVAL", defaults.rate_limit_sweep_secs),
            trust_forwarded_headers: parsed(
                "TRUST_FORWARDED_HEADERS",
                defaults.trust_forwarded_headers,
            ),
            smtp_host: env::var("SMTP_HOST").unwrap_or(defaults.smtp_host),
            smtp_port: parsed("SMTP_PORT", defaults.smtp_port),
            smtp_username: optional("SMTP_USERNAME"),
            smtp_password: optional("SMTP_PASSWORD"),
            mail_from: optional("MAIL_FROM"),
            mail_to: optional("MAIL_TO"),
        })
    }

    pub fn jwt_expiration(&self) -> Duration {
        Duration::from_secs(self.jwt_expiration_secs)
    }

    pub fn contact_rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.contact_rate_limit_window_secs)
    }

    pub fn contact_block_duration(&self) -> Duration {
        Duration::from_secs(self.contact_block_secs)
    }

    pub fn rate_limit_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.rate_limit_sweep_secs)
    }
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parsed<T: FromStr>(name: &str, default: T) -> T {
    parse_or(env::var(name).ok().as_deref(), default)
}

fn parse_or<T: FromStr>(raw: Option<&str>, default: T) -> T {
    match raw.map(str::trim) {
        Some(v) => v.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid configuration value {:?}, using default", v);
            default
        }),
        None => default,
    }
}
