use anyhow::{Context, Result, anyhow};
use std::{str::FromStr, time::Duration};

/// Per-call timeouts applied to every backend request.
#[derive(Debug, Clone)]
pub struct BackendTimeouts {
    pub connect: Duration,
    pub default: Duration,
    pub query: Duration,
    pub upload: Duration,
    pub health: Duration,
}

impl Default for BackendTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(5),
            default: Duration::from_secs(10),
            query: Duration::from_secs(60),
            upload: Duration::from_secs(60),
            health: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeouts: BackendTimeouts,
}

impl BackendConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeouts: BackendTimeouts::default(),
        }
    }

    pub fn init() -> Result<Self> {
        let base_url = optional_env("BACKEND_URL")
            .unwrap_or_else(|| "http://127.0.0.1:8000".to_string());

        let timeouts = BackendTimeouts {
            connect: timeout_env("HTTP_CONNECT_TIMEOUT_SECS", 5)?,
            default: timeout_env("HTTP_TIMEOUT_SECS", 10)?,
            query: timeout_env("QUERY_TIMEOUT_SECS", 60)?,
            upload: timeout_env("UPLOAD_TIMEOUT_SECS", 60)?,
            health: timeout_env("HEALTH_TIMEOUT_SECS", 5)?,
        };

        Ok(Self {
            timeouts,
            ..Self::new(base_url)
        })
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub ttl: chrono::Duration,
    pub sweep_interval: Duration,
    pub cookie_name: String,
    pub cookie_secure: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl: chrono::Duration::minutes(30),
            sweep_interval: Duration::from_secs(60),
            cookie_name: "portal_sid".to_string(),
            cookie_secure: false,
        }
    }
}

impl SessionConfig {
    pub fn init() -> Result<Self> {
        let ttl_minutes: i64 = parse_env("SESSION_TTL_MINUTES", 30)?;
        if ttl_minutes <= 0 {
            return Err(anyhow!(
                "SESSION_TTL_MINUTES must be positive, got {ttl_minutes}"
            ));
        }

        let sweep_secs: u64 = parse_env("SESSION_SWEEP_SECS", 60)?;
        let cookie_secure = parse_bool_env("COOKIE_SECURE", false)?;

        Ok(Self {
            ttl: chrono::Duration::minutes(ttl_minutes),
            sweep_interval: Duration::from_secs(sweep_secs.max(1)),
            cookie_secure,
            ..Self::default()
        })
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub backend: BackendConfig,
    pub session: SessionConfig,
    pub frontend_url: String,
    pub otel_endpoint: Option<String>,
    pub dev_mode: bool,
    pub enable_file_log: bool,
}

impl Config {
    pub fn init() -> Result<Self> {
        let port = parse_env("PORT", 8050u16)?;
        let backend = BackendConfig::init().context("Failed to load backend configuration")?;
        let session = SessionConfig::init().context("Failed to load session configuration")?;

        let frontend_url = optional_env("FRONTEND_URL")
            .unwrap_or_else(|| format!("http://localhost:{port}"));
        let otel_endpoint = optional_env("OTEL_ENDPOINT");
        let dev_mode = parse_bool_env("DEV_MODE", false)?;
        let enable_file_log = parse_bool_env("ENABLE_FILE_LOG", false)?;

        Ok(Self {
            port,
            backend,
            session,
            frontend_url,
            otel_endpoint,
            dev_mode,
            enable_file_log,
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: '{raw}'")),
        None => Ok(default),
    }
}

/// Whole seconds, at least one.
fn timeout_env(key: &str, default_secs: u64) -> Result<Duration> {
    let secs: u64 = parse_env(key, default_secs)?;
    if secs == 0 {
        return Err(anyhow!("{key} must be at least 1 second"));
    }
    Ok(Duration::from_secs(secs))
}

fn parse_bool_env(key: &str, default: bool) -> Result<bool> {
    match optional_env(key).as_deref() {
        None => Ok(default),
        Some("true") | Some("1") => Ok(true),
        Some("false") | Some("0") => Ok(false),
        Some(other) => Err(anyhow!("{key} must be 'true' or 'false', got '{other}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_url_is_normalized() {
        let cfg = BackendConfig::new("http://backend:8000/");
        assert_eq!(cfg.base_url, "http://backend:8000");
        assert_eq!(cfg.timeouts.query, Duration::from_secs(60));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let key = "PORTAL_TEST_ZERO_TIMEOUT_SECS";
        unsafe { std::env::set_var(key, "0") };
        let err = timeout_env(key, 10).unwrap_err();
        assert!(err.to_string().contains(key));

        unsafe { std::env::set_var(key, "3") };
        assert_eq!(timeout_env(key, 10).unwrap(), Duration::from_secs(3));

        unsafe { std::env::remove_var(key) };
        assert_eq!(timeout_env(key, 10).unwrap(), Duration::from_secs(10));
    }

    #[test]
    fn session_defaults() {
        let cfg = SessionConfig::default();
        assert_eq!(cfg.ttl, chrono::Duration::minutes(30));
        assert_eq!(cfg.cookie_name, "portal_sid");
        assert!(!cfg.cookie_secure);
    }
}
