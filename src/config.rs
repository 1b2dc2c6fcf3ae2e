use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub backend: BackendConfig,
    pub server: ServerConfig,
    pub session: SessionConfig,
    pub wire_format_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub static_dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub capacity: usize,
    pub notification_ttl_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendConfig {
                base_url: "http://127.0.0.1:5000".to_string(),
                timeout_secs: 30,
            },
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                static_dir: None,
            },
            session: SessionConfig {
                capacity: 256,
                notification_ttl_secs: 5,
            },
            wire_format_path: None,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            backend: BackendConfig {
                base_url: env::var("BACKEND_URL").unwrap_or(defaults.backend.base_url),
                timeout_secs: env::var("BACKEND_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.backend.timeout_secs),
            },
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: env::var("SERVER_PORT")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.server.port),
                static_dir: env::var("STATIC_DIR").ok().filter(|dir| !dir.is_empty()),
            },
            session: SessionConfig {
                capacity: env::var("SESSION_CAPACITY")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .filter(|capacity: &usize| *capacity > 0)
                    .unwrap_or(defaults.session.capacity),
                notification_ttl_secs: match env::var("NOTIFICATION_TTL_SECS") {
                    Ok(raw) => parse_notification_ttl(&raw)?,
                    Err(_) => defaults.session.notification_ttl_secs,
                },
            },
            wire_format_path: env::var("WIRE_FORMAT_PATH").ok().filter(|p| !p.is_empty()),
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn backend_timeout(&self) -> Duration {
        Duration::from_secs(self.backend.timeout_secs)
    }

    /// Capped at [`MAX_NOTIFICATION_TTL_SECS`] for configs built by hand.
    pub fn notification_ttl(&self) -> chrono::Duration {
        i64::try_from(self.session.notification_ttl_secs.min(MAX_NOTIFICATION_TTL_SECS))
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or_else(|| chrono::Duration::seconds(MAX_NOTIFICATION_TTL_SECS as i64))
    }
}

/// One day; toasts are transient.
pub const MAX_NOTIFICATION_TTL_SECS: u64 = 86_400;

fn parse_notification_ttl(raw: &str) -> anyhow::Result<u64> {
    let secs: u64 = raw
        .trim()
        .parse()
        .map_err(|e| anyhow::anyhow!("NOTIFICATION_TTL_SECS must be a number of seconds: {}", e))?;
    if secs > MAX_NOTIFICATION_TTL_SECS {
        anyhow::bail!(
            "NOTIFICATION_TTL_SECS must be at most {}, got {}",
            MAX_NOTIFICATION_TTL_SECS,
            secs
        );
    }
    Ok(secs)
}
