//! Host configuration.
//!
//! One [`ServerConfig`] covers the whole process: the listener, the browser
//! origins allowed to open the WebSocket, the queue the consumer polls and
//! how long shutdown waits for the consumer's last receive to drain.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use axum::http::HeaderValue;
use storefront_consumer::{ConsumerConfig, PollerConfig};

/// Slack added on top of the long-poll wait when no shutdown grace is set.
const SHUTDOWN_MARGIN: Duration = Duration::from_secs(10);

/// Origin value that allows any browser origin.
pub const ANY_ORIGIN: &str = "*";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} has an invalid value '{value}'")]
    Invalid { var: &'static str, value: String },
}

/// Which origins may call the API from a browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedOrigins {
    Any,
    List(Vec<HeaderValue>),
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub allowed_origins: AllowedOrigins,
    /// Queue location and receive-loop pacing.
    pub consumer: ConsumerConfig,
    /// Upper bound on waiting for the consumer loop after the listener closes.
    pub shutdown_grace: Duration,
}

impl ServerConfig {
    /// Load from the process environment.
    ///
    /// | Env Var                 | Default                          |
    /// |-------------------------|----------------------------------|
    /// | `AWS_SQS_QUEUE_URL`     | required                         |
    /// | `HOST`                  | `0.0.0.0`                        |
    /// | `PORT`                  | `3000`                           |
    /// | `CORS_ORIGINS`          | `*`                              |
    /// | `SHUTDOWN_TIMEOUT_SECS` | long-poll wait + 10 s            |
    ///
    /// Receive-loop pacing comes from [`PollerConfig::from_env`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let consumer =
            ConsumerConfig::from_env().ok_or(ConfigError::Missing("AWS_SQS_QUEUE_URL"))?;
        Self::from_vars(consumer, |key| std::env::var(key).ok())
    }

    fn from_vars(
        consumer: ConsumerConfig,
        var: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let host: IpAddr = parse_var(&var, "HOST", "0.0.0.0")?;
        let port: u16 = parse_var(&var, "PORT", "3000")?;

        let origins = var("CORS_ORIGINS").unwrap_or_else(|| ANY_ORIGIN.into());
        let allowed_origins = parse_origins(&origins)?;

        let shutdown_grace = match var("SHUTDOWN_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(raw.trim().parse().map_err(|_| {
                ConfigError::Invalid {
                    var: "SHUTDOWN_TIMEOUT_SECS",
                    value: raw.clone(),
                }
            })?),
            None => default_shutdown_grace(&consumer.poller),
        };

        Ok(Self {
            bind_addr: SocketAddr::new(host, port),
            allowed_origins,
            consumer,
            shutdown_grace,
        })
    }
}

/// Long enough for an in-flight long poll to return and its batch to finish.
pub fn default_shutdown_grace(poller: &PollerConfig) -> Duration {
    poller.wait_time + SHUTDOWN_MARGIN
}

fn parse_var<T: std::str::FromStr>(
    var: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: &str,
) -> Result<T, ConfigError> {
    let raw = var(key).unwrap_or_else(|| default.to_string());
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        var: key,
        value: raw.clone(),
    })
}

fn parse_origins(raw: &str) -> Result<AllowedOrigins, ConfigError> {
    let entries: Vec<&str> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if entries.is_empty() || entries.contains(&ANY_ORIGIN) {
        return Ok(AllowedOrigins::Any);
    }

    entries
        .into_iter()
        .map(|origin| {
            HeaderValue::from_str(origin).map_err(|_| ConfigError::Invalid {
                var: "CORS_ORIGINS",
                value: origin.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(AllowedOrigins::List)
}
