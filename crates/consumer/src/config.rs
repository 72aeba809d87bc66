//! Consumer configuration loaded from environment variables.

use std::time::Duration;

/// Upper bound SQS accepts for `MaxNumberOfMessages`.
pub const MAX_BATCH_SIZE: i32 = 10;

/// Upper bound SQS accepts for `WaitTimeSeconds`.
pub const MAX_WAIT_TIME_SECS: u64 = 20;

/// Delay before retrying after a failed receive.
pub const DEFAULT_ERROR_BACKOFF_SECS: u64 = 5;

/// Attribute selector requesting every message attribute.
pub const ALL_ATTRIBUTES: &str = "All";

/// Receive-loop pacing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollerConfig {
    /// Messages requested per receive call (1..=10).
    pub max_messages: i32,
    /// Long-poll wait per receive call.
    pub wait_time: Duration,
    /// Sleep after a failed receive before trying again.
    pub error_backoff: Duration,
    /// Message attribute names to request.
    pub attribute_names: Vec<String>,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            max_messages: MAX_BATCH_SIZE,
            wait_time: Duration::from_secs(MAX_WAIT_TIME_SECS),
            error_backoff: Duration::from_secs(DEFAULT_ERROR_BACKOFF_SECS),
            attribute_names: vec![ALL_ATTRIBUTES.to_string()],
        }
    }
}

impl PollerConfig {
    /// Load pacing overrides from environment variables.
    ///
    /// Out-of-range values are clamped to what SQS accepts.
    ///
    /// | Env Var                  | Default |
    /// |--------------------------|---------|
    /// | `SQS_MAX_MESSAGES`       | `10`    |
    /// | `SQS_WAIT_TIME_SECS`     | `20`    |
    /// | `SQS_ERROR_BACKOFF_SECS` | `5`     |
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let max_messages = std::env::var("SQS_MAX_MESSAGES")
            .ok()
            .and_then(|v| v.parse::<i32>().ok())
            .map(|n| n.clamp(1, MAX_BATCH_SIZE))
            .unwrap_or(defaults.max_messages);

        let wait_time = std::env::var("SQS_WAIT_TIME_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(|s| Duration::from_secs(s.min(MAX_WAIT_TIME_SECS)))
            .unwrap_or(defaults.wait_time);

        let error_backoff = std::env::var("SQS_ERROR_BACKOFF_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.error_backoff);

        Self {
            max_messages,
            wait_time,
            error_backoff,
            ..defaults
        }
    }
}

/// Queue location.
#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    /// Full SQS queue URL.
    pub queue_url: String,
    /// Receive-loop pacing.
    pub poller: PollerConfig,
}

impl ConsumerConfig {
    /// Load from environment variables.
    ///
    /// Returns `None` if `AWS_SQS_QUEUE_URL` is not set. AWS region and
    /// credentials come from the standard `aws-config` chain (`AWS_REGION`,
    /// `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`, profiles, ...).
    pub fn from_env() -> Option<Self> {
        let queue_url = std::env::var("AWS_SQS_QUEUE_URL")
            .ok()
            .filter(|u| !u.trim().is_empty())?;
        Some(Self {
            queue_url,
            poller: PollerConfig::from_env(),
        })
    }
}
