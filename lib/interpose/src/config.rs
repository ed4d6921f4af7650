//! Transport settings for [`crate::HyperClient`].
//!
//! Interceptor chains have no settings of their own. Everything here shapes
//! the default network primitive only.

use std::time::Duration;

/// `User-Agent` used when none is configured.
pub const DEFAULT_USER_AGENT: &str = concat!("interpose/", env!("CARGO_PKG_VERSION"));

/// Idle connection pool settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// Idle connections kept per host.
    pub max_idle_per_host: usize,
    /// How long an idle connection is kept before closing.
    pub idle_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_idle_per_host: 32,
            idle_timeout: Duration::from_secs(90),
        }
    }
}

/// Settings read by [`crate::HyperClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Upper bound for one exchange, from sending the request to receiving
    /// the response head. Exceeding it yields [`crate::Error::Timeout`].
    pub timeout: Duration,
    /// Upper bound for establishing the TCP connection.
    pub connect_timeout: Duration,
    /// Connection reuse.
    pub pool: PoolConfig,
    /// Added to requests that carry no `User-Agent` header.
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            pool: PoolConfig::default(),
            user_agent: Some(DEFAULT_USER_AGENT.to_owned()),
        }
    }
}

impl ClientConfig {
    /// Start from the defaults.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }
}

/// Edits a [`ClientConfig`], starting from its defaults.
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl From<ClientConfig> for ClientConfigBuilder {
    fn from(config: ClientConfig) -> Self {
        Self { config }
    }
}

impl ClientConfigBuilder {
    /// See [`ClientConfig::timeout`].
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// See [`ClientConfig::connect_timeout`].
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Replace the pool settings.
    #[must_use]
    pub fn pool(mut self, pool: PoolConfig) -> Self {
        self.config.pool = pool;
        self
    }

    /// Use this `User-Agent` for requests without one.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = Some(user_agent.into());
        self
    }

    /// Leave `User-Agent` to the caller.
    #[must_use]
    pub fn without_user_agent(mut self) -> Self {
        self.config.user_agent = None;
        self
    }

    /// Finish editing.
    #[must_use]
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untouched_builder_yields_defaults() {
        assert_eq!(ClientConfig::builder().build(), ClientConfig::default());
        assert_eq!(
            ClientConfig::default().user_agent.as_deref(),
            Some(DEFAULT_USER_AGENT)
        );
    }

    #[test]
    fn edits_keep_other_settings() {
        let pool = PoolConfig {
            max_idle_per_host: 4,
            ..PoolConfig::default()
        };
        let config = ClientConfig::builder()
            .connect_timeout(Duration::from_secs(2))
            .pool(pool)
            .build();

        assert_eq!(config.connect_timeout, Duration::from_secs(2));
        assert_eq!(config.pool.max_idle_per_host, 4);
        assert_eq!(config.pool.idle_timeout, Duration::from_secs(90));
        assert_eq!(config.timeout, ClientConfig::default().timeout);
    }

    #[test]
    fn user_agent_can_be_replaced_or_dropped() {
        let config = ClientConfig::builder().user_agent("crawler/1.0").build();
        assert_eq!(config.user_agent.as_deref(), Some("crawler/1.0"));

        let config = ClientConfig::builder()
            .user_agent("crawler/1.0")
            .without_user_agent()
            .build();
        assert!(config.user_agent.is_none());
    }
}
