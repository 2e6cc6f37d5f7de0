//! Configuration consumed by [`FluentSender`](super::FluentSender).
//!
//! [`SenderBuilder`](crate::builder::SenderBuilder) validates user input
//! before producing these values; constructing a `SenderConfig` directly
//! skips that validation.

use std::time::Duration;

use crate::rate_limited_warner::DEFAULT_WARN_INTERVAL;

use super::transport::{Endpoint, TcpEndpoint};

/// Default collector host.
pub const DEFAULT_HOST: &str = "localhost";
/// Default collector port used by Fluentd's forward input.
pub const DEFAULT_PORT: u16 = 24224;
/// Default ceiling (in bytes) for unsent data retained after a failure.
pub const DEFAULT_BUFFER_MAX: usize = 1 << 20; // 1 MiB
/// Default timeout applied to connects and socket I/O.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// Configuration object describing how to construct a [`FluentSender`](super::FluentSender).
#[derive(Clone, Debug)]
pub struct SenderConfig {
    /// Base tag prefixed to every event.
    pub tag: String,
    pub endpoint: Endpoint,
    pub timeout: Duration,
    /// Ceiling for the pending buffer.
    pub buffer_max: usize,
    pub verbose: bool,
    pub warn_interval: Duration,
}

impl SenderConfig {
    /// Build a configuration for `tag` using the default endpoint and limits.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            endpoint: Endpoint::Tcp(TcpEndpoint {
                host: DEFAULT_HOST.into(),
                port: DEFAULT_PORT,
            }),
            timeout: DEFAULT_TIMEOUT,
            buffer_max: DEFAULT_BUFFER_MAX,
            verbose: false,
            warn_interval: DEFAULT_WARN_INTERVAL,
        }
    }

    /// Override the endpoint.
    pub fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Timeout for connects and socket I/O. Must be non-zero: a zero timeout
    /// makes every connect fail with `InvalidInput`, so events are buffered
    /// and eventually dropped without ever reaching the collector.
    /// [`SenderBuilder`](crate::builder::SenderBuilder) rejects it.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_buffer_max(mut self, buffer_max: usize) -> Self {
        self.buffer_max = buffer_max;
        self
    }

    /// Enable packet and failure diagnostics on the `log` facade.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}
