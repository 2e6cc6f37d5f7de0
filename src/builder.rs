//! Builder for [`FluentSender`].
//!
//! Exposes endpoint selection, timeout tuning and buffer limits, validating
//! them before a sender is constructed. Defaults match the Fluentd forward
//! input: `localhost:24224`, a 3 second timeout and a 1 MiB buffer ceiling.

use std::{path::PathBuf, time::Duration};

use thiserror::Error;

use crate::sender::{DEFAULT_PORT, Endpoint, FluentSender, SenderConfig, UnixEndpoint};

/// Errors that may occur while building a sender.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SenderBuildError {
    /// Invalid user supplied configuration.
    #[error("invalid sender configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Clone, Debug)]
enum TransportConfig {
    /// Host string, possibly carrying the `unix://` scheme.
    Host(String),
    Unix(PathBuf),
}

macro_rules! ensure_positive {
    ($value:expr, $field:expr) => {{
        if $value == 0 {
            Err(SenderBuildError::InvalidConfig(format!(
                "{} must be greater than zero",
                $field
            )))
        } else {
            Ok($value)
        }
    }};
}

/// Builder for constructing [`FluentSender`] instances.
#[derive(Clone, Debug)]
pub struct SenderBuilder {
    tag: String,
    transport: Option<TransportConfig>,
    port: Option<u16>,
    timeout_secs: Option<f64>,
    buffer_max: Option<usize>,
    verbose: bool,
    warn_interval: Option<Duration>,
}

impl SenderBuilder {
    /// Create a builder for events tagged with `tag`.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            transport: None,
            port: None,
            timeout_secs: None,
            buffer_max: None,
            verbose: false,
            warn_interval: None,
        }
    }

    /// Set the collector host. A `unix://<path>` host selects a Unix domain
    /// socket and causes the port to be ignored.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.transport = Some(TransportConfig::Host(host.into()));
        self
    }

    /// Set the TCP port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Target a Unix domain socket at `path`.
    pub fn with_unix_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.transport = Some(TransportConfig::Unix(path.into()));
        self
    }

    /// Timeout applied to connects and socket writes.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = Some(timeout.as_secs_f64());
        self
    }

    pub fn with_timeout_secs(mut self, secs: f64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Ceiling in bytes for data retained after failed sends. Zero disables
    /// retention.
    pub fn with_buffer_max(mut self, buffer_max: usize) -> Self {
        self.buffer_max = Some(buffer_max);
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Minimum spacing between warnings about discarded buffers.
    pub fn with_warn_interval(mut self, interval: Duration) -> Self {
        self.warn_interval = Some(interval);
        self
    }

    fn validate(&self) -> Result<(), SenderBuildError> {
        self.validate_tag()?;
        self.validate_transport()?;
        self.validate_timeout()?;
        Ok(())
    }

    fn validate_tag(&self) -> Result<(), SenderBuildError> {
        let tag = self.tag.as_str();
        if tag.trim().is_empty() {
            return Err(SenderBuildError::InvalidConfig(
                "tag must not be empty".into(),
            ));
        }
        if tag.split('.').any(str::is_empty) {
            return Err(SenderBuildError::InvalidConfig(format!(
                "tag {tag:?} must not contain empty dot-separated segments"
            )));
        }
        Ok(())
    }

    fn validate_transport(&self) -> Result<(), SenderBuildError> {
        if let Some(port) = self.port {
            ensure_positive!(port, "port")?;
        }
        match &self.transport {
            Some(TransportConfig::Host(host)) if host.trim().is_empty() => Err(
                SenderBuildError::InvalidConfig("host must not be empty".into()),
            ),
            Some(TransportConfig::Host(host)) => match Endpoint::parse(host, DEFAULT_PORT) {
                Endpoint::Unix(UnixEndpoint { path }) if path.as_os_str().is_empty() => Err(
                    SenderBuildError::InvalidConfig("unix socket path must not be empty".into()),
                ),
                _ => Ok(()),
            },
            Some(TransportConfig::Unix(path)) if path.as_os_str().is_empty() => Err(
                SenderBuildError::InvalidConfig("unix socket path must not be empty".into()),
            ),
            _ => Ok(()),
        }
    }

    fn validate_timeout(&self) -> Result<(), SenderBuildError> {
        if let Some(secs) = self.timeout_secs {
            let valid = secs > 0.0
                && Duration::try_from_secs_f64(secs).is_ok_and(|timeout| !timeout.is_zero());
            if !valid {
                return Err(SenderBuildError::InvalidConfig(format!(
                    "timeout must be a positive number of seconds, got {secs}"
                )));
            }
        }
        Ok(())
    }

    fn build_endpoint(&self) -> Option<Endpoint> {
        let port = self.port.unwrap_or(DEFAULT_PORT);
        match &self.transport {
            Some(TransportConfig::Host(host)) => Some(Endpoint::parse(host, port)),
            Some(TransportConfig::Unix(path)) => {
                Some(Endpoint::Unix(UnixEndpoint { path: path.clone() }))
            }
            None => self.port.map(|port| Endpoint::parse(crate::sender::DEFAULT_HOST, port)),
        }
    }

    /// Produce a validated configuration without connecting.
    pub fn build_config(&self) -> Result<SenderConfig, SenderBuildError> {
        self.validate()?;
        let mut config = SenderConfig::new(self.tag.clone()).with_verbose(self.verbose);
        if let Some(endpoint) = self.build_endpoint() {
            config.endpoint = endpoint;
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout = Duration::from_secs_f64(secs);
        }
        if let Some(buffer_max) = self.buffer_max {
            config.buffer_max = buffer_max;
        }
        if let Some(interval) = self.warn_interval {
            config.warn_interval = interval;
        }
        Ok(config)
    }

    /// Validate the settings and construct the sender.
    pub fn build(&self) -> Result<FluentSender, SenderBuildError> {
        let config = self.build_config()?;
        Ok(FluentSender::with_config(config))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::sender::{DEFAULT_BUFFER_MAX, DEFAULT_HOST, DEFAULT_TIMEOUT, TcpEndpoint};

    fn invalid(builder: SenderBuilder) -> String {
        match builder.build_config() {
            Err(SenderBuildError::InvalidConfig(msg)) => msg,
            Ok(config) => panic!("expected invalid configuration, got {config:?}"),
        }
    }

    #[rstest]
    fn defaults_target_local_forward_input() {
        let config = SenderBuilder::new("app").build_config().expect("valid config");
        assert_eq!(config.tag, "app");
        assert_eq!(
            config.endpoint,
            Endpoint::Tcp(TcpEndpoint {
                host: DEFAULT_HOST.into(),
                port: DEFAULT_PORT,
            })
        );
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert_eq!(config.buffer_max, DEFAULT_BUFFER_MAX);
        assert!(!config.verbose);
    }

    #[rstest]
    fn unix_scheme_host_selects_socket_path() {
        let config = SenderBuilder::new("app")
            .with_host("unix:///var/run/td-agent/td-agent.sock")
            .with_port(9999)
            .build_config()
            .expect("valid config");
        assert_eq!(
            config.endpoint,
            Endpoint::Unix(UnixEndpoint {
                path: "/var/run/td-agent/td-agent.sock".into(),
            })
        );
    }

    #[rstest]
    fn port_applies_to_default_host() {
        let config = SenderBuilder::new("app")
            .with_port(24225)
            .build_config()
            .expect("valid config");
        assert_eq!(config.endpoint.to_string(), "localhost:24225");
    }

    #[rstest]
    fn overrides_are_applied() {
        let config = SenderBuilder::new("app.web")
            .with_host("collector.internal")
            .with_port(5170)
            .with_timeout_secs(0.5)
            .with_buffer_max(0)
            .with_verbose(true)
            .build_config()
            .expect("valid config");
        assert_eq!(config.endpoint.to_string(), "collector.internal:5170");
        assert_eq!(config.timeout, Duration::from_millis(500));
        assert_eq!(config.buffer_max, 0);
        assert!(config.verbose);
    }

    #[rstest]
    #[case("")]
    #[case(".app")]
    #[case("app.")]
    #[case("app..web")]
    fn rejects_malformed_tags(#[case] tag: &str) {
        assert!(invalid(SenderBuilder::new(tag)).contains("tag"));
    }

    #[rstest]
    fn rejects_zero_port() {
        assert!(invalid(SenderBuilder::new("app").with_port(0)).contains("port"));
    }

    #[rstest]
    #[case(0.0)]
    #[case(-1.0)]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    #[case(1e-10)]
    fn rejects_invalid_timeouts(#[case] secs: f64) {
        assert!(invalid(SenderBuilder::new("app").with_timeout_secs(secs)).contains("timeout"));
    }

    #[rstest]
    fn rejects_empty_host() {
        assert!(invalid(SenderBuilder::new("app").with_host("  ")).contains("host"));
    }

    #[rstest]
    fn rejects_empty_unix_path() {
        assert!(invalid(SenderBuilder::new("app").with_host("unix://")).contains("path"));
        assert!(invalid(SenderBuilder::new("app").with_unix_path("")).contains("path"));
    }
}
