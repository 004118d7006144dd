//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;
use std::time::Duration;

use bridge_config::{Config, CorsConfig};

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Defaults with a loopback listen address
    pub fn new() -> Self {
        let mut config = Config::default();
        config.server.listen_address = SocketAddr::from(([127, 0, 0, 1], 0));

        Self { config }
    }

    /// Point both DashScope endpoints at a mock
    pub fn with_dashscope(mut self, upload_endpoint: &str, asr_endpoint: &str) -> Self {
        self.config.dashscope.upload_endpoint = upload_endpoint.parse().expect("valid URL");
        self.config.dashscope.asr_endpoint = asr_endpoint.parse().expect("valid URL");
        self
    }

    /// Per-call timeout for outbound DashScope requests
    pub fn with_upstream_timeout(mut self, timeout: Duration) -> Self {
        self.config.dashscope.timeout = timeout;
        self
    }

    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.config.upload.max_file_size = bytes;
        self
    }

    pub fn with_cors(mut self, config: CorsConfig) -> Self {
        self.config.server.cors = config;
        self
    }

    pub fn without_cors(mut self) -> Self {
        self.config.server.cors.enabled = false;
        self
    }

    pub fn with_health_path(mut self, path: &str) -> Self {
        self.config.server.health.path = path.to_owned();
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config.validate().expect("valid test configuration");
        self.config
    }
}
