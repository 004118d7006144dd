use std::path::Path;

use crate::Config;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::from_toml(&raw)
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing or validation fails
    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if limits are zero, the allow-list is empty, or the
    /// health path is not absolute
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_upload_config()?;
        self.validate_timeouts()?;

        if self.server.health.enabled && !self.server.health.path.starts_with('/') {
            anyhow::bail!("server.health.path must start with '/'");
        }

        Ok(())
    }

    fn validate_upload_config(&self) -> anyhow::Result<()> {
        if self.upload.max_file_size == 0 {
            anyhow::bail!("upload.max_file_size must be greater than 0");
        }

        if self.upload.allowed_types.is_empty() {
            anyhow::bail!("upload.allowed_types must list at least one media type");
        }

        if let Some(bad) = self.upload.allowed_types.iter().find(|t| !t.contains('/')) {
            anyhow::bail!("upload.allowed_types entry '{bad}' is not a media type");
        }

        if self.upload.validity_hours == 0 {
            anyhow::bail!("upload.validity_hours must be greater than 0");
        }

        Ok(())
    }

    fn validate_timeouts(&self) -> anyhow::Result<()> {
        if self.dashscope.timeout.is_zero() {
            anyhow::bail!("dashscope.timeout must be greater than 0");
        }

        if self.server.request_timeout.is_zero() {
            anyhow::bail!("server.request_timeout must be greater than 0");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{io::Write, time::Duration};

    use crate::{AnyOrArray, Config, DEFAULT_MAX_FILE_SIZE, LogFormat};

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::from_toml("").unwrap();

        assert_eq!(config.server.listen_address.port(), 9000);
        assert_eq!(config.upload.max_file_size, DEFAULT_MAX_FILE_SIZE);
        assert_eq!(config.upload.validity_hours, 48);
        assert!(config.upload.allowed_types.iter().any(|t| t == "audio/wav"));
        assert_eq!(config.dashscope.timeout, Duration::from_secs(30));
        assert_eq!(config.dashscope.upload_endpoint.as_str(), crate::DEFAULT_UPLOAD_ENDPOINT);
        assert!(config.server.health.enabled);
        assert!(config.server.cors.enabled);
        assert_eq!(config.telemetry.log_format, LogFormat::Text);
    }

    #[test]
    fn parses_all_sections() {
        let raw = r#"
            [server]
            listen_address = "127.0.0.1:8080"
            request_timeout = "90s"

            [server.health]
            path = "/healthz"

            [server.cors]
            origins = ["https://app.example"]

            [upload]
            max_file_size = 1024
            allowed_types = ["audio/wav"]
            validity_hours = 12

            [dashscope]
            timeout = "5s"
            upload_endpoint = "http://localhost:1234/uploads"
            asr_endpoint = "http://localhost:1234/asr"

            [telemetry]
            log_format = "json"
        "#;

        let config = Config::from_toml(raw).unwrap();

        assert_eq!(config.server.listen_address.port(), 8080);
        assert_eq!(config.server.request_timeout, Duration::from_secs(90));
        assert_eq!(config.server.health.path, "/healthz");
        assert_eq!(
            config.server.cors.origins,
            AnyOrArray::List(vec!["https://app.example".to_owned()])
        );
        assert_eq!(config.upload.max_file_size, 1024);
        assert_eq!(config.upload.allowed_types, vec!["audio/wav".to_owned()]);
        assert_eq!(config.upload.validity_hours, 12);
        assert_eq!(config.dashscope.timeout, Duration::from_secs(5));
        assert_eq!(config.dashscope.asr_endpoint.as_str(), "http://localhost:1234/asr");
        assert_eq!(config.telemetry.log_format, LogFormat::Json);
    }

    #[test]
    fn sample_config_matches_defaults() {
        let config = Config::from_toml(include_str!("../../../asr-bridge.toml")).unwrap();
        let defaults = Config::default();

        assert_eq!(config.server.listen_address, defaults.server.listen_address);
        assert_eq!(config.server.cors.origins, AnyOrArray::Any);
        assert_eq!(config.upload.allowed_types, defaults.upload.allowed_types);
        assert_eq!(config.upload.max_file_size, DEFAULT_MAX_FILE_SIZE);
        assert_eq!(config.dashscope.asr_endpoint, defaults.dashscope.asr_endpoint);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = Config::from_toml("[upload]\nmax_size = 1\n").unwrap_err();
        assert!(err.to_string().contains("failed to parse config"));
    }

    #[test]
    fn invalid_duration_is_rejected() {
        let err = Config::from_toml("[dashscope]\ntimeout = \"soon\"\n").unwrap_err();
        assert!(err.to_string().contains("invalid duration"));
    }

    #[test]
    fn zero_max_file_size_fails_validation() {
        let err = Config::from_toml("[upload]\nmax_file_size = 0\n").unwrap_err();
        assert!(err.to_string().contains("max_file_size"));
    }

    #[test]
    fn empty_allow_list_fails_validation() {
        let err = Config::from_toml("[upload]\nallowed_types = []\n").unwrap_err();
        assert!(err.to_string().contains("allowed_types"));
    }

    #[test]
    fn relative_health_path_fails_validation() {
        let err = Config::from_toml("[server.health]\npath = \"health\"\n").unwrap_err();
        assert!(err.to_string().contains("health.path"));
    }

    #[test]
    fn endpoints_expand_from_environment() {
        temp_env::with_var("MOCK_DASHSCOPE", Some("http://127.0.0.1:9999"), || {
            let raw = "[dashscope]\nasr_endpoint = \"{{ env.MOCK_DASHSCOPE }}/asr\"\n";
            let config = Config::from_toml(raw).unwrap();
            assert_eq!(config.dashscope.asr_endpoint.as_str(), "http://127.0.0.1:9999/asr");
        });
    }

    #[test]
    fn load_reads_file_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[upload]\nvalidity_hours = 6").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.upload.validity_hours, 6);
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Config::load(std::path::Path::new("/nonexistent/asr-bridge.toml")).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }
}
