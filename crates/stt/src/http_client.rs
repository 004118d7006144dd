use std::time::Duration;

use reqwest::Client;

use crate::error::SttError;

/// HTTP client shared by the three outbound DashScope calls
///
/// `timeout` bounds every single round-trip; there is no retry on expiry.
pub(crate) fn http_client(timeout: Duration) -> crate::Result<Client> {
    Client::builder()
        .user_agent(concat!("asr-bridge/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .pool_idle_timeout(Some(Duration::from_secs(5)))
        .tcp_nodelay(true)
        .tcp_keepalive(Some(Duration::from_secs(60)))
        .build()
        .map_err(|e| SttError::Internal(format!("failed to build HTTP client: {e}")))
}
