use std::time::Duration;

use serde::Deserialize;
use url::Url;

/// Multimodal generation endpoint used for transcription
pub const DEFAULT_ASR_ENDPOINT: &str =
    "https://dashscope.aliyuncs.com/api/v1/services/aigc/multimodal-generation/generation";

/// Endpoint issuing signed upload policies
pub const DEFAULT_UPLOAD_ENDPOINT: &str = "https://dashscope.aliyuncs.com/api/v1/uploads";

/// DashScope endpoints and timeouts
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DashScopeConfig {
    /// Timeout applied to each outbound call
    #[serde(default = "default_timeout", deserialize_with = "crate::duration::deserialize")]
    pub timeout: Duration,
    /// Upload policy endpoint
    #[serde(default = "default_upload_endpoint")]
    pub upload_endpoint: Url,
    /// Transcription endpoint
    #[serde(default = "default_asr_endpoint")]
    pub asr_endpoint: Url,
}

impl Default for DashScopeConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            upload_endpoint: default_upload_endpoint(),
            asr_endpoint: default_asr_endpoint(),
        }
    }
}

const fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_upload_endpoint() -> Url {
    Url::parse(DEFAULT_UPLOAD_ENDPOINT).expect("default upload endpoint is a valid URL")
}

fn default_asr_endpoint() -> Url {
    Url::parse(DEFAULT_ASR_ENDPOINT).expect("default ASR endpoint is a valid URL")
}
