pub(crate) mod dashscope;

use async_trait::async_trait;
use bridge_core::ApiKey;

use crate::{asr::AsrResult, policy::UploadPolicy, types::AudioFile, types::Language};

/// Signed direct-to-storage upload
#[async_trait]
pub trait UploadBackend: Send + Sync {
    /// Obtain a fresh upload policy scoped to `model`
    async fn upload_policy(&self, api_key: &ApiKey, model: &str) -> crate::Result<UploadPolicy>;

    /// Upload `file` as `file_name` under the policy and return its locator
    async fn upload(&self, policy: &UploadPolicy, file: AudioFile, file_name: &str) -> crate::Result<String>;
}

/// Speech recognition over an already uploaded object
#[async_trait]
pub trait AsrBackend: Send + Sync {
    async fn transcribe(
        &self,
        api_key: &ApiKey,
        audio_url: &str,
        model: &str,
        language: Option<Language>,
        prompt: Option<&str>,
    ) -> crate::Result<AsrResult>;
}
