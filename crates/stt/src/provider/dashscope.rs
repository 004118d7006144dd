use async_trait::async_trait;
use bridge_config::DashScopeConfig;
use bridge_core::ApiKey;
use reqwest::Client;
use url::Url;

use crate::{
    asr::{AsrResult, call_asr},
    http_client::http_client,
    oss::upload_object,
    policy::{UploadPolicy, fetch_upload_policy},
    types::{AudioFile, Language},
};

use super::{AsrBackend, UploadBackend};

/// DashScope upload-policy, OSS and multimodal ASR endpoints behind one client
pub(crate) struct DashScopeClient {
    client: Client,
    upload_endpoint: Url,
    asr_endpoint: Url,
}

impl DashScopeClient {
    pub fn new(config: &DashScopeConfig) -> crate::Result<Self> {
        Ok(Self {
            client: http_client(config.timeout)?,
            upload_endpoint: config.upload_endpoint.clone(),
            asr_endpoint: config.asr_endpoint.clone(),
        })
    }
}

#[async_trait]
impl UploadBackend for DashScopeClient {
    async fn upload_policy(&self, api_key: &ApiKey, model: &str) -> crate::Result<UploadPolicy> {
        fetch_upload_policy(&self.client, &self.upload_endpoint, api_key, model).await
    }

    async fn upload(&self, policy: &UploadPolicy, file: AudioFile, file_name: &str) -> crate::Result<String> {
        upload_object(&self.client, policy, file, file_name).await
    }
}

#[async_trait]
impl AsrBackend for DashScopeClient {
    async fn transcribe(
        &self,
        api_key: &ApiKey,
        audio_url: &str,
        model: &str,
        language: Option<Language>,
        prompt: Option<&str>,
    ) -> crate::Result<AsrResult> {
        call_asr(
            &self.client,
            &self.asr_endpoint,
            api_key,
            audio_url,
            model,
            language,
            prompt,
        )
        .await
    }
}
