use std::{sync::Arc, time::Instant};

use bridge_config::Config;
use bridge_core::{ApiKey, HttpError};
use jiff::Timestamp;
use strum::Display;

use crate::{
    error::SttError,
    oss::synthesize_file_name,
    provider::{AsrBackend, UploadBackend, dashscope::DashScopeClient},
    translate::{to_basic, to_verbose},
    types::{ResponseFormat, TranscriptionOutput, TranscriptionRequest, UploadResult},
    validate::FileValidator,
};

/// Step a request was in when it failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Stage {
    Validate,
    Policy,
    Upload,
    Transcribe,
}

/// Validate, fetch policy, upload, transcribe, translate
///
/// Stateless between requests; one instance is shared by every handler.
pub struct Pipeline {
    validator: FileValidator,
    validity_hours: u32,
    uploads: Arc<dyn UploadBackend>,
    asr: Arc<dyn AsrBackend>,
}

impl Pipeline {
    pub fn validator(&self) -> &FileValidator {
        &self.validator
    }

    /// Run one request end to end
    ///
    /// The first failing stage ends the request. Nothing is retried and the
    /// uploaded object is abandoned on a later failure. Processing time counts
    /// from `received_at`, so body spooling is included.
    pub async fn transcribe(&self, api_key: &ApiKey, request: TranscriptionRequest) -> crate::Result<TranscriptionOutput> {
        let TranscriptionRequest {
            file,
            model,
            language,
            prompt,
            response_format,
            received_at,
        } = request;

        self.validator
            .validate(&file.metadata())
            .inspect_err(|e| log_failure(Stage::Validate, e))?;

        let policy = self
            .uploads
            .upload_policy(api_key, &model)
            .await
            .inspect_err(|e| log_failure(Stage::Policy, e))?;

        let file_name = file.filename().map_or_else(synthesize_file_name, str::to_owned);
        let expire_time = self.expiry().inspect_err(|e| log_failure(Stage::Upload, e))?;

        let oss_url = self
            .uploads
            .upload(&policy, file, &file_name)
            .await
            .inspect_err(|e| log_failure(Stage::Upload, e))?;

        tracing::debug!(%oss_url, "audio uploaded");

        let upload = UploadResult {
            oss_url,
            expire_time,
            model_used: model,
        };

        let result = self
            .asr
            .transcribe(api_key, &upload.oss_url, &upload.model_used, language, prompt.as_deref())
            .await
            .inspect_err(|e| log_failure(Stage::Transcribe, e))?;

        let processing_time_ms = elapsed_ms(received_at);

        let mut output = match response_format {
            ResponseFormat::Json => TranscriptionOutput::Basic(to_basic(&result, processing_time_ms)),
            ResponseFormat::VerboseJson => {
                TranscriptionOutput::Verbose(to_verbose(&result, processing_time_ms, &upload))
            }
        };

        output.attach(&upload, processing_time_ms);

        tracing::info!(
            model = %upload.model_used,
            request_id = %result.request_id,
            processing_time_ms,
            "transcription complete"
        );

        Ok(output)
    }

    /// Local estimate of when the uploaded object expires
    fn expiry(&self) -> crate::Result<Timestamp> {
        let seconds = Timestamp::now().as_second() + i64::from(self.validity_hours) * 3600;

        Timestamp::from_second(seconds).map_err(|e| SttError::Internal(format!("invalid upload expiry: {e}")))
    }
}

fn log_failure(stage: Stage, error: &SttError) {
    if error.status_code().is_server_error() {
        tracing::error!(%stage, %error, "transcription failed");
    } else {
        tracing::warn!(%stage, %error, "transcription rejected");
    }
}

/// Whole milliseconds, rounded up so a finished request never reports zero
fn elapsed_ms(started: Instant) -> u64 {
    let millis = started.elapsed().as_micros().div_ceil(1000).max(1);
    u64::try_from(millis).unwrap_or(u64::MAX)
}

/// Builder for the pipeline, defaulting both backends to DashScope
pub struct PipelineBuilder<'a> {
    config: &'a Config,
    uploads: Option<Arc<dyn UploadBackend>>,
    asr: Option<Arc<dyn AsrBackend>>,
}

impl<'a> PipelineBuilder<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            uploads: None,
            asr: None,
        }
    }

    #[must_use]
    pub fn with_upload_backend(mut self, backend: Arc<dyn UploadBackend>) -> Self {
        self.uploads = Some(backend);
        self
    }

    #[must_use]
    pub fn with_asr_backend(mut self, backend: Arc<dyn AsrBackend>) -> Self {
        self.asr = Some(backend);
        self
    }

    pub fn build(self) -> crate::Result<Pipeline> {
        let (uploads, asr) = match (self.uploads, self.asr) {
            (Some(uploads), Some(asr)) => (uploads, asr),
            (uploads, asr) => {
                let dashscope = Arc::new(DashScopeClient::new(&self.config.dashscope)?);

                tracing::debug!(
                    upload_endpoint = %self.config.dashscope.upload_endpoint,
                    asr_endpoint = %self.config.dashscope.asr_endpoint,
                    "DashScope client initialized"
                );

                let uploads: Arc<dyn UploadBackend> = match uploads {
                    Some(uploads) => uploads,
                    None => dashscope.clone(),
                };

                let asr: Arc<dyn AsrBackend> = match asr {
                    Some(asr) => asr,
                    None => dashscope,
                };

                (uploads, asr)
            }
        };

        Ok(Pipeline {
            validator: FileValidator::new(&self.config.upload),
            validity_hours: self.config.upload.validity_hours,
            uploads,
            asr,
        })
    }
}
