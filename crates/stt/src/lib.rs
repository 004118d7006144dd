#![allow(
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions
)]

mod asr;
mod error;
mod http_client;
mod oss;
mod pipeline;
mod policy;
mod provider;
mod request;
mod translate;
mod types;
mod validate;

use std::sync::Arc;

use axum::{Json, Router, extract::DefaultBodyLimit, extract::State, routing::post};
use bridge_config::{Config, UploadConfig};

pub use asr::{AsrAnnotation, AsrChoice, AsrOutput, AsrReply, AsrReplyContent, AsrResult, AsrUsage, TokenDetails};
pub use error::{Result, SttError};
pub use oss::{object_key, object_locator, synthesize_file_name};
pub use pipeline::{Pipeline, PipelineBuilder, Stage};
pub use policy::UploadPolicy;
pub use provider::{AsrBackend, UploadBackend};
pub use request::ExtractMultipart;
pub use translate::{to_basic, to_verbose};
pub use types::{
    AsrMetadata, AudioFile, Language, ResponseFormat, TASK_TRANSCRIBE, TranscriptionOutput, TranscriptionRequest,
    TranscriptionResponse, UploadInfo, UploadResult, UsageInfo, VerboseTranscriptionResponse,
};
pub use validate::{FileMetadata, FileValidator, resolve_content_type};

/// Room for multipart boundaries and the small text fields
const FORM_OVERHEAD_BYTES: usize = 1 << 20;

/// Build the transcription pipeline from configuration
///
/// # Errors
///
/// Returns an error if the outbound HTTP client cannot be created
pub fn build_pipeline(config: &Config) -> anyhow::Result<Arc<Pipeline>> {
    let pipeline = PipelineBuilder::new(config)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to initialize transcription pipeline: {e}"))?;

    Ok(Arc::new(pipeline))
}

/// Create the endpoint router for transcriptions
pub fn endpoint_router(upload: &UploadConfig) -> Router<Arc<Pipeline>> {
    let body_limit = usize::try_from(upload.max_file_size)
        .unwrap_or(usize::MAX)
        .saturating_add(FORM_OVERHEAD_BYTES);

    Router::new()
        .route("/v1/audio/transcriptions", post(transcribe))
        .layer(DefaultBodyLimit::max(body_limit))
}

async fn transcribe(
    State(pipeline): State<Arc<Pipeline>>,
    ExtractMultipart(api_key, request): ExtractMultipart,
) -> Result<Json<TranscriptionOutput>> {
    tracing::debug!(model = %request.model, format = %request.response_format, "transcription requested");

    let output = pipeline.transcribe(&api_key, request).await?;

    Ok(Json(output))
}
