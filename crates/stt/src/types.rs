use std::{io, time::Instant};

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, VariantArray};
use tokio::{
    fs::File,
    io::{AsyncSeekExt, AsyncWriteExt},
};

use crate::validate::FileMetadata;

/// Task label reported on every transcription response
pub const TASK_TRANSCRIBE: &str = "transcribe";

/// Languages the ASR model accepts as an explicit hint
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr, EnumString, VariantArray,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Language {
    Zh,
    Yue,
    En,
    Ja,
    De,
    Ko,
    Ru,
    Fr,
    Pt,
    Ar,
    It,
    Es,
    Hi,
    Id,
    Th,
    Tr,
    Uk,
    Vi,
}

/// Shape of a successful response body
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ResponseFormat {
    /// `OpenAI` `json` shape
    #[default]
    Json,
    /// Adds request id, timestamp and ASR metadata
    VerboseJson,
}

/// Audio file spooled to an anonymous temporary file
///
/// The handle is owned by the request and closed when dropped, whichever
/// way the pipeline exits.
#[derive(Debug)]
pub struct AudioFile {
    file: File,
    filename: Option<String>,
    content_type: Option<String>,
    size: u64,
}

impl AudioFile {
    pub fn new(file: File, filename: Option<String>, content_type: Option<String>, size: u64) -> Self {
        Self {
            file,
            filename,
            content_type,
            size,
        }
    }

    /// Spool an in-memory payload, mostly useful for embedding and tests
    pub async fn from_bytes(bytes: &[u8], filename: Option<&str>, content_type: Option<&str>) -> io::Result<Self> {
        let mut file = anonymous_file().await?;
        file.write_all(bytes).await?;
        file.flush().await?;

        Ok(Self::new(
            file,
            filename.map(str::to_owned),
            content_type.map(str::to_owned),
            bytes.len() as u64,
        ))
    }

    pub fn metadata(&self) -> FileMetadata<'_> {
        FileMetadata {
            size: self.size,
            content_type: self.content_type.as_deref(),
            filename: self.filename.as_deref(),
        }
    }

    /// Caller-supplied filename, `None` when absent or empty
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref().filter(|name| !name.is_empty())
    }

    /// Rewind and turn the handle into a streaming request body
    pub(crate) async fn into_body(mut self) -> io::Result<(reqwest::Body, u64)> {
        self.file.rewind().await?;
        let stream = tokio_util::io::ReaderStream::new(self.file);

        Ok((reqwest::Body::wrap_stream(stream), self.size))
    }
}

/// Create an unnamed temporary file that disappears once closed
pub(crate) async fn anonymous_file() -> io::Result<File> {
    let file = tokio::task::spawn_blocking(tempfile::tempfile)
        .await
        .map_err(io::Error::other)??;

    Ok(File::from_std(file))
}

/// Parsed inbound transcription request
#[derive(Debug)]
pub struct TranscriptionRequest {
    /// Uploaded audio
    pub file: AudioFile,
    /// Model identifier (e.g. "qwen3-asr-flash")
    pub model: String,
    /// Explicit language, `None` lets the vendor auto-detect
    pub language: Option<Language>,
    /// System-turn context for the ASR model
    pub prompt: Option<String>,
    pub response_format: ResponseFormat,
    /// When the request arrived, before its body was read
    pub received_at: Instant,
}

/// Where the audio landed in object storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    /// `oss://` locator handed to the ASR call
    pub oss_url: String,
    /// Informational only, never checked locally
    pub expire_time: jiff::Timestamp,
    pub model_used: String,
}

/// Upload metadata echoed back to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadInfo {
    pub oss_url: String,
    /// RFC 3339
    pub expire_time: String,
    pub model_used: String,
}

impl From<&UploadResult> for UploadInfo {
    fn from(upload: &UploadResult) -> Self {
        Self {
            oss_url: upload.oss_url.clone(),
            expire_time: upload.expire_time.to_string(),
            model_used: upload.model_used.clone(),
        }
    }
}

/// Transcription response following the `OpenAI` API format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionResponse {
    pub text: String,
    /// Always [`TASK_TRANSCRIBE`]
    pub task: String,
    /// Detected language: empty when the vendor gave no annotation,
    /// `"unknown"` when it returned no choice at all
    pub language: String,
    /// Audio length in seconds, when the vendor reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_info: Option<UploadInfo>,
    pub processing_time_ms: u64,
}

/// Detailed response including vendor metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerboseTranscriptionResponse {
    #[serde(flatten)]
    pub base: TranscriptionResponse,
    pub request_id: String,
    /// RFC 3339 time the response was assembled
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asr_metadata: Option<AsrMetadata>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AsrMetadata {
    pub detected_language: String,
    pub emotion: String,
    pub finish_reason: String,
    pub usage: UsageInfo,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UsageInfo {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub audio_seconds: f64,
}

/// Response body returned by the endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TranscriptionOutput {
    Basic(TranscriptionResponse),
    Verbose(VerboseTranscriptionResponse),
}

impl TranscriptionOutput {
    pub fn base(&self) -> &TranscriptionResponse {
        match self {
            Self::Basic(response) => response,
            Self::Verbose(response) => &response.base,
        }
    }

    /// Stamp the upload echo and the end-to-end processing time
    pub(crate) fn attach(&mut self, upload: &UploadResult, processing_time_ms: u64) {
        let base = match self {
            Self::Basic(response) => response,
            Self::Verbose(response) => &mut response.base,
        };

        base.upload_info = Some(UploadInfo::from(upload));
        base.processing_time_ms = processing_time_ms;
    }
}
