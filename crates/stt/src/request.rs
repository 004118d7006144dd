use std::{str::FromStr, sync::Arc, time::Instant};

use axum::extract::{FromRequest, Multipart, Request, multipart::Field};
use bridge_core::ApiKey;
use strum::VariantArray;
use tokio::io::AsyncWriteExt;

use crate::{
    error::SttError,
    pipeline::Pipeline,
    types::{AudioFile, Language, ResponseFormat, TranscriptionRequest, anonymous_file},
    validate::FileValidator,
};

/// Caller key plus the parsed multipart transcription form
///
/// The file part is streamed to an anonymous temporary file and never held
/// in memory; spooling stops as soon as it passes the size limit.
pub struct ExtractMultipart(pub ApiKey, pub TranscriptionRequest);

impl FromRequest<Arc<Pipeline>> for ExtractMultipart {
    type Rejection = SttError;

    async fn from_request(request: Request, pipeline: &Arc<Pipeline>) -> Result<Self, Self::Rejection> {
        let received_at = Instant::now();

        // the auth middleware has usually done this already
        let api_key = match request.extensions().get::<ApiKey>() {
            Some(key) => key.clone(),
            None => ApiKey::from_headers(request.headers())?,
        };

        let mut multipart = Multipart::from_request(request, pipeline).await.map_err(|e| {
            SttError::InvalidRequest(format!(
                "Expected a multipart/form-data request body: {}",
                e.body_text()
            ))
        })?;

        let mut file = None;
        let mut model = None;
        let mut language = None;
        let mut prompt = None;
        let mut response_format = ResponseFormat::default();

        while let Some(field) = multipart.next_field().await.map_err(malformed)? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            match name.as_str() {
                "file" => {
                    if file.is_some() {
                        return Err(SttError::InvalidRequest(
                            "Only one 'file' field is allowed".to_owned(),
                        ));
                    }

                    file = Some(spool(field, pipeline.validator()).await?);
                }
                "model" => model = non_blank(field.text().await.map_err(malformed)?),
                "language" => {
                    // only an empty value means auto-detect
                    let code = field.text().await.map_err(malformed)?;
                    language = if code.is_empty() { None } else { Some(parse_language(&code)?) };
                }
                "prompt" => prompt = non_blank(field.text().await.map_err(malformed)?),
                "response_format" => {
                    if let Some(format) = non_blank(field.text().await.map_err(malformed)?) {
                        response_format = ResponseFormat::from_str(format.trim()).map_err(|_| {
                            SttError::InvalidRequest(format!(
                                "Unsupported response_format '{format}'. Supported formats: json, verbose_json"
                            ))
                        })?;
                    }
                }
                // temperature and other OpenAI fields are accepted and ignored
                _ => {}
            }
        }

        let file =
            file.ok_or_else(|| SttError::InvalidRequest("Missing required 'file' field in multipart form".to_owned()))?;

        let model = model
            .ok_or_else(|| SttError::InvalidRequest("Missing required 'model' field in multipart form".to_owned()))?;

        Ok(Self(
            api_key,
            TranscriptionRequest {
                file,
                model,
                language,
                prompt,
                response_format,
                received_at,
            },
        ))
    }
}

async fn spool(mut field: Field<'_>, validator: &FileValidator) -> crate::Result<AudioFile> {
    let filename = field.file_name().map(str::to_owned);
    let content_type = field.content_type().map(str::to_owned);

    let mut file = anonymous_file()
        .await
        .map_err(|e| SttError::Internal(format!("failed to create spool file: {e}")))?;

    let mut size = 0_u64;

    while let Some(chunk) = field.chunk().await.map_err(malformed)? {
        size += chunk.len() as u64;
        validator.check_size(size)?;

        file.write_all(&chunk)
            .await
            .map_err(|e| SttError::Internal(format!("failed to spool upload: {e}")))?;
    }

    file.flush()
        .await
        .map_err(|e| SttError::Internal(format!("failed to spool upload: {e}")))?;

    tracing::debug!(size, filename = ?filename, content_type = ?content_type, "spooled uploaded file");

    Ok(AudioFile::new(file, filename, content_type, size))
}

fn parse_language(code: &str) -> crate::Result<Language> {
    Language::from_str(code).map_err(|_| {
        let supported = Language::VARIANTS
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");

        SttError::InvalidRequest(format!("Unsupported language '{code}'. Supported languages: {supported}"))
    })
}

/// Blank means absent; anything else is kept untouched
fn non_blank(value: String) -> Option<String> {
    (!value.trim().is_empty()).then_some(value)
}

#[allow(clippy::needless_pass_by_value)]
fn malformed(error: axum::extract::multipart::MultipartError) -> SttError {
    SttError::InvalidRequest(format!("Failed to parse multipart form: {}", error.body_text()))
}
