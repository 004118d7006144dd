//! Wire contract of the DashScope multimodal generation endpoint used for ASR

use bridge_core::ApiKey;
use reqwest::Client;
use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

use crate::{error::SttError, types::Language};

const SERVICE: &str = "DashScope ASR";

/// Asks the vendor to resolve `oss://` locators on its side
pub const OSS_RESOURCE_RESOLVE_HEADER: &str = "X-DashScope-OssResourceResolve";

/// System text sent when the caller gave no prompt; an empty turn is rejected
const EMPTY_SYSTEM_TEXT: &str = " ";

#[derive(Debug, Serialize)]
struct AsrRequest<'a> {
    model: &'a str,
    input: AsrInput<'a>,
    parameters: AsrParameters,
}

#[derive(Debug, Serialize)]
struct AsrInput<'a> {
    messages: [AsrMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct AsrMessage<'a> {
    role: &'static str,
    content: [AsrContent<'a>; 1],
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum AsrContent<'a> {
    Text { text: &'a str },
    Audio { audio: &'a str },
}

#[derive(Debug, Serialize)]
struct AsrParameters {
    asr_options: AsrOptions,
}

#[derive(Debug, Serialize)]
struct AsrOptions {
    enable_itn: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<Language>,
}

impl<'a> AsrRequest<'a> {
    fn new(model: &'a str, audio_url: &'a str, language: Option<Language>, prompt: Option<&'a str>) -> Self {
        let system_text = prompt.filter(|p| !p.is_empty()).unwrap_or(EMPTY_SYSTEM_TEXT);

        Self {
            model,
            input: AsrInput {
                messages: [
                    AsrMessage {
                        role: "system",
                        content: [AsrContent::Text { text: system_text }],
                    },
                    // audio only: a text item next to it breaks the model
                    AsrMessage {
                        role: "user",
                        content: [AsrContent::Audio { audio: audio_url }],
                    },
                ],
            },
            parameters: AsrParameters {
                asr_options: AsrOptions {
                    enable_itn: true,
                    language,
                },
            },
        }
    }
}

/// Structured ASR response
///
/// Decoding is lenient about absent and `null` fields; only the first choice is read.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AsrResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub output: AsrOutput,
    #[serde(default, deserialize_with = "null_as_default")]
    pub usage: AsrUsage,
    #[serde(default, deserialize_with = "null_as_default")]
    pub request_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AsrOutput {
    #[serde(default, deserialize_with = "null_as_default")]
    pub choices: Vec<AsrChoice>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AsrChoice {
    #[serde(default, deserialize_with = "null_as_default")]
    pub finish_reason: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: AsrReply,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AsrReply {
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: Vec<AsrReplyContent>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub annotations: Vec<AsrAnnotation>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AsrReplyContent {
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AsrAnnotation {
    #[serde(default, deserialize_with = "null_as_default")]
    pub language: String,
    #[serde(default, deserialize_with = "null_as_default", rename = "type")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub emotion: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AsrUsage {
    #[serde(default)]
    pub input_tokens_details: Option<TokenDetails>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub output_tokens_details: TokenDetails,
    /// Audio duration
    #[serde(default)]
    pub seconds: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct TokenDetails {
    #[serde(default, deserialize_with = "null_as_default")]
    pub text_tokens: u64,
}

/// The vendor sends `null` for empty lists and strings on some replies
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl AsrResult {
    pub fn first_choice(&self) -> Option<&AsrChoice> {
        self.output.choices.first()
    }

    /// Text of the first content item of the first choice
    pub fn transcript(&self) -> &str {
        self.first_choice()
            .and_then(|choice| choice.message.content.first())
            .map_or("", |content| content.text.as_str())
    }

    pub fn first_annotation(&self) -> Option<&AsrAnnotation> {
        self.first_choice()
            .and_then(|choice| choice.message.annotations.first())
    }

    pub fn detected_language(&self) -> Option<&str> {
        self.first_annotation().map(|annotation| annotation.language.as_str())
    }
}

/// Transcribe the audio behind `audio_url`
pub(crate) async fn call_asr(
    client: &Client,
    endpoint: &Url,
    api_key: &ApiKey,
    audio_url: &str,
    model: &str,
    language: Option<Language>,
    prompt: Option<&str>,
) -> crate::Result<AsrResult> {
    let request = AsrRequest::new(model, audio_url, language, prompt);

    if tracing::enabled!(tracing::Level::DEBUG) {
        let body = serde_json::to_string(&request).unwrap_or_default();
        tracing::debug!(%endpoint, %body, "sending ASR request");
    }

    let response = client
        .post(endpoint.clone())
        .header(http::header::AUTHORIZATION, api_key.bearer())
        .header(OSS_RESOURCE_RESOLVE_HEADER, "enable")
        .json(&request)
        .send()
        .await
        .map_err(|e| SttError::unreachable(SERVICE, &e))?;

    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::debug!(status = status.as_u16(), %body, "ASR request rejected");
        return Err(SttError::external(SERVICE, status.as_u16(), body));
    }

    let bytes = response.bytes().await.map_err(|e| SttError::unreachable(SERVICE, &e))?;

    serde_json::from_slice(&bytes).map_err(|e| SttError::Internal(format!("failed to decode ASR response: {e}")))
}
