//! Mapping from the vendor ASR shape to the `OpenAI` transcription shape

use jiff::{Timestamp, Unit};

use crate::{
    asr::AsrResult,
    types::{
        AsrMetadata, TASK_TRANSCRIBE, TranscriptionResponse, UploadInfo, UploadResult, UsageInfo,
        VerboseTranscriptionResponse,
    },
};

/// Reported when the vendor returned no choice at all
const UNKNOWN_LANGUAGE: &str = "unknown";

pub fn to_basic(result: &AsrResult, processing_time_ms: u64) -> TranscriptionResponse {
    let language = match result.first_choice() {
        None => UNKNOWN_LANGUAGE.to_owned(),
        Some(_) => result.detected_language().unwrap_or_default().to_owned(),
    };

    TranscriptionResponse {
        text: result.transcript().to_owned(),
        task: TASK_TRANSCRIBE.to_owned(),
        language,
        // a zero duration is reported as absent
        duration: result.usage.seconds.filter(|seconds| *seconds > 0.0),
        upload_info: None,
        processing_time_ms,
    }
}

/// Basic response plus request id, timestamp, upload echo and ASR metadata
///
/// `asr_metadata` is only present when the first choice carries an annotation.
pub fn to_verbose(result: &AsrResult, processing_time_ms: u64, upload: &UploadResult) -> VerboseTranscriptionResponse {
    let mut base = to_basic(result, processing_time_ms);
    base.upload_info = Some(UploadInfo::from(upload));

    let asr_metadata = result.first_annotation().map(|annotation| AsrMetadata {
        detected_language: annotation.language.clone(),
        emotion: annotation.emotion.clone(),
        finish_reason: result
            .first_choice()
            .map(|choice| choice.finish_reason.clone())
            .unwrap_or_default(),
        usage: UsageInfo {
            input_tokens: result.usage.input_tokens_details.map_or(0, |details| details.text_tokens),
            output_tokens: result.usage.output_tokens_details.text_tokens,
            audio_seconds: result.usage.seconds.unwrap_or_default(),
        },
    });

    VerboseTranscriptionResponse {
        base,
        request_id: result.request_id.clone(),
        timestamp: now_rfc3339(),
        asr_metadata,
    }
}

fn now_rfc3339() -> String {
    let now = Timestamp::now();
    now.round(Unit::Second).unwrap_or(now).to_string()
}
