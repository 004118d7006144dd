use serde::Deserialize;

/// Default maximum accepted file size (100 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Media types accepted when `allowed_types` is not configured
///
/// Some video containers are listed because they routinely carry
/// audio-only payloads.
pub const DEFAULT_ALLOWED_TYPES: &[&str] = &[
    "audio/aac",
    "audio/amr",
    "audio/flac",
    "audio/mp3",
    "audio/mpeg",
    "audio/mp4",
    "audio/x-m4a",
    "audio/ogg",
    "audio/opus",
    "audio/wav",
    "audio/wave",
    "audio/x-wav",
    "audio/webm",
    "audio/x-ms-wma",
    "video/x-msvideo",
    "video/x-flv",
    "video/x-matroska",
    "video/quicktime",
    "video/mp4",
    "video/mpeg",
    "video/webm",
    "video/x-ms-wmv",
];

/// Upload validation and object-store settings
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UploadConfig {
    /// Largest accepted file, in bytes
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// Accepted media types, compared case-insensitively
    #[serde(default = "default_allowed_types")]
    pub allowed_types: Vec<String>,
    /// How long an uploaded object stays readable, reported back to callers
    #[serde(default = "default_validity_hours")]
    pub validity_hours: u32,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
            allowed_types: default_allowed_types(),
            validity_hours: default_validity_hours(),
        }
    }
}

const fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

fn default_allowed_types() -> Vec<String> {
    DEFAULT_ALLOWED_TYPES.iter().map(|t| (*t).to_owned()).collect()
}

const fn default_validity_hours() -> u32 {
    48
}
