use bridge_config::UploadConfig;

use crate::error::SttError;

/// What the validator needs to know about an upload
#[derive(Debug, Clone, Copy)]
pub struct FileMetadata<'a> {
    pub size: u64,
    /// Content type declared on the multipart part
    pub content_type: Option<&'a str>,
    pub filename: Option<&'a str>,
}

/// Size and media-type policy applied before any network call
#[derive(Debug, Clone)]
pub struct FileValidator {
    max_file_size: u64,
    allowed_types: Vec<String>,
}

impl FileValidator {
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            max_file_size: config.max_file_size,
            allowed_types: config.allowed_types.clone(),
        }
    }

    /// Check size, then resolve and check the media type
    pub fn validate(&self, file: &FileMetadata<'_>) -> crate::Result<()> {
        self.check_size(file.size)?;

        let content_type = resolve_content_type(file).ok_or_else(|| self.unsupported())?;

        if !self.is_allowed(&content_type) {
            tracing::debug!(%content_type, "rejected upload media type");
            return Err(self.unsupported());
        }

        Ok(())
    }

    pub fn check_size(&self, size: u64) -> crate::Result<()> {
        if size > self.max_file_size {
            return Err(SttError::FileTooLarge {
                max_size: self.max_file_size,
            });
        }

        Ok(())
    }

    fn is_allowed(&self, content_type: &str) -> bool {
        // multipart declarations are never audio, whatever the allow-list says
        if starts_with_ignore_case(content_type, "multipart/") {
            return false;
        }

        self.allowed_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(content_type))
    }

    fn unsupported(&self) -> SttError {
        SttError::UnsupportedFileType {
            allowed: self.allowed_types.clone(),
        }
    }
}

/// Declared type first, then a guess from the filename extension
///
/// Media-type parameters are dropped (`audio/ogg; codecs=opus` -> `audio/ogg`).
pub fn resolve_content_type(file: &FileMetadata<'_>) -> Option<String> {
    let declared = file
        .content_type
        .map(|ct| ct.split(';').next().unwrap_or_default().trim())
        .filter(|ct| !ct.is_empty());

    if let Some(declared) = declared {
        return Some(declared.to_owned());
    }

    file.filename
        .and_then(|name| mime_guess::from_path(name).first())
        .map(|mime| mime.essence_str().to_owned())
}

fn starts_with_ignore_case(value: &str, prefix: &str) -> bool {
    value
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}
