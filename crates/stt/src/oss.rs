use reqwest::{
    Client,
    multipart::{Form, Part},
};

use crate::{error::SttError, policy::UploadPolicy, types::AudioFile};

/// Status the object store is asked to answer with on success
const SUCCESS_ACTION_STATUS: &str = "200";

/// Object key for `file_name` inside the policy's upload directory
pub fn object_key(upload_dir: &str, file_name: &str) -> String {
    format!("{upload_dir}/{file_name}")
}

/// Locator the ASR endpoint resolves server-side
///
/// The object store does not echo it back, so it is rebuilt from the same
/// key the upload used.
pub fn object_locator(upload_dir: &str, file_name: &str) -> String {
    format!("oss://{}", object_key(upload_dir, file_name))
}

/// Name used when the caller sent none: `upload_<unix-seconds>`
pub fn synthesize_file_name() -> String {
    format!("upload_{}", jiff::Timestamp::now().as_second())
}

/// Policy form fields in the order the object store verifies them
///
/// The file part must follow these, last.
pub(crate) fn policy_fields(policy: &UploadPolicy, key: String) -> [(&'static str, String); 7] {
    [
        ("OSSAccessKeyId", policy.oss_access_key_id.clone()),
        ("Signature", policy.signature.clone()),
        ("policy", policy.policy.clone()),
        ("x-oss-object-acl", policy.x_oss_object_acl.clone()),
        ("x-oss-forbid-overwrite", policy.x_oss_forbid_overwrite.clone()),
        ("key", key),
        ("success_action_status", SUCCESS_ACTION_STATUS.to_owned()),
    ]
}

fn build_form(policy: &UploadPolicy, file_name: &str, file_part: Part) -> Form {
    let key = object_key(&policy.upload_dir, file_name);

    policy_fields(policy, key)
        .into_iter()
        .fold(Form::new(), |form, (name, value)| form.text(name, value))
        .part("file", file_part)
}

/// Upload `file` under `file_name` and return its `oss://` locator
pub(crate) async fn upload_object(
    client: &Client,
    policy: &UploadPolicy,
    file: AudioFile,
    file_name: &str,
) -> crate::Result<String> {
    let (body, length) = file
        .into_body()
        .await
        .map_err(|e| SttError::Upload(format!("failed to read spooled file: {e}")))?;

    let file_part = Part::stream_with_length(body, length)
        .file_name(file_name.to_owned())
        .mime_str("application/octet-stream")
        .map_err(|e| SttError::Upload(format!("failed to build file part: {e}")))?;

    let form = build_form(policy, file_name, file_part);

    tracing::debug!(
        upload_host = %policy.upload_host,
        key = %object_key(&policy.upload_dir, file_name),
        bytes = length,
        "uploading file to object storage"
    );

    let response = client
        .post(&policy.upload_host)
        .multipart(form)
        .send()
        .await
        .map_err(|e| SttError::Upload(format!("Upload failed: {e}")))?;

    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::debug!(status = status.as_u16(), %body, "object storage rejected upload");
        return Err(SttError::Upload(format!(
            "Upload failed with status {}: {body}",
            status.as_u16()
        )));
    }

    Ok(object_locator(&policy.upload_dir, file_name))
}
