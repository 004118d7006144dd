use bridge_core::ApiKey;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::error::SttError;

const SERVICE: &str = "DashScope";

/// Signed, short-lived credentials for a direct upload to object storage
///
/// Issued per request and per model; expiry is enforced by the vendor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadPolicy {
    pub upload_dir: String,
    pub upload_host: String,
    pub oss_access_key_id: String,
    pub signature: String,
    pub policy: String,
    pub x_oss_object_acl: String,
    pub x_oss_forbid_overwrite: String,
}

#[derive(Deserialize)]
struct UploadPolicyEnvelope {
    data: UploadPolicy,
}

/// Fetch an upload policy for `model`
///
/// `GET {endpoint}?action=getPolicy&model={model}` with the caller's key.
pub(crate) async fn fetch_upload_policy(
    client: &Client,
    endpoint: &Url,
    api_key: &ApiKey,
    model: &str,
) -> crate::Result<UploadPolicy> {
    tracing::debug!(%endpoint, model, "requesting upload policy");

    let response = client
        .get(endpoint.clone())
        .query(&[("action", "getPolicy"), ("model", model)])
        .header(http::header::AUTHORIZATION, api_key.bearer())
        .header(http::header::CONTENT_TYPE, "application/json")
        .send()
        .await
        .map_err(|e| SttError::unreachable(SERVICE, &e))?;

    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::debug!(status = status.as_u16(), %body, "upload policy request rejected");
        return Err(SttError::external(SERVICE, status.as_u16(), body));
    }

    let bytes = response.bytes().await.map_err(|e| SttError::unreachable(SERVICE, &e))?;

    let envelope: UploadPolicyEnvelope = serde_json::from_slice(&bytes)
        .map_err(|e| SttError::Internal(format!("failed to decode upload policy: {e}")))?;

    Ok(envelope.data)
}
