use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bridge_core::{ApiKey, ErrorBody};
use http::StatusCode;

/// Require `Authorization: Bearer <key>` and hand the key to the handler
///
/// The key is never checked locally; DashScope is the authority. Requests
/// without a usable header are answered with 401 before the body is read.
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    match ApiKey::from_headers(request.headers()) {
        Ok(api_key) => {
            request.extensions_mut().insert(api_key);
            next.run(request).await
        }
        Err(e) => {
            tracing::debug!(error = %e, path = request.uri().path(), "rejected unauthenticated request");
            (StatusCode::UNAUTHORIZED, Json(ErrorBody::new(e.to_string()))).into_response()
        }
    }
}
