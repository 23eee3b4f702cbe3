//! JSON error bodies for failed requests.
//!
//! Handlers return `Result<_, HttpAppError>` and use `?` on anything that
//! converts into `AppError`. Status, body and log level all come from the
//! error's `ErrorMetadata`.

use std::sync::LazyLock;

use axum::{
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use photowall_core::{is_production_env, AppError, ErrorMetadata, LogLevel};
use serde::{de::DeserializeOwned, Serialize};
use utoipa::ToSchema;

/// Outside production, non-sensitive errors carry their full message chain.
static EXPOSE_DETAILS: LazyLock<bool> = LazyLock::new(|| !is_production_env());

/// Body of every non-2xx JSON response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable message, safe to show to guests
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Stable code such as `INVALID_INPUT` or `UPLOAD_ERROR`
    pub code: String,
    /// True when repeating the same request may succeed
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

impl ErrorResponse {
    fn new(err: &AppError, expose_details: bool) -> Self {
        let expose = expose_details && !err.is_sensitive();
        Self {
            error: err.client_message(),
            details: expose.then(|| err.detailed_message()),
            error_type: expose.then(|| err.error_type().to_string()),
            code: err.error_code().to_string(),
            recoverable: err.is_recoverable(),
            suggested_action: err.suggested_action().map(str::to_string),
        }
    }
}

/// `AppError` lives in photowall-core, so the axum response impl hangs off
/// this local newtype.
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        HttpAppError(AppError::InvalidInput(format!(
            "Invalid request body: {}",
            rejection.body_text()
        )))
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        render(&self.0, *EXPOSE_DETAILS)
    }
}

fn render(err: &AppError, expose_details: bool) -> Response {
    let status =
        StatusCode::from_u16(err.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let code = err.error_code();

    match err.log_level() {
        LogLevel::Debug => tracing::debug!(code, status = status.as_u16(), error = %err, "Request rejected"),
        LogLevel::Warn => tracing::warn!(code, status = status.as_u16(), error = %err, "Request conflicted"),
        LogLevel::Error => tracing::error!(
            code,
            status = status.as_u16(),
            error = %err.detailed_message(),
            "Request failed"
        ),
    }

    (status, Json(ErrorResponse::new(err, expose_details))).into_response()
}

/// `Json<T>` whose rejections (bad JSON, wrong content type) render as a 400
/// `ErrorResponse` instead of axum's plain-text body.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ValidatedJson(value)),
            Err(rejection) => Err(rejection.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn rendered(err: AppError, expose: bool) -> (StatusCode, serde_json::Value) {
        let response = render(&err, expose);
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_status_and_code_follow_metadata() {
        let cases = [
            (AppError::InvalidInput("batchId is required".into()), 400, "INVALID_INPUT"),
            (AppError::NotFound("Photo not found".into()), 404, "NOT_FOUND"),
            (AppError::AlreadyExists("B1".into()), 409, "ALREADY_EXISTS"),
            (AppError::Upload("store original".into()), 500, "UPLOAD_ERROR"),
            (AppError::Storage("bucket".into()), 500, "STORAGE_ERROR"),
        ];
        for (err, status, code) in cases {
            let (got_status, body) = rendered(err, false).await;
            assert_eq!(got_status.as_u16(), status, "{}", code);
            assert_eq!(body["code"], code);
        }
    }

    #[tokio::test]
    async fn test_client_errors_keep_their_message() {
        let (_, body) = rendered(AppError::NotFound("Batch B1 not found".into()), true).await;
        assert_eq!(body["error"], "Batch B1 not found");
        assert_eq!(body["recoverable"], false);
        assert_eq!(body["error_type"], "NotFound");
        assert!(body["details"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_sensitive_errors_never_expose_details() {
        let (_, body) = rendered(AppError::Upload("bucket unreachable".into()), true).await;
        assert_eq!(body["error"], "Failed to upload file");
        assert_eq!(body["recoverable"], true);
        assert!(body.get("details").is_none());
        assert!(body.get("error_type").is_none());
        assert_eq!(body["suggested_action"], "Retry the upload");
    }

    #[tokio::test]
    async fn test_details_hidden_when_not_exposed() {
        let (_, body) = rendered(AppError::InvalidInput("bad".into()), false).await;
        assert_eq!(body["error"], "bad");
        assert!(body.get("details").is_none());
    }
}
