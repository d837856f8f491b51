/**
 * Error Conversion
 *
 * `BackendError` implements axum's `IntoResponse`, so handlers return it
 * directly. Server-side failures are logged here before the response is
 * built.
 *
 * # Response Format
 *
 * ```json
 * {
 *   "error": "product 6f0c... not found",
 *   "status": 404
 * }
 * ```
 */

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::backend::error::types::BackendError;

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("[Http] {}", self);
        } else {
            tracing::debug!("[Http] Rejected request: {}", self);
        }

        let body = serde_json::json!({
            "error": self.message(),
            "status": status.as_u16(),
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn test_error_response_body() {
        let response = BackendError::handler(StatusCode::CONFLICT, "Already exists").into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Already exists");
        assert_eq!(body["status"], 409);
    }
}
