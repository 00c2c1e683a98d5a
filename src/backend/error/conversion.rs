/**
 * Error Conversion
 *
 * All backend errors implement `IntoResponse`, so handlers return
 * `Result<_, BackendError>` and the error becomes a JSON response:
 *
 * ```json
 * {
 *   "success": false,
 *   "error": "Error message",
 *   "status": 400
 * }
 * ```
 *
 * Internal errors are logged here with their full detail before the generic
 * message is sent.
 */

use axum::{
    response::{IntoResponse, Response},
    Json,
};

use crate::backend::error::types::BackendError;

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if self.is_internal() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Request rejected ({}): {}", status.as_u16(), self);
        }

        let body = serde_json::json!({
            "success": false,
            "error": self.message(),
            "status": status.as_u16(),
        });

        (status, Json(body)).into_response()
    }
}
