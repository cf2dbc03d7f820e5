//! HTTP mapping for [`HostError`].

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{debug, warn};
use workbench_protocol::HostError;

/// A [`HostError`] on its way out as an HTTP response.
#[derive(Debug)]
pub struct HttpError(pub HostError);

impl From<HostError> for HttpError {
    fn from(err: HostError) -> Self {
        Self(err)
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            warn!("Request failed: {}", self.0);
        } else {
            debug!("Rejected request: {}", self.0);
        }
        (status, self.0.public_message()).into_response()
    }
}
