use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Failure of an API request, mapped to a distinct status code
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("no route between the requested points")]
    NoRoute,
    #[error("{0}")]
    NotFound(String),
    #[error("no road network is loaded")]
    EmptyNetwork,
    #[error("{0}")]
    Upstream(String),
    #[error("route computation timed out")]
    Timeout,
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NoRoute | ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::EmptyNetwork => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<evacroute_core::Error> for ApiError {
    fn from(err: evacroute_core::Error) -> Self {
        use evacroute_core::Error;

        match err {
            Error::InvalidData(_) | Error::Geometry(_) | Error::GeoJsonError(_) => {
                ApiError::BadRequest(err.to_string())
            }
            Error::DataUnavailable(_) => ApiError::EmptyNetwork,
            Error::UpstreamFetch(_) => ApiError::Upstream(err.to_string()),
            Error::Configuration(_) | Error::IoError(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(%status, "{self}");
        } else {
            tracing::debug!(%status, "{self}");
        }

        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
