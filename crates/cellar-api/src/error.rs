use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use cellar_core::error::ErrorCode;

/// Error payload returned for every non-2xx response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<&'static str>,
}

/// Wrapper turning store errors into HTTP responses.
#[derive(Debug)]
pub struct ApiError(pub cellar_core::Error);

impl From<cellar_core::Error> for ApiError {
    fn from(err: cellar_core::Error) -> Self {
        Self(err)
    }
}

const fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::DuplicateName | ErrorCode::EntityInUse => StatusCode::CONFLICT,
        ErrorCode::InvalidName
        | ErrorCode::InvalidColour
        | ErrorCode::InvalidValue
        | ErrorCode::CsvParseError => StatusCode::BAD_REQUEST,
        ErrorCode::ConfigParseError | ErrorCode::StorageError | ErrorCode::InternalUnexpected => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.0.code();
        let status = status_for(code);
        if status.is_server_error() {
            tracing::error!(code = %code, error = %self.0, "request failed");
        } else {
            tracing::debug!(code = %code, error = %self.0, "request rejected");
        }

        let body = ErrorBody {
            code: code.code(),
            message: self.0.to_string(),
            hint: code.hint(),
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
