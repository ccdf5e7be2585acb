//! JSON error responses.

use crate::error::QueryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Error returned by an API handler, rendered as
/// `{"error": CODE, "message": text}`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("Chart specification is inconsistent: {0}")]
    Chart(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Query(QueryError::RowOutOfRange { .. }) => StatusCode::NOT_FOUND,
            ApiError::Query(QueryError::UnknownClass { .. }) => StatusCode::BAD_REQUEST,
            ApiError::Chart(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Query(QueryError::RowOutOfRange { .. }) => "ROW_OUT_OF_RANGE",
            ApiError::Query(QueryError::UnknownClass { .. }) => "INVALID_CLASS",
            ApiError::Chart(_) => "CHART_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }
        let body = serde_json::json!({
            "error": self.code(),
            "message": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_out_of_range_maps_to_404() {
        let err = ApiError::from(QueryError::RowOutOfRange { index: 38, len: 38 });
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.code(), "ROW_OUT_OF_RANGE");
        assert_eq!(err.to_string(), "Row index 38 out of range: valid rows are 0..38");
    }

    #[test]
    fn test_unknown_class_maps_to_400() {
        let err = ApiError::from(QueryError::UnknownClass { value: 3 });
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "INVALID_CLASS");
    }

    #[test]
    fn test_into_response_status() {
        let resp = ApiError::Chart("bad".into()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
