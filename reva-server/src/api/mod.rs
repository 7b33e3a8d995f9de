//! HTTP API handlers

pub mod groups;
pub mod health;
pub mod reviews;

pub use health::health_routes;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::services::IngestError;

/// API-level error: a status code plus a client-facing message.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> ApiError {
        ApiError {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.message }));
        (self.status, body).into_response()
    }
}

impl From<reva_common::Error> for ApiError {
    fn from(err: reva_common::Error) -> ApiError {
        let status = match &err {
            reva_common::Error::NotFound(_) => StatusCode::NOT_FOUND,
            reva_common::Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError {
            status,
            message: err.to_string(),
        }
    }
}

impl From<IngestError> for ApiError {
    fn from(err: IngestError) -> ApiError {
        let status = match &err {
            // Remote service failures, including "answered but empty"
            IngestError::Classifier(_) | IngestError::EmptyResult => StatusCode::BAD_GATEWAY,
            IngestError::Csv(_)
            | IngestError::UnknownLabel { .. }
            | IngestError::InvalidRecord { .. }
            | IngestError::Invalid(_) => StatusCode::BAD_REQUEST,
            IngestError::Db(e) => {
                return ApiError::from_db(e);
            }
        };
        ApiError {
            status,
            message: err.to_string(),
        }
    }
}

impl ApiError {
    fn from_db(err: &reva_common::Error) -> ApiError {
        let status = match err {
            reva_common::Error::NotFound(_) => StatusCode::NOT_FOUND,
            reva_common::Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError {
            status,
            message: err.to_string(),
        }
    }
}
