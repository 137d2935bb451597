// Copyright (c) 2025 Grookai
// SPDX-License-Identifier: BUSL-1.1
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Wire shape for request failures. `error` is a stable tag clients can
/// branch on; `message` is for humans.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

#[derive(Debug, Clone)]
pub enum ApiError {
    Unauthorized,
    InvalidRequest(String),
    ImageTooLarge(String),
    DecodeFailed(String),
    ServiceUnavailable(String),
    InternalError(String),
}

impl ApiError {
    /// Stable machine-readable tag.
    pub fn tag(&self) -> &'static str {
        match self {
            ApiError::Unauthorized => "unauthorized",
            ApiError::InvalidRequest(_) => "invalid_request",
            ApiError::ImageTooLarge(_) => "image_too_large",
            ApiError::DecodeFailed(_) => "decode_failed",
            ApiError::ServiceUnavailable(_) => "service_unavailable",
            ApiError::InternalError(_) => "internal_error",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ImageTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::DecodeFailed(_) => StatusCode::BAD_REQUEST,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_response(&self, request_id: Option<String>) -> ErrorResponse {
        ErrorResponse {
            ok: false,
            error: self.tag().to_string(),
            message: self.to_string(),
            request_id,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Unauthorized => write!(f, "missing or invalid x-gv-token"),
            ApiError::InvalidRequest(msg) => write!(f, "{}", msg),
            ApiError::ImageTooLarge(msg) => write!(f, "{}", msg),
            ApiError::DecodeFailed(msg) => write!(f, "{}", msg),
            ApiError::ServiceUnavailable(msg) => write!(f, "{}", msg),
            ApiError::InternalError(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<crate::vision::image_utils::ImageError> for ApiError {
    fn from(e: crate::vision::image_utils::ImageError) -> Self {
        use crate::vision::image_utils::ImageError;
        match e {
            ImageError::PayloadTooLarge(..) | ImageError::TooLarge(..) => {
                ApiError::ImageTooLarge(e.to_string())
            }
            _ => ApiError::DecodeFailed(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.to_response(None))).into_response()
    }
}
