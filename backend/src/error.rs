//! The structured failure envelope every handler returns instead of a raw
//! panic or opaque 500. Mirrors `wall_e_types::ErrorEnvelope` but as an
//! axum `IntoResponse` so handlers can just `?` their way out.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use wall_e_types::{ErrorCode, ErrorEnvelope, RequestId};

use crate::headers::no_store_headers;

#[derive(Debug)]
pub struct GatewayError {
    envelope: ErrorEnvelope,
}

impl GatewayError {
    pub fn new(error_code: ErrorCode, message: impl Into<String>, request_id: RequestId) -> Self {
        GatewayError {
            envelope: ErrorEnvelope::new(error_code, message, request_id),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.envelope.error_code.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, Json(self.envelope)).into_response();
        response.headers_mut().extend(no_store_headers());
        response
    }
}
