//! HTTP response types for the Fomento server
//!
//! This module provides common response structures for API responses.

use actix_web::{HttpResponse, HttpResponseBuilder, http::StatusCode};
use serde::{Deserialize, Serialize};

/// Generic result wrapper for API responses
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Result<T> {
    pub code: i32,
    pub message: String,
    pub data: T,
}

impl<T> Result<T> {
    pub fn new(code: i32, message: String, data: T) -> Self {
        Result::<T> { code, message, data }
    }

    pub fn success(data: T) -> Result<T> {
        Result::<T> {
            code: 0,
            message: "success".to_string(),
            data,
        }
    }

    pub fn fail(message: String) -> Result<()> {
        Result::<()> {
            code: 500,
            message,
            data: (),
        }
    }

    pub fn http_success(data: impl Serialize) -> HttpResponse {
        HttpResponse::Ok().json(Result::success(data))
    }

    pub fn http_response(
        status: u16,
        code: i32,
        message: String,
        data: impl Serialize,
    ) -> HttpResponse {
        HttpResponseBuilder::new(StatusCode::from_u16(status).unwrap_or_default())
            .json(Result::new(code, message, data))
    }

    pub fn http_not_found(message: String) -> HttpResponse {
        Self::http_response(
            404,
            fomento_common::error::RESOURCE_NOT_FOUND.code,
            message,
            (),
        )
    }

    pub fn http_internal_error(message: String) -> HttpResponse {
        Self::http_response(500, fomento_common::error::SERVER_ERROR.code, message, ())
    }
}

/// Error result for API error responses
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorResult {
    pub timestamp: String,
    pub status: i32,
    pub error: String,
    pub message: String,
    pub path: String,
}

impl ErrorResult {
    pub fn new(status: i32, error: String, message: String, path: String) -> Self {
        ErrorResult {
            timestamp: chrono::Utc::now().to_rfc3339(),
            status,
            error,
            message,
            path,
        }
    }

    pub fn forbidden(message: &str, path: &str) -> Self {
        ErrorResult {
            timestamp: chrono::Utc::now().to_rfc3339(),
            status: StatusCode::FORBIDDEN.as_u16() as i32,
            error: StatusCode::FORBIDDEN
                .canonical_reason()
                .unwrap_or_default()
                .to_string(),
            message: message.to_string(),
            path: path.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_wrapper() {
        let result = Result::success("ok".to_string());
        assert_eq!(result.code, 0);
        assert_eq!(result.message, "success");

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["data"], "ok");
    }

    #[test]
    fn test_fail_wrapper() {
        let result = Result::<String>::fail("boom".to_string());
        assert_eq!(result.code, 500);
        assert_eq!(result.message, "boom");
    }

    #[test]
    fn test_forbidden_error_result() {
        let error = ErrorResult::forbidden("no token", "/api/users/me");
        assert_eq!(error.status, 403);
        assert_eq!(error.error, "Forbidden");
        assert_eq!(error.path, "/api/users/me");
    }
}
