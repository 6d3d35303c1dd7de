//! Error types and error codes for Fomento
//!
//! This module defines:
//! - `FomentoError`: Application-specific error enum
//! - `ErrorCode`: Structured error codes for API responses

use serde::{Deserialize, Serialize};

/// Application-specific error types
#[derive(thiserror::Error, Debug)]
pub enum FomentoError {
    #[error("caused: {0}")]
    IllegalArgument(String),

    #[error("user '{0}' not exist!")]
    UserNotExist(String),

    #[error("email '{0}' already registered")]
    EmailAlreadyRegistered(String),

    #[error("opportunity '{0}' not exist")]
    OpportunityNotExist(i64),

    #[error("network error: {0}")]
    NetworkError(String),

    #[error("database error: {0}")]
    DatabaseError(String),

    #[error("authentication error: {0}")]
    AuthError(String),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("{0} is disabled: missing API credentials")]
    ServiceDisabled(&'static str),

    #[error("internal error: {0}")]
    InternalError(String),
}

/// Error code structure for API responses
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ErrorCode<'a> {
    pub code: i32,
    pub message: &'a str,
}

// General success and error codes
pub const SUCCESS: ErrorCode<'static> = ErrorCode {
    code: 0,
    message: "success",
};

pub const PARAMETER_MISSING: ErrorCode<'static> = ErrorCode {
    code: 10000,
    message: "parameter missing",
};

pub const ACCESS_DENIED: ErrorCode<'static> = ErrorCode {
    code: 10001,
    message: "access denied",
};

pub const DATA_ACCESS_ERROR: ErrorCode<'static> = ErrorCode {
    code: 10002,
    message: "data access error",
};

pub const PARAMETER_VALIDATE_ERROR: ErrorCode<'static> = ErrorCode {
    code: 20002,
    message: "parameter validate error",
};

pub const RESOURCE_NOT_FOUND: ErrorCode<'static> = ErrorCode {
    code: 20004,
    message: "resource not found",
};

pub const EMAIL_ALREADY_REGISTERED: ErrorCode<'static> = ErrorCode {
    code: 20010,
    message: "email already registered",
};

pub const USER_NOT_FOUND: ErrorCode<'static> = ErrorCode {
    code: 20011,
    message: "user not found",
};

pub const SERVICE_DISABLED: ErrorCode<'static> = ErrorCode {
    code: 20020,
    message: "external service disabled",
};

pub const SERVER_ERROR: ErrorCode<'static> = ErrorCode {
    code: 30000,
    message: "server error",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FomentoError::UserNotExist("alice@example.com".to_string());
        assert_eq!(err.to_string(), "user 'alice@example.com' not exist!");

        let err = FomentoError::ServiceDisabled("pinecone");
        assert!(err.to_string().contains("pinecone"));
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(SUCCESS.code, 0);
        assert_eq!(ACCESS_DENIED.code, 10001);
        assert_eq!(RESOURCE_NOT_FOUND.code, 20004);
    }
}
