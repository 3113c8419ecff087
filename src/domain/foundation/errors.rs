//! Error types for the domain layer.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' must be between {min} and {max}, got {actual}")]
    OutOfRange {
        field: String,
        min: i32,
        max: i32,
        actual: i32,
    },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an out of range validation error.
    pub fn out_of_range(field: impl Into<String>, min: i32, max: i32, actual: i32) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            min,
            max,
            actual,
        }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Broad failure classes the caller layer maps onto responses.
///
/// Domain-rule violations must never be conflated with infrastructure
/// failures; the caller retries the latter, never the former.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    NotFound,
    Conflict,
    DomainRule,
    Infrastructure,
}

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,

    // Not found errors
    UserNotFound,
    StoreNotFound,
    OrderNotFound,

    // Conflict errors
    OwnershipExists,
    PrimaryOwnerExists,
    DuplicateKey,

    // Domain rule violations
    NoAccessExists,
    NoPurchase,
    IllegalTransition,
    TokenAlreadyUsed,
    ExpiredToken,
    InvalidToken,
    Forbidden,

    // Infrastructure errors
    DatabaseError,
    CacheError,
    DispatchError,
    InternalError,
}

impl ErrorCode {
    /// Returns the broad class this code belongs to.
    pub fn class(&self) -> ErrorClass {
        match self {
            ErrorCode::UserNotFound | ErrorCode::StoreNotFound | ErrorCode::OrderNotFound => {
                ErrorClass::NotFound
            }
            ErrorCode::OwnershipExists
            | ErrorCode::PrimaryOwnerExists
            | ErrorCode::DuplicateKey => ErrorClass::Conflict,
            ErrorCode::ValidationFailed
            | ErrorCode::NoAccessExists
            | ErrorCode::NoPurchase
            | ErrorCode::IllegalTransition
            | ErrorCode::TokenAlreadyUsed
            | ErrorCode::ExpiredToken
            | ErrorCode::InvalidToken
            | ErrorCode::Forbidden => ErrorClass::DomainRule,
            ErrorCode::DatabaseError
            | ErrorCode::CacheError
            | ErrorCode::DispatchError
            | ErrorCode::InternalError => ErrorClass::Infrastructure,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::UserNotFound => "USER_NOT_FOUND",
            ErrorCode::StoreNotFound => "STORE_NOT_FOUND",
            ErrorCode::OrderNotFound => "ORDER_NOT_FOUND",
            ErrorCode::OwnershipExists => "OWNERSHIP_EXISTS",
            ErrorCode::PrimaryOwnerExists => "PRIMARY_OWNER_EXISTS",
            ErrorCode::DuplicateKey => "DUPLICATE_KEY",
            ErrorCode::NoAccessExists => "NO_ACCESS_EXISTS",
            ErrorCode::NoPurchase => "NO_PURCHASE",
            ErrorCode::IllegalTransition => "ILLEGAL_TRANSITION",
            ErrorCode::TokenAlreadyUsed => "TOKEN_ALREADY_USED",
            ErrorCode::ExpiredToken => "EXPIRED_TOKEN",
            ErrorCode::InvalidToken => "INVALID_TOKEN",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::CacheError => "CACHE_ERROR",
            ErrorCode::DispatchError => "DISPATCH_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}

/// Standard domain error with code, message, and optional details.
#[derive(Debug, Clone)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    /// Creates a new domain error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Creates a validation error for a specific field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::ValidationFailed,
            message: message.into(),
            details: HashMap::new(),
        }
        .with_detail("field", field.into())
    }

    /// Creates an infrastructure error from a database failure.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    /// Creates an infrastructure error from a cache failure.
    pub fn cache(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::CacheError, message)
    }

    /// Adds a detail to the error.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Returns the broad failure class of this error.
    pub fn class(&self) -> ErrorClass {
        self.code.class()
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {}

impl From<ValidationError> for DomainError {
    fn from(err: ValidationError) -> Self {
        DomainError::new(ErrorCode::ValidationFailed, err.to_string())
    }
}
