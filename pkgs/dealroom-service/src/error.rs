//! Error types returned by DealRoom operations.
//!
//! Every variant carries a message that is safe to show to the caller. Storage
//! details are logged where the failure happens and never copied into the
//! message.
//!
//! # Example
//!
//! ```rust
//! use dealroom_service::{Error, ErrorResponse};
//!
//! let err = Error::Permission("You cannot message this user".to_string());
//! let response = ErrorResponse::from(&err);
//! assert_eq!(response.code, "permission_denied");
//! ```

use dealroom_store::StoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

/// A type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy of the request-level operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// Malformed or missing input
    #[error("{0}")]
    Validation(String),

    /// The caller lacks a capability, or the role pair may not interact
    #[error("{0}")]
    Permission(String),

    /// A referenced user or deal does not exist or is not eligible
    #[error("{0}")]
    NotFound(String),

    /// The deal is already in the caller's watchlist
    #[error("{0}")]
    Duplicate(String),

    /// Persistence or an upstream collaborator failed
    #[error("{0}")]
    Storage(String),
}

impl Error {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Error::Validation(_) => "validation_error",
            Error::Permission(_) => "permission_denied",
            Error::NotFound(_) => "not_found",
            Error::Duplicate(_) => "duplicate",
            Error::Storage(_) => "storage_error",
        }
    }

    /// Log an upstream failure and hide it behind a generic message.
    pub(crate) fn upstream(context: &str, err: anyhow::Error) -> Self {
        error!("{}: {:#}", context, err);
        Error::Storage("The service is temporarily unavailable".to_string())
    }
}

impl From<StoreError> for Error {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::AlreadyInWatchlist { .. } => {
                Error::Duplicate("Deal is already in your watchlist".to_string())
            }
            StoreError::InvalidStatus(status) => {
                Error::Validation(format!("Invalid investment status: {}", status))
            }
            StoreError::InvalidAmount(_) => {
                Error::Validation("Investment amount must be a non-negative number".to_string())
            }
            other => {
                error!("Storage failure: {}", other);
                Error::Storage("Could not complete the request".to_string())
            }
        }
    }
}

/// Serializable error envelope handed to the transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl From<&Error> for ErrorResponse {
    fn from(error: &Error) -> Self {
        Self {
            code: error.code().to_string(),
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_map_to_taxonomy() {
        let dup: Error = StoreError::AlreadyInWatchlist {
            user_id: 1,
            deal_id: 99,
        }
        .into();
        assert_eq!(dup.code(), "duplicate");

        let status: Error = StoreError::InvalidStatus("won".to_string()).into();
        assert_eq!(status.code(), "validation_error");

        let amount: Error = StoreError::InvalidAmount(-5.0).into();
        assert_eq!(amount.code(), "validation_error");
    }

    #[test]
    fn test_storage_error_hides_detail() {
        let err: Error = StoreError::Corrupt("timestamp out of range: 99999999999999".to_string()).into();
        assert_eq!(err.code(), "storage_error");
        assert!(!err.to_string().contains("timestamp"));
    }

    #[test]
    fn test_error_response_serialization() {
        let err = Error::NotFound("Deal not found".to_string());
        let json = serde_json::to_value(ErrorResponse::from(&err)).unwrap();
        assert_eq!(json["code"], "not_found");
        assert_eq!(json["message"], "Deal not found");
    }
}
