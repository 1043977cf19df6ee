//! NetActuate API error types

use crate::client::Operation;
use thiserror::Error;

/// Entity class named in a not-found error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Server,
    SshKey,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::Server => write!(f, "server"),
            ResourceKind::SshKey => write!(f, "ssh key"),
        }
    }
}

/// API client errors
///
/// Errors are `Clone` so that test doubles can hand back an injected error
/// verbatim on every call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("{kind} {id} not found")]
    NotFound { kind: ResourceKind, id: i64 },

    #[error("{0} hook not configured")]
    NotConfigured(Operation),

    #[error("API error: {0}")]
    Api(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Response decode error: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn server_not_found(id: i64) -> Self {
        ApiError::NotFound {
            kind: ResourceKind::Server,
            id,
        }
    }

    pub fn ssh_key_not_found(id: i64) -> Self {
        ApiError::NotFound {
            kind: ResourceKind::SshKey,
            id,
        }
    }

    /// Whether the error reports a missing entity.
    ///
    /// The remote API only reports this textually, so remote messages are
    /// matched by substring.
    pub fn is_not_found(&self) -> bool {
        match self {
            ApiError::NotFound { .. } => true,
            ApiError::Api(message) => message.to_lowercase().contains("not found"),
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        assert_eq!(
            ApiError::server_not_found(42).to_string(),
            "server 42 not found"
        );
        assert_eq!(
            ApiError::ssh_key_not_found(7).to_string(),
            "ssh key 7 not found"
        );
    }

    #[test]
    fn test_is_not_found() {
        assert!(ApiError::server_not_found(1).is_not_found());
        assert!(ApiError::Api("Server Not Found".to_string()).is_not_found());
        assert!(!ApiError::Api("quota exceeded".to_string()).is_not_found());
        assert!(!ApiError::NotConfigured(Operation::GetServer).is_not_found());
    }

    #[test]
    fn test_not_configured_names_hook() {
        let err = ApiError::NotConfigured(Operation::GetServer);
        assert_eq!(err.to_string(), "GetServer hook not configured");
    }
}
