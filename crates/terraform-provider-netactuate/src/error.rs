//! Provider error types

use thiserror::Error;

/// Errors raised while assembling the provider mux
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("no provider servers to serve")]
    NoMembers,

    #[error("provider server {0} declares no provider schema")]
    MissingSchema(usize),

    #[error("resource type {0} is implemented by more than one provider server")]
    DuplicateResourceType(String),

    #[error("data source type {0} is implemented by more than one provider server")]
    DuplicateDataSourceType(String),

    #[error("provider servers disagree on the provider schema: {0}")]
    ProviderSchemaMismatch(String),
}

pub type Result<T> = std::result::Result<T, ProviderError>;
