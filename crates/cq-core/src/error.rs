//! Core error types for content-query
//!
//! Builder and serializer operations never fail: they normalize or drop
//! input instead. Errors only surface where text is parsed into query types
//! or where configuration is loaded.

use thiserror::Error;

use crate::config::ConfigError;

/// Standard Result type for content-query operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Core error type for parsing and configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Unknown dialect: {0}")]
    UnknownDialect(String),

    #[error("Unknown sort direction: {0}")]
    UnknownSortDirection(String),

    #[error("Unknown filter operator: {0}")]
    UnknownOperator(String),

    #[error("Unknown publication state: {0}")]
    UnknownPublicationState(String),

    #[error("Invalid sort expression '{input}': {message}")]
    InvalidSort { input: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<ConfigError> for QueryError {
    fn from(err: ConfigError) -> Self {
        QueryError::Config(err.to_string())
    }
}

impl QueryError {
    pub fn error_code(&self) -> &'static str {
        match self {
            QueryError::UnknownDialect(_) => "unknown_dialect",
            QueryError::UnknownSortDirection(_) => "unknown_sort_direction",
            QueryError::UnknownOperator(_) => "unknown_operator",
            QueryError::UnknownPublicationState(_) => "unknown_publication_state",
            QueryError::InvalidSort { .. } => "invalid_sort",
            QueryError::Config(_) => "configuration_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = QueryError::UnknownDialect("graphql".to_string());
        assert_eq!(err.to_string(), "Unknown dialect: graphql");
        assert_eq!(err.error_code(), "unknown_dialect");

        let err = QueryError::InvalidSort {
            input: ":asc".to_string(),
            message: "empty path".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid sort expression ':asc': empty path");
    }

    #[test]
    fn test_from_config_error() {
        let err: QueryError = ConfigError::InvalidValue {
            key: "CONTENT_QUERY_DEFAULT_SORT".to_string(),
            message: "sideways".to_string(),
        }
        .into();
        assert_eq!(err.error_code(), "configuration_error");
        assert!(err.to_string().contains("CONTENT_QUERY_DEFAULT_SORT"));
    }
}
