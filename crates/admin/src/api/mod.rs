//! Tojumi GraphQL API client.
//!
//! # Architecture
//!
//! - One `reqwest` client shared by every request ([`ApiClient`])
//! - Each remote operation declared once in [`operations`] as a
//!   `graphql_client::GraphQLQuery` with a static document
//! - The operator's bearer token travels in an [`ApiSession`]; an expired
//!   token is refused before anything is sent
//! - No timeout, retry or backoff beyond the transport defaults

pub mod client;
pub mod operations;
pub mod session;
pub mod types;

pub use client::ApiClient;
pub use session::ApiSession;
pub use types::*;

use thiserror::Error;

/// Errors that can occur when talking to the Tojumi API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status and no GraphQL body.
    #[error("Unexpected HTTP status {0}")]
    UnexpectedStatus(u16),

    /// GraphQL operation returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The API rejected the bearer token.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// The bearer token expired before the request was sent.
    #[error("Session token expired")]
    TokenExpired,

    /// The response carried neither data nor errors.
    #[error("Empty response from API")]
    EmptyResponse,
}

impl ApiError {
    /// Message suitable for showing to an operator.
    ///
    /// Uses the server-reported reason when there is one, otherwise
    /// `fallback`.
    #[must_use]
    pub fn operator_message(&self, fallback: &str) -> String {
        match self {
            Self::GraphQL(errors) => errors
                .iter()
                .map(|e| e.message.trim())
                .find(|m| !m.is_empty())
                .map_or_else(|| fallback.to_string(), tojumi_core::format::capitalize_first),
            Self::TokenExpired | Self::NotAuthenticated => {
                "Your session has expired. Please sign in again.".to_string()
            }
            _ => fallback.to_string(),
        }
    }

    /// Whether the operator must log in again.
    #[must_use]
    pub const fn requires_login(&self) -> bool {
        matches!(self, Self::TokenExpired | Self::NotAuthenticated)
    }
}

/// A GraphQL error returned by the Tojumi API.
#[derive(Debug, Clone)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Path to the failing field, joined with `.`.
    pub path: Option<String>,
}

impl From<graphql_client::Error> for GraphQLError {
    fn from(error: graphql_client::Error) -> Self {
        let path = error.path.map(|fragments| {
            fragments
                .into_iter()
                .map(|fragment| match fragment {
                    graphql_client::PathFragment::Key(key) => key,
                    graphql_client::PathFragment::Index(index) => index.to_string(),
                })
                .collect::<Vec<_>>()
                .join(".")
        });
        Self {
            message: error.message,
            path,
        }
    }
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    errors
        .iter()
        .map(|e| e.message.clone())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graphql(messages: &[&str]) -> ApiError {
        ApiError::GraphQL(
            messages
                .iter()
                .map(|m| GraphQLError {
                    message: (*m).to_string(),
                    path: None,
                })
                .collect(),
        )
    }

    #[test]
    fn test_graphql_error_formatting() {
        let err = graphql(&["Field not found", "Invalid ID"]);
        assert_eq!(err.to_string(), "GraphQL errors: Field not found; Invalid ID");
    }

    #[test]
    fn test_operator_message_prefers_server_reason() {
        let err = graphql(&["guarantor already verified"]);
        assert_eq!(
            err.operator_message("Failed to approve"),
            "Guarantor already verified"
        );
    }

    #[test]
    fn test_operator_message_falls_back() {
        assert_eq!(graphql(&[" "]).operator_message("Failed"), "Failed");
        assert_eq!(ApiError::EmptyResponse.operator_message("Failed"), "Failed");
        assert_eq!(ApiError::UnexpectedStatus(502).operator_message("Failed"), "Failed");
    }

    #[test]
    fn test_expired_token_requires_login() {
        assert!(ApiError::TokenExpired.requires_login());
        assert!(ApiError::NotAuthenticated.requires_login());
        assert!(!ApiError::EmptyResponse.requires_login());
    }
}
