//! Gateway error types.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur while fetching dashboard data from GitHub.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("GitHub user not found: {username}")]
    NotFound { username: String },

    #[error("GitHub request failed: {0}")]
    Transient(String),

    #[error("empty username")]
    InvalidUsername,
}

impl GatewayError {
    /// Classifies a non-success HTTP status for `username`.
    pub fn from_status(status: StatusCode, username: &str) -> Self {
        if status == StatusCode::NOT_FOUND {
            Self::NotFound {
                username: username.to_string(),
            }
        } else {
            Self::Transient(format!("unexpected status {status}"))
        }
    }

    /// The single message shown in place of the dashboard content.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "User not found. Please check the username and try again.",
            Self::Transient(_) => "Failed to fetch data. Please try again later.",
            Self::InvalidUsername => "Please enter a GitHub username.",
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transient(e.to_string())
    }
}
