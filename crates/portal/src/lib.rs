pub mod api;
pub mod app;
pub mod config;
pub mod console;
pub mod filters;
pub mod form;
pub mod metrics;
pub mod models;
pub mod template;
pub mod views;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A backend call failed. `message` is what the user gets to see.
    #[error("{message}")]
    Api {
        status: Option<u16>,
        message: String,
    },
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Template error: {0}")]
    Template(String),
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}

impl Error {
    pub fn api(status: Option<u16>, message: impl Into<String>) -> Self {
        Error::Api {
            status,
            message: message.into(),
        }
    }

    /// Message suitable for the error banner.
    pub fn user_message(&self) -> String {
        match self {
            Error::Api { message, .. } => message.clone(),
            Error::Validation(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_displays_only_the_message() {
        let err = Error::api(Some(404), "Job not found");
        assert_eq!(err.to_string(), "Job not found");
        assert_eq!(err.user_message(), "Job not found");
    }

    #[test]
    fn validation_error_user_message_drops_prefix() {
        let err = Error::Validation("Job title is required".to_string());
        assert_eq!(err.to_string(), "Validation error: Job title is required");
        assert_eq!(err.user_message(), "Job title is required");
    }
}
