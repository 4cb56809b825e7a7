use reqwest::StatusCode;
use thiserror::Error;

/// The only message a user ever sees for a failed submission
pub const CONNECTIVITY_MESSAGE: &str =
    "Backend connection failed. Ensure the prediction server is running and reachable.";

/// Internal reason a request failed. Kept for logs; never shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureCause {
    /// Connection refused, DNS failure, reset, and the like
    #[error("transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success status
    #[error("prediction service returned HTTP {status}")]
    Status {
        status: StatusCode,
        /// `error` field of the response body, if the service sent one
        detail: Option<String>,
    },

    /// The body of a success response was not the expected JSON
    #[error("invalid response body: {0}")]
    Decode(String),
}

/// Failure to obtain a successful JSON response from the prediction service.
///
/// Transport errors, error statuses and undecodable bodies all collapse into
/// this one error, whose display text is [`CONNECTIVITY_MESSAGE`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", CONNECTIVITY_MESSAGE)]
pub struct ConnectivityError {
    cause: FailureCause,
}

impl ConnectivityError {
    pub fn new(cause: FailureCause) -> Self {
        Self { cause }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(FailureCause::Transport(message.into()))
    }

    pub fn status(status: StatusCode, detail: Option<String>) -> Self {
        Self::new(FailureCause::Status { status, detail })
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(FailureCause::Decode(message.into()))
    }

    /// Why the request failed, for logging
    pub fn cause(&self) -> &FailureCause {
        &self.cause
    }

    /// Text to show the user
    pub fn user_message(&self) -> &'static str {
        CONNECTIVITY_MESSAGE
    }
}

impl From<reqwest::Error> for ConnectivityError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            ConnectivityError::decode(error.to_string())
        } else if let Some(status) = error.status() {
            ConnectivityError::status(status, None)
        } else {
            ConnectivityError::transport(error.to_string())
        }
    }
}

impl From<serde_json::Error> for ConnectivityError {
    fn from(error: serde_json::Error) -> Self {
        ConnectivityError::decode(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_cause_displays_the_same_message() {
        let errors = [
            ConnectivityError::transport("connection refused"),
            ConnectivityError::status(StatusCode::INTERNAL_SERVER_ERROR, Some("boom".into())),
            ConnectivityError::decode("expected value at line 1"),
        ];

        for error in &errors {
            assert_eq!(error.to_string(), CONNECTIVITY_MESSAGE);
            assert_eq!(error.user_message(), CONNECTIVITY_MESSAGE);
        }
    }

    #[test]
    fn test_cause_is_preserved_for_logging() {
        let error = ConnectivityError::status(StatusCode::NOT_FOUND, None);
        assert_eq!(error.cause().to_string(), "prediction service returned HTTP 404 Not Found");
    }

    #[test]
    fn test_json_errors_are_decode_failures() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error = ConnectivityError::from(json_error);
        assert!(matches!(error.cause(), FailureCause::Decode(_)));
    }
}
