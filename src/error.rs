use std::io;

use thiserror::Error;

/// Failures talking to the quiz API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server answered {status}")]
    Status {
        status: u16,
        message: Option<String>,
    },
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
    /// The server understood the request but refused it (`success: false`).
    #[error("rejected: {}", .0.as_deref().unwrap_or("no reason given"))]
    Rejected(Option<String>),
    #[error("not found")]
    NotFound,
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    #[error("base URL cannot carry a path")]
    InvalidBaseUrl,
}

impl ApiError {
    /// Message the server attached to a refusal, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Rejected(message) | ApiError::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// True when the server refused the request rather than the transport failing.
    pub fn is_rejection(&self) -> bool {
        matches!(self, ApiError::Rejected(_) | ApiError::Status { message: Some(_), .. })
    }
}

/// Start-up failures.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("could not build the HTTP client: {0}")]
    Api(#[from] ApiError),
    #[error("could not install the log subscriber: {0}")]
    Logging(String),
    #[error("could not parse link {link:?}: {source}")]
    Link {
        link: String,
        source: url::ParseError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ApiError::Rejected(Some("taken".into())), Some("taken"), true)]
    #[case(ApiError::Rejected(None), None, true)]
    #[case(ApiError::Status { status: 400, message: Some("bad name".into()) }, Some("bad name"), true)]
    #[case(ApiError::Status { status: 502, message: None }, None, false)]
    #[case(ApiError::NotFound, None, false)]
    fn server_message_and_rejection(
        #[case] error: ApiError,
        #[case] message: Option<&str>,
        #[case] rejection: bool,
    ) {
        assert_eq!(error.server_message(), message);
        assert_eq!(error.is_rejection(), rejection);
    }

    #[test]
    fn rejected_display_falls_back_when_reason_missing() {
        assert_eq!(ApiError::Rejected(None).to_string(), "rejected: no reason given");
    }
}
