use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while fetching, rendering or proxying a request
#[derive(Error, Debug)]
pub enum ScribeError {
    /// A required request parameter was not supplied
    #[error("Missing {0} parameter")]
    MissingParameter(&'static str),

    /// The query string could not be decoded
    #[error("Invalid query string: {0}")]
    InvalidQuery(String),

    /// The target site answered with a non-2xx status
    #[error("Failed to fetch: {status_text}")]
    UpstreamFetch { status: u16, status_text: String },

    /// DNS, TLS, connection or timeout failure talking to a remote host
    #[error("Request failed: {0}")]
    Transport(String),

    /// The headless browser never saw the page settle
    #[error("Navigation timed out after {}s", .0.as_secs())]
    NavigationTimeout(Duration),

    /// Browser launch, protocol or evaluation failure
    #[error("Browser error: {0}")]
    Browser(String),

    /// The server has no API key for the language-model provider
    #[error("LLM API key is not configured")]
    MissingCredential,

    /// The endpoint does not accept this HTTP method
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// The language-model API answered with a non-2xx status
    #[error("{message}")]
    Upstream { status: u16, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Socket or filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScribeError {
    /// HTTP status reported to callers for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ScribeError::MissingParameter(_) | ScribeError::InvalidQuery(_) => {
                StatusCode::BAD_REQUEST
            }
            ScribeError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ScribeError::UpstreamFetch { status, .. } | ScribeError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub(crate) fn upstream_fetch(status: StatusCode) -> Self {
        ScribeError::UpstreamFetch {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
        }
    }
}

impl From<reqwest::Error> for ScribeError {
    fn from(err: reqwest::Error) -> Self {
        ScribeError::Transport(err.to_string())
    }
}
