use thiserror::Error;

/// Raised by the `Endpoint` setters when a value is rejected.
///
/// The endpoint is left untouched whenever one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Endpoint slug cannot be empty")]
    Slug,

    #[error("{0} is not a valid HTTP verb")]
    Verb(String),

    #[error("{0} is not a valid HTTP verb code")]
    VerbCode(i64),

    #[error("The port should be an integer between 1 and 65535, got {0:?}")]
    Port(String),

    #[error("Endpoint frequencies are measured in seconds as a positive integer, got {0:?}")]
    Frequency(String),

    #[error("Unsupported scheme {0:?}, expected http or https")]
    Scheme(String),

    #[error("The server cannot be empty")]
    Server,

    #[error("Invalid header name {0:?}")]
    HeaderName(String),

    #[error("Invalid value for header {0:?}")]
    HeaderValue(String),

    #[error("Endpoint does not describe a valid URL: {0}")]
    Url(String),
}

impl From<std::convert::Infallible> for ValidationError {
    fn from(never: std::convert::Infallible) -> Self {
        match never {}
    }
}

/// Errors raised while setting up the checks manager.
#[derive(Debug, Error)]
pub enum ChecksError {
    #[error("Invalid endpoint: {0}")]
    Validation(#[from] ValidationError),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, ChecksError>;
