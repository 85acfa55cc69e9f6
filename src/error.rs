//! Standard errors used by all functions in the crate.

use std::fmt;

/// Error collecting all possible failures of the Sbanken connector.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Authentication against the token endpoint failed.
    #[error("{0}")]
    Auth(#[from] AuthError),
    /// Error reported by a Sbanken API endpoint through the `isError` envelope.
    #[error("{0}")]
    ApiError(#[from] ApiError),
    /// Reqwest error. Covers network failures and timeouts.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
    /// The server answered with a non-success status and a body we could not interpret.
    #[error("Unexpected HTTP status {0}")]
    UnexpectedStatus(u16),
    /// The response body was not the JSON we expected.
    #[error("Malformed response: {0}")]
    MalformedResponse(#[from] serde_json::Error),
    /// A single-account lookup returned a different account than the one requested.
    #[error("Requested account {requested} but the API returned account {returned}")]
    AccountMismatch { requested: String, returned: String },
    /// The connector configuration failed validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    /// Catch-all variant for unexpected errors.
    #[error(transparent)]
    Other(anyhow::Error),
}

impl Error {
    /// Returns the [`ApiError`] carried by this error, if the remote API reported one.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Error::ApiError(e) => Some(e),
            _ => None,
        }
    }

    /// Returns `true` if the request timed out before a response was received.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::HttpError(e) if e.is_timeout())
    }

    /// Returns `true` for network, timeout and malformed payload failures,
    /// as opposed to errors reported by the API itself.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::HttpError(_) | Error::UnexpectedStatus(_) | Error::MalformedResponse(_)
        )
    }
}

impl From<reqwest_middleware::Error> for Error {
    fn from(e: reqwest_middleware::Error) -> Self {
        match e {
            reqwest_middleware::Error::Reqwest(e) => Error::HttpError(e),
            reqwest_middleware::Error::Middleware(e) => {
                e.downcast::<Error>().unwrap_or_else(Error::Other)
            }
        }
    }
}

impl From<Error> for reqwest_middleware::Error {
    fn from(e: Error) -> Self {
        reqwest_middleware::Error::Middleware(e.into())
    }
}

/// Sbanken API error, as reported in the body of a response with `isError: true`.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// Error class reported by the API (`errorType`), verbatim.
    pub error_type: String,
    /// Human readable explanation reported by the API (`errorMessage`), verbatim.
    pub error_message: String,
    /// HTTP status of the response that carried the error.
    ///
    /// Envelope errors are usually delivered with a `200 OK`.
    pub status: u16,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Sbanken API error {}: {}",
            self.error_type, self.error_message
        )?;

        if self.status != 200 {
            write!(f, " (HTTP {})", self.status)?;
        }

        Ok(())
    }
}

/// Failure to obtain an access token.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub struct AuthError {
    /// What went wrong.
    pub reason: String,
    /// HTTP status returned by the token endpoint, if a response was received.
    pub http_status: Option<u16>,
}

impl AuthError {
    pub(crate) fn new(reason: impl Into<String>, http_status: Option<u16>) -> Self {
        Self {
            reason: reason.into(),
            http_status,
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Authentication failed: {}", self.reason)?;

        if let Some(status) = self.http_status {
            write!(f, " (HTTP {})", status)?;
        }

        Ok(())
    }
}
