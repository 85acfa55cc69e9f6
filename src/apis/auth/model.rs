use crate::Error;
use chrono::{DateTime, Utc};
use reqwest::header::HeaderValue;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::ops::Deref;

/// Client credentials used to authenticate against Sbanken's APIs.
#[derive(Deserialize, Clone, Debug)]
pub struct Credentials {
    client_id: String,
    secret: Token,
}

impl Credentials {
    /// Creates a new set of client credentials.
    pub fn new(client_id: impl Into<String>, secret: impl Into<Token>) -> Self {
        Self {
            client_id: client_id.into(),
            secret: secret.into(),
        }
    }

    /// Returns a reference to the client id stored in these [`Credentials`].
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Returns a reference to the client secret stored in these [`Credentials`].
    pub fn secret(&self) -> &Token {
        &self.secret
    }

    /// `true` if either the client id or the secret is empty.
    pub(crate) fn is_malformed(&self) -> bool {
        self.client_id.trim().is_empty() || self.secret.expose_secret().is_empty()
    }

    /// Client id and secret, URL-escaped as the token endpoint expects them.
    pub(crate) fn escaped(&self) -> (String, String) {
        (
            urlencoding::encode(&self.client_id).into_owned(),
            urlencoding::encode(self.secret.expose_secret()).into_owned(),
        )
    }
}

/// Authenticated calling context bound to a bearer token.
///
/// A `Session` is short-lived: the connector authenticates anew for every refresh
/// and never shares a session between concurrent refreshes.
#[derive(Clone, Debug)]
pub struct Session {
    pub(crate) access_token: Token,
    pub(crate) expires_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Actual token contents held by this `Session`.
    pub fn access_token(&self) -> &Token {
        &self.access_token
    }

    /// Expiration date reported by the token endpoint.
    ///
    /// Returns `None` if the server did not say when the token expires.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Returns `true` if the token is known to be expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(false, |expires_at| now >= expires_at)
    }

    /// Value of the `Authorization` header for requests made within this session.
    pub(crate) fn authorization_header(&self) -> Result<HeaderValue, Error> {
        let mut header_value =
            HeaderValue::from_str(&format!("Bearer {}", self.access_token.expose_secret()))
                .map_err(|e| Error::Other(e.into()))?;
        header_value.set_sensitive(true);

        Ok(header_value)
    }
}

impl Deref for Session {
    type Target = Token;

    fn deref(&self) -> &Self::Target {
        self.access_token()
    }
}

/// Wrapper for a secret string that makes it harder to accidentally expose secrets
/// and ensures the backing memory is wiped on drop.
///
/// It is a wrapper around a [`secrecy::Secret`](secrecy::Secret).
///
/// ```rust
/// # use sbanken_connector::apis::auth::Token;
/// let token = Token::new("supersecret");
///
/// // The secret is redacted when printed with Debug
/// assert!(!format!("{:?}", token).contains("supersecret"));
///
/// // But can be manually exposed calling `expose_secret()`
/// assert_eq!(token.expose_secret(), "supersecret");
/// ```
#[derive(Deserialize, Clone, Debug)]
pub struct Token(Secret<String>);

impl Token {
    /// Wraps a secret string in a new `Token`.
    pub fn new<T: Into<String>>(s: T) -> Self {
        Self(Secret::new(s.into()))
    }

    /// Exposes a reference to the underlying secret string.
    pub fn expose_secret(&self) -> &str {
        self.0.expose_secret()
    }
}

impl<T> From<T> for Token
where
    T: Into<String>,
{
    fn from(s: T) -> Self {
        Token::new(s)
    }
}
