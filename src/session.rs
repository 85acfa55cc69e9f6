//! OAuth2 client-credentials authentication.

use crate::{
    apis::auth::{Credentials, Session},
    error::{AuthError, Error},
};
use chrono::{Duration, Utc};
use reqwest::Url;
use reqwest_middleware::ClientWithMiddleware;
use std::fmt::{Debug, Formatter};

/// Produces authenticated [`Session`](crate::apis::auth::Session)s on demand.
///
/// The manager holds no token state. Each call to [`authenticate`](SessionManager::authenticate)
/// performs a fresh client-credentials grant, so concurrent refreshes never share a session.
#[derive(Clone)]
pub struct SessionManager {
    client: ClientWithMiddleware,
    token_url: Url,
}

impl SessionManager {
    /// Creates a manager posting token requests to `token_url`.
    pub fn new(client: ClientWithMiddleware, token_url: Url) -> Self {
        Self { client, token_url }
    }

    /// Requests a new access token with the given credentials.
    ///
    /// Client id and secret are URL-escaped and sent as HTTP Basic credentials
    /// together with `grant_type=client_credentials`.
    #[tracing::instrument(
        name = "Authenticate",
        level = "debug",
        skip_all,
        fields(client_id = %credentials.client_id())
    )]
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<Session, AuthError> {
        if credentials.is_malformed() {
            return Err(AuthError::new("client id and secret must not be empty", None));
        }

        let (client_id, secret) = credentials.escaped();
        let res = self
            .client
            .post(self.token_url.clone())
            .basic_auth(client_id, Some(secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| auth_error(Error::from(e)))?;

        let status = res.status().as_u16();
        let bytes = res.bytes().await.map_err(|e| {
            AuthError::new(format!("failed to read token response: {}", e), Some(status))
        })?;
        let res: RawTokenResponse = serde_json::from_slice(&bytes).map_err(|e| {
            AuthError::new(format!("malformed token payload: {}", e), Some(status))
        })?;

        if !res.token_type.eq_ignore_ascii_case("bearer") {
            return Err(AuthError::new(
                format!("unsupported access token type: {}", res.token_type),
                Some(status),
            ));
        }
        if res.access_token.is_empty() {
            return Err(AuthError::new("empty access token", Some(status)));
        }

        tracing::info!("Got new access token");

        Ok(Session {
            access_token: res.access_token.into(),
            expires_at: res
                .expires_in
                .map(|expires_in| Utc::now() + Duration::seconds(expires_in)),
        })
    }
}

impl Debug for SessionManager {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("token_url", &self.token_url.as_str())
            .finish_non_exhaustive()
    }
}

/// Maps a failed token request into an [`AuthError`].
fn auth_error(e: Error) -> AuthError {
    match e {
        Error::Auth(e) => e,
        Error::ApiError(e) => AuthError::new(
            format!("{}: {}", e.error_type, e.error_message),
            Some(e.status),
        ),
        Error::UnexpectedStatus(status) => {
            AuthError::new("token endpoint rejected the request", Some(status))
        }
        Error::HttpError(e) => {
            let status = e.status().map(|s| s.as_u16());
            AuthError::new(e.to_string(), status)
        }
        e => AuthError::new(e.to_string(), None),
    }
}

/// Successful response of a token request.
#[derive(serde::Deserialize)]
struct RawTokenResponse {
    access_token: String,
    expires_in: Option<i64>,
    token_type: String,
}
