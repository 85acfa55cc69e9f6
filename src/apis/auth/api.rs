use crate::{
    apis::{auth::Session, SbankenClientInner},
    error::AuthError,
};
use std::sync::Arc;

/// Sbanken authentication API client.
#[derive(Debug, Clone)]
pub struct AuthApi {
    inner: Arc<SbankenClientInner>,
}

impl AuthApi {
    pub(crate) fn new(inner: Arc<SbankenClientInner>) -> Self {
        Self { inner }
    }

    /// Requests a new [`Session`](crate::apis::auth::Session) using the configured credentials.
    ///
    /// Every call fires a new token request; sessions are not cached.
    pub async fn authenticate(&self) -> Result<Session, AuthError> {
        // Just delegate to the session manager
        self.inner
            .session_manager
            .authenticate(&self.inner.credentials)
            .await
    }
}
