//! Clients for the various Sbanken APIs.

use crate::{apis::auth::Credentials, client::Environment, session::SessionManager, Error};
use reqwest::Url;
use reqwest_middleware::ClientWithMiddleware;
use std::fmt::{Debug, Formatter};

pub mod accounts;
pub mod auth;
pub mod customers;
mod envelope;
pub mod payments;
pub mod transactions;

pub(crate) use envelope::Envelope;

pub(crate) struct SbankenClientInner {
    pub(crate) client: ClientWithMiddleware,
    pub(crate) session_manager: SessionManager,
    pub(crate) credentials: Credentials,
    pub(crate) api_url: Url,
    pub(crate) environment: Environment,
}

impl SbankenClientInner {
    /// Resolves `path` against the API base URL.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, Error> {
        self.api_url.join(path).map_err(|e| Error::Other(e.into()))
    }
}

impl Debug for SbankenClientInner {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SbankenClientInner")
            .field("environment", &self.environment)
            .field("client_id", &self.credentials.client_id())
            .finish_non_exhaustive()
    }
}
