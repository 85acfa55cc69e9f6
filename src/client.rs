//! Module containing the main Sbanken API client.

use crate::{
    apis::{
        accounts::AccountsApi,
        auth::{AuthApi, Credentials},
        customers::CustomersApi,
        payments::PaymentsApi,
        transactions::TransactionsApi,
        SbankenClientInner,
    },
    common::{API_PATH, DEFAULT_API_URL, DEFAULT_AUTH_URL, TOKEN_PATH},
    middlewares::{
        error_handling::ErrorHandlingMiddleware,
        inject_user_agent::InjectUserAgentMiddleware,
        retry_reads::{DynRetryPolicy, RetryReadsMiddleware},
    },
    session::SessionManager,
    Error,
};
use reqwest::Url;
use reqwest_middleware::ClientWithMiddleware;
use reqwest_retry::{policies::ExponentialBackoff, RetryPolicy};
use reqwest_tracing::TracingMiddleware;
use std::{sync::Arc, time::Duration};

/// Default timeout applied to every HTTP request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Sbanken environment the client connects to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    /// Sbanken production APIs.
    Live,
    /// Custom base URLs, e.g. a local mock server.
    Custom { auth_url: Url, api_url: Url },
}

impl Environment {
    /// Builds an environment that serves both authentication and API requests from `url`.
    pub fn from_single_url(url: &Url) -> Self {
        Environment::Custom {
            auth_url: url.clone(),
            api_url: url.clone(),
        }
    }

    /// Full URL of the OAuth2 token endpoint.
    pub fn token_url(&self) -> Result<Url, Error> {
        join(&self.auth_base_url()?, TOKEN_PATH)
    }

    /// Base URL all data endpoints are relative to.
    pub fn api_url(&self) -> Result<Url, Error> {
        join(&self.api_base_url()?, API_PATH)
    }

    fn auth_base_url(&self) -> Result<Url, Error> {
        match self {
            Environment::Live => parse(DEFAULT_AUTH_URL),
            Environment::Custom { auth_url, .. } => Ok(auth_url.clone()),
        }
    }

    fn api_base_url(&self) -> Result<Url, Error> {
        match self {
            Environment::Live => parse(DEFAULT_API_URL),
            Environment::Custom { api_url, .. } => Ok(api_url.clone()),
        }
    }
}

fn parse(url: &str) -> Result<Url, Error> {
    Url::parse(url).map_err(|e| Error::Other(e.into()))
}

fn join(base: &Url, path: &str) -> Result<Url, Error> {
    base.join(path).map_err(|e| Error::Other(e.into()))
}

/// Client for Sbanken public APIs.
///
/// Read requests are retried on transient failures according to the configured
/// retry policy. Token requests are never retried.
#[derive(Debug, Clone)]
pub struct SbankenClient {
    /// Authentication APIs client.
    pub auth: AuthApi,
    /// Accounts APIs client.
    pub accounts: AccountsApi,
    /// Transactions APIs client.
    pub transactions: TransactionsApi,
    /// Payments APIs client.
    pub payments: PaymentsApi,
    /// Customers APIs client.
    pub customers: CustomersApi,
}

impl SbankenClient {
    /// Builds a new [`SbankenClient`](crate::client::SbankenClient) with the default configuration.
    pub fn new(credentials: Credentials) -> Result<SbankenClient, Error> {
        SbankenClientBuilder::new(credentials).build()
    }

    /// Returns a new builder to configure a new [`SbankenClient`](crate::client::SbankenClient).
    pub fn builder(credentials: Credentials) -> SbankenClientBuilder {
        SbankenClientBuilder::new(credentials)
    }
}

/// Builder for a [`SbankenClient`](crate::client::SbankenClient).
#[derive(Debug)]
pub struct SbankenClientBuilder {
    client: Option<reqwest::Client>,
    retry_policy: Option<DynRetryPolicy>,
    environment: Environment,
    credentials: Credentials,
    timeout: Duration,
    application: Option<String>,
}

impl SbankenClientBuilder {
    /// Creates a new builder to configure a [`SbankenClient`](crate::client::SbankenClient).
    pub fn new(credentials: Credentials) -> Self {
        Self {
            client: None,
            retry_policy: Some(DynRetryPolicy(Arc::new(
                ExponentialBackoff::builder().build_with_max_retries(3),
            ))),
            environment: Environment::Live,
            credentials,
            timeout: DEFAULT_REQUEST_TIMEOUT,
            application: None,
        }
    }

    /// Consumes the builder and builds a new [`SbankenClient`](crate::client::SbankenClient).
    pub fn build(self) -> Result<SbankenClient, Error> {
        let client = match self.client {
            Some(client) => client,
            None => reqwest::Client::builder().timeout(self.timeout).build()?,
        };

        let user_agent = InjectUserAgentMiddleware::new(self.application.as_deref())?;

        let session_manager = SessionManager::new(
            build_client_with_middleware(
                client.clone(),
                user_agent.clone(),
                self.retry_policy.clone(),
            ),
            self.environment.token_url()?,
        );

        let inner = Arc::new(SbankenClientInner {
            client: build_client_with_middleware(client, user_agent, self.retry_policy),
            session_manager,
            credentials: self.credentials,
            api_url: self.environment.api_url()?,
            environment: self.environment,
        });

        Ok(SbankenClient {
            auth: AuthApi::new(inner.clone()),
            accounts: AccountsApi::new(inner.clone()),
            transactions: TransactionsApi::new(inner.clone()),
            payments: PaymentsApi::new(inner.clone()),
            customers: CustomersApi::new(inner),
        })
    }

    /// Sets a specific reqwest [`Client`](reqwest::Client) to use.
    ///
    /// The timeout configured with [`with_timeout`](Self::with_timeout) is not applied
    /// to a client provided this way.
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Sets a specific [`RetryPolicy`](retry_policies::RetryPolicy) to use when retrying
    /// transient failures.
    ///
    /// To disable automatic retrying of failed requests, use `None`.
    pub fn with_retry_policy(
        mut self,
        retry_policy: impl Into<Option<Arc<dyn RetryPolicy + Send + Sync + 'static>>>,
    ) -> Self {
        self.retry_policy = retry_policy.into().map(DynRetryPolicy);
        self
    }

    /// Sets the environment to which this client should connect.
    ///
    /// Defaults to [`Environment::Live`].
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Sets the timeout of every HTTP request, from connection until the body has been read.
    ///
    /// Defaults to 30 seconds.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Prepends the host application's product token (e.g. `home-dashboard/2.1`) to the
    /// `User-Agent` header.
    pub fn with_application(mut self, application: impl Into<String>) -> Self {
        self.application = Some(application.into());
        self
    }
}

fn build_client_with_middleware(
    client: reqwest::Client,
    user_agent: InjectUserAgentMiddleware,
    retry_policy: Option<DynRetryPolicy>,
) -> ClientWithMiddleware {
    let mut builder = reqwest_middleware::ClientBuilder::new(client)
        .with(user_agent)
        .with(TracingMiddleware::default())
        .with(ErrorHandlingMiddleware);

    if let Some(retry_policy) = retry_policy {
        builder = builder.with(RetryReadsMiddleware::new(retry_policy));
    }

    builder.build()
}
