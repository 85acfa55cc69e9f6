use crate::{
    apis::{auth::Session, customers::Customer, Envelope, SbankenClientInner},
    Error,
};
use reqwest::header::AUTHORIZATION;
use std::sync::Arc;

/// Sbanken Customers APIs client.
#[derive(Clone, Debug)]
pub struct CustomersApi {
    inner: Arc<SbankenClientInner>,
}

impl CustomersApi {
    pub(crate) fn new(inner: Arc<SbankenClientInner>) -> Self {
        Self { inner }
    }

    /// Gets the profile of the customer owning the accounts.
    #[tracing::instrument(name = "Get Customer", skip_all)]
    pub async fn get(&self, session: &Session) -> Result<Customer, Error> {
        let res = self
            .inner
            .client
            .get(self.inner.endpoint("Customers/")?)
            .header(AUTHORIZATION, session.authorization_header()?)
            .send()
            .await?;

        Envelope::from_response(res).await?.into_item()
    }
}
