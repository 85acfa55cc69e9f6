use crate::{
    apis::{
        accounts::Account,
        auth::Session,
        Envelope, SbankenClientInner,
    },
    Error,
};
use reqwest::header::AUTHORIZATION;
use std::sync::Arc;
use urlencoding::encode;

/// Sbanken Accounts APIs client.
#[derive(Clone, Debug)]
pub struct AccountsApi {
    inner: Arc<SbankenClientInner>,
}

impl AccountsApi {
    pub(crate) fn new(inner: Arc<SbankenClientInner>) -> Self {
        Self { inner }
    }

    /// Lists all the accounts of the customer, in the order returned by the API.
    #[tracing::instrument(name = "List Accounts", skip_all)]
    pub async fn list(&self, session: &Session) -> Result<Vec<Account>, Error> {
        let res = self
            .inner
            .client
            .get(self.inner.endpoint("Accounts/")?)
            .header(AUTHORIZATION, session.authorization_header()?)
            .send()
            .await?;

        Envelope::from_response(res).await?.into_items()
    }

    /// Gets an account and its current balances.
    #[tracing::instrument(name = "Get Account by ID", skip(self, session))]
    pub async fn get_by_id(&self, session: &Session, account_id: &str) -> Result<Account, Error> {
        let res = self
            .inner
            .client
            .get(
                self.inner
                    .endpoint(&format!("Accounts/{}", encode(account_id)))?,
            )
            .header(AUTHORIZATION, session.authorization_header()?)
            .send()
            .await?;

        Envelope::from_response(res).await?.into_item()
    }
}
