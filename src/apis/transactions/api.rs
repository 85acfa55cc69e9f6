use crate::{
    apis::{auth::Session, transactions::Transaction, Envelope, SbankenClientInner},
    Error,
};
use reqwest::header::AUTHORIZATION;
use std::sync::Arc;
use urlencoding::encode;

/// Sbanken Transactions APIs client.
#[derive(Clone, Debug)]
pub struct TransactionsApi {
    inner: Arc<SbankenClientInner>,
}

impl TransactionsApi {
    pub(crate) fn new(inner: Arc<SbankenClientInner>) -> Self {
        Self { inner }
    }

    /// Lists the most recent transactions of an account.
    ///
    /// `length` is sent as the `length` query parameter and at most `length` transactions
    /// are returned, in the order the API provides them (most recent first).
    #[tracing::instrument(name = "List Transactions", skip(self, session))]
    pub async fn list(
        &self,
        session: &Session,
        account_id: &str,
        length: u32,
    ) -> Result<Vec<Transaction>, Error> {
        let res = self
            .inner
            .client
            .get(
                self.inner
                    .endpoint(&format!("Transactions/{}", encode(account_id)))?,
            )
            .query(&[("length", length)])
            .header(AUTHORIZATION, session.authorization_header()?)
            .send()
            .await?;

        Envelope::from_response(res).await?.into_bounded_items(length)
    }
}
