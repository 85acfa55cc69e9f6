use crate::{
    apis::{auth::Session, payments::Payment, Envelope, SbankenClientInner},
    Error,
};
use reqwest::header::AUTHORIZATION;
use std::sync::Arc;
use urlencoding::encode;

/// Sbanken Payments APIs client.
#[derive(Clone, Debug)]
pub struct PaymentsApi {
    inner: Arc<SbankenClientInner>,
}

impl PaymentsApi {
    pub(crate) fn new(inner: Arc<SbankenClientInner>) -> Self {
        Self { inner }
    }

    /// Lists up to `length` payments registered on an account.
    #[tracing::instrument(name = "List Payments", skip(self, session))]
    pub async fn list(
        &self,
        session: &Session,
        account_id: &str,
        length: u32,
    ) -> Result<Vec<Payment>, Error> {
        let res = self
            .inner
            .client
            .get(
                self.inner
                    .endpoint(&format!("Payments/{}", encode(account_id)))?,
            )
            .query(&[("length", length)])
            .header(AUTHORIZATION, session.authorization_header()?)
            .send()
            .await?;

        Envelope::from_response(res).await?.into_bounded_items(length)
    }
}
