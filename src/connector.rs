//! Account discovery and atomic per-account refresh.

use crate::{
    apis::{
        accounts::{Account, AccountIdentity},
        auth::Session,
        customers::Customer,
        payments::Payment,
        transactions::Transaction,
    },
    config::{ConnectorConfig, DEFAULT_NUMBER_OF_PAYMENTS, DEFAULT_NUMBER_OF_TRANSACTIONS},
    error::{ApiError, AuthError},
    snapshot::AccountSnapshot,
    Error, SbankenClient,
};
use chrono::Utc;
use std::fmt;

/// How much history each refresh fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshOptions {
    /// Upper bound on the transactions kept per account.
    pub number_of_transactions: u32,
    /// Upper bound on the payments kept per account.
    pub number_of_payments: u32,
}

impl Default for RefreshOptions {
    fn default() -> Self {
        Self {
            number_of_transactions: DEFAULT_NUMBER_OF_TRANSACTIONS,
            number_of_payments: DEFAULT_NUMBER_OF_PAYMENTS,
        }
    }
}

/// Step of a refresh that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefreshStage {
    Authenticate,
    Account,
    Transactions,
    Payments,
    /// The task running the refresh panicked or was cancelled.
    Worker,
}

impl fmt::Display for RefreshStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self {
            RefreshStage::Authenticate => "authentication",
            RefreshStage::Account => "account",
            RefreshStage::Transactions => "transactions",
            RefreshStage::Payments => "payments",
            RefreshStage::Worker => "worker task",
        };
        f.write_str(stage)
    }
}

/// A refresh of one account did not complete, so no snapshot was produced.
#[derive(thiserror::Error, Debug)]
#[error("Refresh of account {account_id} failed at {stage}: {source}")]
pub struct RefreshError {
    pub account_id: String,
    pub stage: RefreshStage,
    pub source: Error,
}

impl RefreshError {
    /// Error reported by Sbanken, if the refresh failed because of one.
    pub fn api_error(&self) -> Option<&ApiError> {
        self.source.api_error()
    }
}

fn failed_at(account_id: &str, stage: RefreshStage) -> impl FnOnce(Error) -> RefreshError + '_ {
    move |source| RefreshError {
        account_id: account_id.to_string(),
        stage,
        source,
    }
}

/// Turns the Sbanken data endpoints into one [`AccountSnapshot`] per account.
///
/// Every refresh authenticates anew and then issues its data calls in sequence. The connector
/// holds no mutable state, so clones can refresh different accounts concurrently.
#[derive(Debug, Clone)]
pub struct AccountConnector {
    client: SbankenClient,
    options: RefreshOptions,
}

impl AccountConnector {
    pub fn new(client: SbankenClient, options: RefreshOptions) -> Self {
        Self { client, options }
    }

    /// Validates `config` and builds a connector for the live Sbanken environment.
    pub fn from_config(config: &ConnectorConfig) -> Result<Self, Error> {
        config.validate()?;

        let client = SbankenClient::builder(config.credentials())
            .with_timeout(config.request_timeout())
            .build()?;

        Ok(Self::new(client, config.refresh_options()))
    }

    pub fn client(&self) -> &SbankenClient {
        &self.client
    }

    pub fn options(&self) -> RefreshOptions {
        self.options
    }

    /// Obtains a new [`Session`]. No token is reused between calls.
    pub async fn authenticate(&self) -> Result<Session, AuthError> {
        self.client.auth.authenticate().await
    }

    /// Lists the accounts available to the credentials, in API order.
    ///
    /// Failures are returned as-is: a host that cannot discover accounts has nothing to track.
    pub async fn discover(&self, session: &Session) -> Result<Vec<AccountIdentity>, Error> {
        let accounts = self.list_accounts(session).await?;

        Ok(accounts.into_iter().map(|account| account.identity).collect())
    }

    /// Same as [`discover`](Self::discover), keeping the balances reported by the listing.
    #[tracing::instrument(name = "Discover Accounts", skip_all)]
    pub async fn list_accounts(&self, session: &Session) -> Result<Vec<Account>, Error> {
        let accounts = self.client.accounts.list(session).await?;
        tracing::info!("Discovered {} accounts", accounts.len());

        Ok(accounts)
    }

    pub async fn fetch_account(
        &self,
        session: &Session,
        account_id: &str,
    ) -> Result<Account, Error> {
        self.client.accounts.get_by_id(session, account_id).await
    }

    pub async fn fetch_transactions(
        &self,
        session: &Session,
        account_id: &str,
        length: u32,
    ) -> Result<Vec<Transaction>, Error> {
        self.client
            .transactions
            .list(session, account_id, length)
            .await
    }

    pub async fn fetch_payments(
        &self,
        session: &Session,
        account_id: &str,
        length: u32,
    ) -> Result<Vec<Payment>, Error> {
        self.client.payments.list(session, account_id, length).await
    }

    /// Customer owning the accounts. Not part of a refresh.
    pub async fn fetch_customer(&self, session: &Session) -> Result<Customer, Error> {
        self.client.customers.get(session).await
    }

    /// Fetches the account, its transactions and its payments, then assembles a snapshot.
    ///
    /// Either all three calls succeed and a complete snapshot is returned, or the first
    /// failure is returned and nothing else is produced. Dropping the returned future cancels
    /// the refresh.
    #[tracing::instrument(name = "Refresh Account", skip(self))]
    pub async fn refresh(&self, account_id: &str) -> Result<AccountSnapshot, RefreshError> {
        let session = self
            .authenticate()
            .await
            .map_err(|e| failed_at(account_id, RefreshStage::Authenticate)(e.into()))?;

        let account = self
            .fetch_account(&session, account_id)
            .await
            .map_err(failed_at(account_id, RefreshStage::Account))?;
        if account.identity.account_id != account_id {
            return Err(failed_at(account_id, RefreshStage::Account)(
                Error::AccountMismatch {
                    requested: account_id.to_string(),
                    returned: account.identity.account_id,
                },
            ));
        }

        let transactions = self
            .fetch_transactions(&session, account_id, self.options.number_of_transactions)
            .await
            .map_err(failed_at(account_id, RefreshStage::Transactions))?;

        let payments = self
            .fetch_payments(&session, account_id, self.options.number_of_payments)
            .await
            .map_err(failed_at(account_id, RefreshStage::Payments))?;

        tracing::info!(
            "Refreshed account with {} transactions and {} payments",
            transactions.len(),
            payments.len()
        );

        Ok(AccountSnapshot::new(
            account,
            transactions,
            payments,
            Utc::now(),
        ))
    }
}
