//! Connector configuration, as supplied by the host.

use crate::{
    apis::auth::{Credentials, Token},
    connector::RefreshOptions,
    Error,
};
use serde::{Deserialize, Deserializer};
use std::time::Duration;

/// Default number of transactions fetched per account.
pub const DEFAULT_NUMBER_OF_TRANSACTIONS: u32 = 3;
/// Default number of payments fetched per account.
pub const DEFAULT_NUMBER_OF_PAYMENTS: u32 = 100;
/// Default poll cadence, in seconds (20 minutes).
pub const DEFAULT_SCAN_INTERVAL_SECS: u64 = 20 * 60;
/// Default HTTP request timeout, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Configuration of an [`AccountConnector`](crate::connector::AccountConnector) and its host.
///
/// Field names follow the keys used by existing Sbanken sensor configurations
/// (`client_id`, `secret`, `numberOfTransactions`, `numberOfPayments`, `scan_interval`).
/// Counts may be given as numbers or numeric strings.
#[derive(Deserialize, Debug, Clone)]
pub struct ConnectorConfig {
    pub client_id: String,
    pub secret: Token,
    #[serde(
        rename = "numberOfTransactions",
        alias = "number_of_transactions",
        alias = "numberoftransactions",
        default = "default_number_of_transactions",
        deserialize_with = "number_or_string"
    )]
    pub number_of_transactions: u32,
    #[serde(
        rename = "numberOfPayments",
        alias = "number_of_payments",
        alias = "numberofpayments",
        default = "default_number_of_payments",
        deserialize_with = "number_or_string"
    )]
    pub number_of_payments: u32,
    /// Poll cadence, in seconds.
    #[serde(default = "default_scan_interval")]
    pub scan_interval: u64,
    /// Timeout of every HTTP request, in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
}

impl ConnectorConfig {
    /// Creates a configuration with the given credentials and default values for everything else.
    pub fn new(client_id: impl Into<String>, secret: impl Into<Token>) -> Self {
        Self {
            client_id: client_id.into(),
            secret: secret.into(),
            number_of_transactions: DEFAULT_NUMBER_OF_TRANSACTIONS,
            number_of_payments: DEFAULT_NUMBER_OF_PAYMENTS,
            scan_interval: DEFAULT_SCAN_INTERVAL_SECS,
            request_timeout: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }

    /// Checks the values a host may get wrong.
    ///
    /// A count of zero is accepted and results in empty lists.
    pub fn validate(&self) -> Result<(), Error> {
        if self.client_id.trim().is_empty() {
            return Err(Error::InvalidConfig("client_id must not be empty".into()));
        }
        if self.secret.expose_secret().is_empty() {
            return Err(Error::InvalidConfig("secret must not be empty".into()));
        }
        if self.scan_interval == 0 {
            return Err(Error::InvalidConfig(
                "scan_interval must be a positive number of seconds".into(),
            ));
        }
        if self.request_timeout == 0 {
            return Err(Error::InvalidConfig(
                "request_timeout must be a positive number of seconds".into(),
            ));
        }

        Ok(())
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.client_id.clone(), self.secret.clone())
    }

    pub fn refresh_options(&self) -> RefreshOptions {
        RefreshOptions {
            number_of_transactions: self.number_of_transactions,
            number_of_payments: self.number_of_payments,
        }
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

fn default_number_of_transactions() -> u32 {
    DEFAULT_NUMBER_OF_TRANSACTIONS
}

fn default_number_of_payments() -> u32 {
    DEFAULT_NUMBER_OF_PAYMENTS
}

fn default_scan_interval() -> u64 {
    DEFAULT_SCAN_INTERVAL_SECS
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

/// Accepts `3` as well as `"3"`.
fn number_or_string<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u32),
        String(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
