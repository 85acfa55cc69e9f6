//! Per-account state as of one poll cycle.

use crate::apis::{
    accounts::{Account, AccountIdentity},
    payments::Payment,
    transactions::Transaction,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Complete, internally consistent state of one account as of one refresh.
///
/// A snapshot is only ever built when the account, transactions and payments calls
/// all succeeded. It is replaced wholesale on the next successful refresh.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AccountSnapshot {
    pub identity: AccountIdentity,
    #[serde(with = "rust_decimal::serde::float")]
    pub available: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub credit_limit: Decimal,
    /// Most recent transactions first, at most the requested number.
    pub transactions: Vec<Transaction>,
    /// At most the requested number of payments.
    pub payments: Vec<Payment>,
    pub fetched_at: DateTime<Utc>,
}

impl AccountSnapshot {
    pub(crate) fn new(
        account: Account,
        transactions: Vec<Transaction>,
        payments: Vec<Payment>,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        Self {
            identity: account.identity,
            available: account.available,
            balance: account.balance,
            credit_limit: account.credit_limit,
            transactions,
            payments,
            fetched_at,
        }
    }

    pub fn account_id(&self) -> &str {
        &self.identity.account_id
    }

    /// Time elapsed between the refresh that produced this snapshot and `now`.
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.fetched_at
    }
}
