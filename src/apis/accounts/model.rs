use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Stable identifying fields of an account.
///
/// `account_number` is the external unique key of the account.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct AccountIdentity {
    pub account_id: String,
    pub account_number: String,
    pub name: String,
    pub account_type: String,
}

/// An account together with its current balances.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    #[serde(flatten)]
    pub identity: AccountIdentity,
    #[serde(with = "rust_decimal::serde::float")]
    pub available: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub credit_limit: Decimal,
}
