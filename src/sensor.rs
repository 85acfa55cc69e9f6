//! Projection of a tracked account into a sensor entity for monitoring hosts.

use crate::{snapshot::AccountSnapshot, tracker::TrackedAccount};
use chrono::Local;
use rust_decimal::{prelude::ToPrimitive, Decimal};
use serde::Serialize;
use serde_json::{Map, Value};

pub static UNIT_OF_MEASUREMENT: &str = "kr";
pub static ICON: &str = "mdi:cash";

static LAST_UPDATE_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// One sensor per account, keyed by the account number.
///
/// The state is the available amount of the last-known snapshot. Before the first successful
/// refresh it is the amount reported at discovery, or `None` if the account was tracked from a
/// bare identity.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct AccountSensor {
    pub unique_id: String,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub state: Option<Decimal>,
    pub unit_of_measurement: &'static str,
    pub icon: &'static str,
    pub attributes: Map<String, Value>,
}

impl From<&TrackedAccount> for AccountSensor {
    fn from(tracked: &TrackedAccount) -> Self {
        let identity = tracked.identity();

        let mut attributes = Map::new();
        attributes.insert("account_id".into(), identity.account_id.clone().into());
        attributes.insert("account_number".into(), identity.account_number.clone().into());
        attributes.insert("name".into(), identity.name.clone().into());
        attributes.insert("account_type".into(), identity.account_type.clone().into());
        attributes.insert("stale".into(), tracked.is_stale().into());
        let state = match (tracked.snapshot(), tracked.discovered()) {
            (Some(snapshot), _) => {
                insert_snapshot(&mut attributes, snapshot);
                Some(snapshot.available)
            }
            (None, Some(account)) => {
                insert_balances(
                    &mut attributes,
                    account.available,
                    account.balance,
                    account.credit_limit,
                );
                Some(account.available)
            }
            (None, None) => None,
        };

        Self {
            unique_id: identity.account_number.clone(),
            name: format!("{} ({})", identity.name, identity.account_number),
            state,
            unit_of_measurement: UNIT_OF_MEASUREMENT,
            icon: ICON,
            attributes,
        }
    }
}

fn insert_balances(
    attributes: &mut Map<String, Value>,
    available: Decimal,
    balance: Decimal,
    credit_limit: Decimal,
) {
    attributes.insert("available".into(), number(available));
    attributes.insert("balance".into(), number(balance));
    attributes.insert("credit_limit".into(), number(credit_limit));
}

fn insert_snapshot(attributes: &mut Map<String, Value>, snapshot: &AccountSnapshot) {
    insert_balances(
        attributes,
        snapshot.available,
        snapshot.balance,
        snapshot.credit_limit,
    );
    attributes.insert(
        "last_update".into(),
        snapshot
            .fetched_at
            .with_timezone(&Local)
            .format(LAST_UPDATE_FORMAT)
            .to_string()
            .into(),
    );
    attributes.insert(
        "transactions".into(),
        snapshot
            .transactions
            .iter()
            .map(|t| t.as_json().clone())
            .collect::<Vec<_>>()
            .into(),
    );
    attributes.insert(
        "payments".into(),
        snapshot
            .payments
            .iter()
            .map(|p| p.as_json().clone())
            .collect::<Vec<_>>()
            .into(),
    );
}

fn number(value: Decimal) -> Value {
    value.to_f64().map_or(Value::Null, Value::from)
}
