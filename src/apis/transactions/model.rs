use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A transaction on an account.
///
/// Transactions are passed through verbatim: amount, dates, description and any other
/// field are kept exactly as the API returned them.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(transparent)]
pub struct Transaction(pub Value);

impl Transaction {
    /// Returns a field of the raw transaction record, e.g. `"amount"` or `"text"`.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// The raw transaction record.
    pub fn as_json(&self) -> &Value {
        &self.0
    }
}
