use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A payment registered on an account, passed through verbatim from the API.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(transparent)]
pub struct Payment(pub Value);

impl Payment {
    /// Returns a field of the raw payment record.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn as_json(&self) -> &Value {
        &self.0
    }
}
