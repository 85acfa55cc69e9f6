use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Profile of the customer the credentials belong to.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub customer_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email_address: Option<String>,
    /// Any other field returned by the API, verbatim.
    #[serde(flatten)]
    pub other: Map<String, Value>,
}
