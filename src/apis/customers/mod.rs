//! APIs and models related to the customer owning the accounts.

mod api;
mod model;

pub use api::CustomersApi;
pub use model::*;
