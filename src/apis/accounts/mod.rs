//! APIs and models related to accounts.

mod api;
mod model;

pub use api::AccountsApi;
pub use model::*;
