//! APIs and models related to payments.

mod api;
mod model;

pub use api::PaymentsApi;
pub use model::*;
