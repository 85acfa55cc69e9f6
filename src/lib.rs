//! Rust connector for the [Sbanken](https://sbanken.no) open banking API.
//!
//! The crate authenticates with OAuth2 client credentials, discovers the customer's accounts and
//! turns the account, transactions and payments endpoints into one consistent
//! [`AccountSnapshot`](crate::snapshot::AccountSnapshot) per account, ready to be published by a
//! monitoring or home-automation host.
//!
//! # Usage
//!
//! ## Prerequisites
//!
//! Create an application in the Sbanken developer portal and obtain a client ID and secret.
//!
//! ## Initialize a new `AccountConnector`
//!
//! ```rust,no_run
//! # use sbanken_connector::{AccountConnector, RefreshOptions, SbankenClient, apis::auth::Credentials};
//! # fn main() -> Result<(), sbanken_connector::Error> {
//! let client = SbankenClient::builder(Credentials::new("some-client-id", "some-secret")).build()?;
//! let connector = AccountConnector::new(client, RefreshOptions::default());
//! # Ok(())
//! # }
//! ```
//!
//! ## Discover accounts and refresh them
//!
//! ```rust,no_run
//! # use sbanken_connector::{AccountConnector, Error};
//! #
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! # let connector: AccountConnector = unreachable!();
//! #
//! let session = connector.authenticate().await?;
//! let accounts = connector.discover(&session).await?;
//!
//! for account in &accounts {
//!     let snapshot = connector.refresh(&account.account_id).await?;
//!     tracing::info!(
//!         "Account {} ({}): available {}",
//!         snapshot.identity.name,
//!         snapshot.identity.account_number,
//!         snapshot.available
//!     );
//! }
//! # Ok(())
//! # }
//! ```
//!
//! A failed refresh never yields a partial snapshot. Hosts that keep entities alive across
//! failures can use [`AccountTracker`](crate::tracker::AccountTracker), which retains the
//! last-known snapshot and backs off failing accounts.

#![deny(missing_debug_implementations)]
#![forbid(unsafe_code)]

pub mod apis;
pub mod client;
mod common;
pub mod config;
pub mod connector;
pub mod error;
mod middlewares;
pub mod sensor;
pub mod session;
pub mod snapshot;
pub mod tracker;

pub use client::SbankenClient;
pub use config::ConnectorConfig;
pub use connector::{AccountConnector, RefreshError, RefreshOptions, RefreshStage};
pub use error::Error;
pub use snapshot::AccountSnapshot;
pub use tracker::AccountTracker;
