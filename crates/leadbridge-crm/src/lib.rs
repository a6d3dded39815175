//! Remote CRM client.
//!
//! A thin capability over the CRM's contact and opportunity endpoints. Side
//! effects are strictly at the remote system; errors are non-retriable from
//! this crate's perspective, retry policy belongs to the caller.

mod client;
mod config;
mod error;
mod fields;
mod traits;

pub use client::{HttpCrmClient, HttpCrmConnector};
pub use config::CrmConfig;
pub use error::CrmError;
pub use fields::{ContactFields, DealFields};
pub use traits::{CrmApi, CrmConnector, DynCrmApi, TokenProvider};
