//! Event routing and cross-system reconciliation.
//!
//! The [`SyncEngine`] takes a raw webhook body and reconciles the CRM's
//! contact/opportunity pipeline with it: ensuring the contact exists,
//! creating or updating the deal, merging estimate-to-job lineage onto a
//! single record, and closing deals out as won or lost. It always returns a
//! structured [`SyncReport`], never an error, so the transport layer can
//! acknowledge receipt unconditionally.

mod engine;
mod report;

pub use engine::SyncEngine;
pub use report::{Disposition, SyncReport};
