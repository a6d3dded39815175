//! # leadbridge-storage
//!
//! Mapping-store abstraction for the LeadBridge sync service.
//!
//! This crate defines the traits and link types all mapping-store backends
//! must implement. It does not contain any implementations - those are
//! provided by separate crates.
//!
//! The store owns three durable relations:
//! - tenant: source company -> CRM location + credential reference
//! - contact: source customer -> CRM contact
//! - opportunity: source estimate/job -> CRM opportunity
//!
//! ## Example
//!
//! ```ignore
//! use leadbridge_storage::{LinkStore, StoreError, OpportunityLink};
//!
//! async fn deal_for_job(
//!     store: &dyn LinkStore,
//!     company_id: &str,
//!     job_id: &str,
//! ) -> Result<Option<OpportunityLink>, StoreError> {
//!     store.opportunity_by_job(company_id, job_id).await
//! }
//! ```

mod error;
mod traits;
mod types;

pub use error::StoreError;
pub use traits::LinkStore;
pub use types::{ContactLink, OpportunityLink, TenantLink};

/// Type alias for a store result.
pub type StoreResult<T> = Result<T, StoreError>;

/// Type alias for a boxed store trait object.
pub type DynLinkStore = std::sync::Arc<dyn LinkStore>;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::StoreError;
    pub use crate::traits::LinkStore;
    pub use crate::types::{ContactLink, OpportunityLink, TenantLink};
    pub use crate::{DynLinkStore, StoreResult};
}
