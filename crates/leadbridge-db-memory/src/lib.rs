//! In-memory mapping-store backend.
//!
//! Backs the [`leadbridge_storage::LinkStore`] trait with papaya lock-free
//! hash maps. Suitable for tests and single-node deployments; durable
//! backends live in their own crates.

mod store;

pub use store::InMemoryLinkStore;
