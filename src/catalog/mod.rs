//! Remote catalog access: signing, the HTTP client and pagination.

pub mod api_types;
pub mod client;
pub mod pager;
pub mod signer;
pub mod types;

#[cfg(test)]
pub mod fake;

pub use client::{CatalogApi, CatalogClient};
pub use types::{AssociatedRecord, CatalogEntity, ResolvedEntity};
