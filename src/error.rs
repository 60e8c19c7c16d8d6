//! Failure kinds raised by the synchronization engine.
//!
//! These travel inside `color_eyre::Report`; callers that need to branch on
//! the kind use `report.downcast_ref::<CatalogError>()`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
  /// The remote answered outside the success range. The body is kept verbatim.
  #[error("Remote API error {status}: {body}")]
  RemoteApi { status: u16, body: String },

  /// The name has no row in the entity cache.
  #[error("{name} is not a known catalog entity")]
  NotFound { name: String },

  #[error("Transport failure: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("Failed to decode response: {0}")]
  Decode(#[from] serde_json::Error),

  /// An empty page came back before the reported total was reached.
  #[error("Pagination stalled at offset {offset} of {total}")]
  StalledPagination { offset: u64, total: u64 },
}
