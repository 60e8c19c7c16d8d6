use color_eyre::Result;
use tracing::info;

use crate::cache::CacheStore;
use crate::catalog::pager::{walk, WalkSummary};
use crate::catalog::{CatalogApi, CatalogEntity};

/// Store every entity of the remote listing in the cache.
///
/// Rows are appended; running this twice stores the catalog twice.
pub async fn sync_catalog<C: CatalogApi, S: CacheStore>(
  client: &C,
  cache: &S,
) -> Result<WalkSummary> {
  info!("Synchronizing catalog entities");

  let summary = walk(
    move |offset| client.list_entities(offset),
    move |results| {
      let entities: Vec<CatalogEntity> = results.into_iter().map(Into::into).collect();
      cache.store_entities(&entities)
    },
  )
  .await?;

  info!(
    pages = summary.pages,
    records = summary.records,
    "Catalog synchronized"
  );
  Ok(summary)
}
