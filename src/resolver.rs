//! Name-to-entity resolution backed by the cache, with on-demand
//! synchronization of associated records.

use color_eyre::{eyre::eyre, Result};
use std::collections::BTreeSet;
use tracing::{debug, info};

use crate::cache::CacheStore;
use crate::catalog::pager::{walk, WalkSummary};
use crate::catalog::types::EntityDetails;
use crate::catalog::{AssociatedRecord, CatalogApi, ResolvedEntity};
use crate::error::CatalogError;

/// Resolves cached entity names into fully loaded entities.
///
/// A name goes Unresolved -> Resolved (id found in the cache) ->
/// AttributesLoaded (details fetched, associated records read back). `find`
/// only ever returns the last state; any failure on the way aborts it.
pub struct EntityResolver<'a, C, S> {
  client: &'a C,
  cache: &'a S,
}

impl<'a, C: CatalogApi, S: CacheStore> EntityResolver<'a, C, S> {
  pub fn new(client: &'a C, cache: &'a S) -> Self {
    Self { client, cache }
  }

  pub async fn find(&self, name: &str) -> Result<ResolvedEntity> {
    let id = self
      .cache
      .lookup_entity_id(name)?
      .ok_or_else(|| CatalogError::NotFound {
        name: name.to_string(),
      })?;

    debug!(name, id, "Entity resolved");
    self.load_attributes(id, name).await
  }

  /// Details are always refreshed; associated records are fetched only when
  /// the cache has none for this id.
  async fn load_attributes(&self, id: i64, name: &str) -> Result<ResolvedEntity> {
    let page = self.client.get_entity(id).await?;
    let details: EntityDetails = page
      .results
      .into_iter()
      .next()
      .ok_or_else(|| eyre!("Catalog returned no entity for id {}", id))?
      .into();

    if self.cache.is_synchronized(id)? {
      debug!(id, "Associated records served from cache");
    } else {
      let summary = self.sync_associated(id).await?;
      info!(
        id,
        pages = summary.pages,
        records = summary.records,
        "Associated records synchronized"
      );
    }

    let associated = self.cache.lookup_associated(id)?;
    debug!(id, count = associated.len(), "Entity attributes loaded");

    Ok(ResolvedEntity {
      id,
      name: name.to_string(),
      details,
      associated,
    })
  }

  /// Walk every page of the entity's associated records into the cache.
  pub async fn sync_associated(&self, id: i64) -> Result<WalkSummary> {
    let client = self.client;
    let cache = self.cache;

    walk(
      move |offset| client.list_associated(id, offset),
      move |results| {
        let records: Vec<AssociatedRecord> = results
          .into_iter()
          .map(|r| r.into_record(id))
          .collect();
        cache.store_associated(&records)
      },
    )
    .await
  }

  /// Resolve `other_name` and intersect its associated titles with `entity`'s.
  pub async fn overlaps_with(
    &self,
    entity: &ResolvedEntity,
    other_name: &str,
  ) -> Result<BTreeSet<String>> {
    let other = self.find(other_name).await?;
    Ok(entity.overlaps_with(&other))
  }
}
