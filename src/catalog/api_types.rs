//! Serde-deserializable types matching catalog API responses.
//!
//! Every endpoint wraps its payload in `{"data": {...}}`. The listings carry
//! offset/count/total next to `results` and all four are required; the single
//! entity endpoint only promises `results`.

use serde::Deserialize;

use super::types::{AssociatedRecord, CatalogEntity, EntityDetails, EntityImage, EntityUrl};

#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<D> {
  pub data: D,
}

/// One bounded slice of a listing.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
  pub offset: u64,
  pub count: u64,
  pub total: u64,
  pub results: Vec<T>,
}

/// Payload of the single entity endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ResultSet<T> {
  pub results: Vec<T>,
}

impl<T> Page<T> {
  /// Offset of the page following this one.
  pub fn next_offset(&self) -> u64 {
    self.offset + self.count
  }

  pub fn is_last(&self) -> bool {
    self.next_offset() >= self.total
  }
}

// ============================================================================
// Entity listing
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ApiEntity {
  pub id: i64,
  pub name: String,
}

impl From<ApiEntity> for CatalogEntity {
  fn from(e: ApiEntity) -> Self {
    CatalogEntity {
      id: e.id,
      name: e.name,
    }
  }
}

// ============================================================================
// Single entity
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ApiEntityDetail {
  pub id: i64,
  #[serde(default)]
  pub description: Option<String>,
  #[serde(default)]
  pub modified: String,
  #[serde(default)]
  pub urls: Vec<ApiUrl>,
  pub thumbnail: Option<ApiImage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiUrl {
  #[serde(rename = "type")]
  pub kind: String,
  pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiImage {
  pub path: String,
  pub extension: String,
}

impl From<ApiEntityDetail> for EntityDetails {
  fn from(d: ApiEntityDetail) -> Self {
    EntityDetails {
      description: d.description.unwrap_or_default(),
      modified: d.modified,
      urls: d
        .urls
        .into_iter()
        .map(|u| EntityUrl {
          kind: u.kind,
          url: u.url,
        })
        .collect(),
      thumbnail: d.thumbnail.map(|t| EntityImage {
        path: t.path,
        extension: t.extension,
      }),
    }
  }
}

// ============================================================================
// Associated records
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ApiAssociated {
  pub title: String,
}

impl ApiAssociated {
  pub fn into_record(self, entity_id: i64) -> AssociatedRecord {
    AssociatedRecord {
      entity_id,
      title: self.title,
    }
  }
}
