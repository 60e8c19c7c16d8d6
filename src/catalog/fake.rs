//! Scripted in-memory catalog for tests.

use color_eyre::Result;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use crate::error::CatalogError;

use super::api_types::{ApiAssociated, ApiEntity, ApiEntityDetail, Page, ResultSet};
use super::client::{CatalogApi, PAGE_SIZE};

#[derive(Default)]
pub struct FakeCatalog {
  entities: Vec<ApiEntity>,
  associated: HashMap<i64, Vec<String>>,
  fail_with: Option<u16>,
  fail_associated_from: Option<u64>,
  pub entity_offsets: RefCell<Vec<u64>>,
  pub detail_calls: Cell<u32>,
  pub associated_offsets: RefCell<Vec<(i64, u64)>>,
}

impl FakeCatalog {
  pub fn new() -> Self {
    Self::default()
  }

  /// Adds `n` entities named "entity-<id>" with ids starting at 1.
  pub fn with_numbered_entities(mut self, n: i64) -> Self {
    for id in 1..=n {
      self.entities.push(ApiEntity {
        id,
        name: format!("entity-{}", id),
      });
    }
    self
  }

  pub fn with_associated(mut self, id: i64, titles: &[&str]) -> Self {
    self
      .associated
      .insert(id, titles.iter().map(|t| t.to_string()).collect());
    self
  }

  /// Every call answers with this status instead of data.
  pub fn failing(mut self, status: u16) -> Self {
    self.fail_with = Some(status);
    self
  }

  /// Associated record pages at or past `offset` answer with a 500.
  pub fn failing_associated_from(mut self, offset: u64) -> Self {
    self.fail_associated_from = Some(offset);
    self
  }

  fn check(&self) -> Result<()> {
    Self::fail(self.fail_with)
  }

  fn fail(status: Option<u16>) -> Result<()> {
    match status {
      Some(status) => Err(
        CatalogError::RemoteApi {
          status,
          body: r#"{"code":"Failure"}"#.to_string(),
        }
        .into(),
      ),
      None => Ok(()),
    }
  }
}

fn page_of<T: Clone>(items: &[T], offset: u64) -> Page<T> {
  let start = (offset as usize).min(items.len());
  let end = (start + PAGE_SIZE as usize).min(items.len());
  Page {
    offset,
    count: (end - start) as u64,
    total: items.len() as u64,
    results: items[start..end].to_vec(),
  }
}

impl CatalogApi for FakeCatalog {
  async fn list_entities(&self, offset: u64) -> Result<Page<ApiEntity>> {
    self.entity_offsets.borrow_mut().push(offset);
    self.check()?;
    Ok(page_of(&self.entities, offset))
  }

  async fn get_entity(&self, id: i64) -> Result<ResultSet<ApiEntityDetail>> {
    self.detail_calls.set(self.detail_calls.get() + 1);
    self.check()?;
    Ok(ResultSet {
      results: vec![ApiEntityDetail {
        id,
        description: Some(format!("description of {}", id)),
        modified: "2014-04-29T14:18:17-0400".to_string(),
        urls: Vec::new(),
        thumbnail: None,
      }],
    })
  }

  async fn list_associated(&self, id: i64, offset: u64) -> Result<Page<ApiAssociated>> {
    self.associated_offsets.borrow_mut().push((id, offset));
    self.check()?;
    if self.fail_associated_from.is_some_and(|from| offset >= from) {
      Self::fail(Some(500))?;
    }
    let titles: Vec<ApiAssociated> = self
      .associated
      .get(&id)
      .map(|titles| {
        titles
          .iter()
          .map(|t| ApiAssociated { title: t.clone() })
          .collect()
      })
      .unwrap_or_default();
    Ok(page_of(&titles, offset))
  }
}
