use std::collections::BTreeSet;

/// A named item of the remote catalog. `name` is not unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntity {
  pub id: i64,
  pub name: String,
}

/// A sub-resource title linked to one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociatedRecord {
  pub entity_id: i64,
  pub title: String,
}

/// Attributes refreshed from the remote on every resolve.
#[derive(Debug, Clone, Default)]
pub struct EntityDetails {
  pub description: String,
  pub modified: String,
  pub urls: Vec<EntityUrl>,
  pub thumbnail: Option<EntityImage>,
}

#[derive(Debug, Clone)]
pub struct EntityUrl {
  pub kind: String,
  pub url: String,
}

#[derive(Debug, Clone)]
pub struct EntityImage {
  pub path: String,
  pub extension: String,
}

impl EntityImage {
  pub fn url(&self) -> String {
    format!("{}.{}", self.path, self.extension)
  }
}

/// An entity with attributes loaded and associated records synchronized.
#[derive(Debug, Clone)]
pub struct ResolvedEntity {
  pub id: i64,
  pub name: String,
  pub details: EntityDetails,
  pub associated: Vec<String>,
}

impl ResolvedEntity {
  /// Titles both entities are associated with (exact string equality).
  pub fn overlaps_with(&self, other: &ResolvedEntity) -> BTreeSet<String> {
    let mine: BTreeSet<&String> = self.associated.iter().collect();
    other
      .associated
      .iter()
      .filter(|t| mine.contains(t))
      .cloned()
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn entity(id: i64, titles: &[&str]) -> ResolvedEntity {
    ResolvedEntity {
      id,
      name: format!("entity {}", id),
      details: EntityDetails::default(),
      associated: titles.iter().map(|t| t.to_string()).collect(),
    }
  }

  #[test]
  fn test_overlap_is_set_intersection() {
    let a = entity(1, &["a", "b", "c"]);
    let b = entity(2, &["d", "b", "c"]);

    let expected: BTreeSet<String> = ["b", "c"].iter().map(|s| s.to_string()).collect();
    assert_eq!(a.overlaps_with(&b), expected);
    assert_eq!(b.overlaps_with(&a), expected);
  }

  #[test]
  fn test_overlap_drops_duplicates() {
    let a = entity(1, &["x", "x", "y"]);
    let b = entity(2, &["x", "x"]);
    assert_eq!(a.overlaps_with(&b).len(), 1);
  }

  #[test]
  fn test_overlap_is_case_and_whitespace_sensitive() {
    let a = entity(1, &["Storm #1"]);
    let b = entity(2, &["storm #1", "Storm #1 "]);
    assert!(a.overlaps_with(&b).is_empty());
  }
}
