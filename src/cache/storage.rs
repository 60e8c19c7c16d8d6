//! Cache storage trait and SQLite implementation.

use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::catalog::{AssociatedRecord, CatalogEntity};

/// Append-only persistence for entities and their associated records.
pub trait CacheStore {
  /// Append entities. No deduplication.
  fn store_entities(&self, records: &[CatalogEntity]) -> Result<()>;

  /// Id of the earliest stored entity whose name matches exactly.
  fn lookup_entity_id(&self, name: &str) -> Result<Option<i64>>;

  /// Append associated records. No deduplication.
  fn store_associated(&self, records: &[AssociatedRecord]) -> Result<()>;

  /// All stored titles for an entity.
  fn lookup_associated(&self, id: i64) -> Result<Vec<String>>;

  /// True once at least one associated record exists for `id`.
  fn is_synchronized(&self, id: i64) -> Result<bool>;
}

const ENTITIES_TABLE: &str = "entities";
const ASSOCIATED_TABLE: &str = "associated";

const ENTITIES_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS entities (
    id INTEGER NOT NULL,
    name TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_entities_name ON entities(name);
"#;

const ASSOCIATED_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS associated (
    entity_id INTEGER NOT NULL,
    title TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_associated_entity ON associated(entity_id);
"#;

/// SQLite-based cache storage.
///
/// Tables are created on first append, so every read tolerates a database
/// that has never been written to.
pub struct SqliteCache {
  conn: Mutex<Connection>,
}

impl SqliteCache {
  /// Open or create the cache database at `path`.
  pub fn open(path: &Path) -> Result<Self> {
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create cache directory: {}", e))?;
    }

    let conn = Connection::open(path)
      .map_err(|e| eyre!("Failed to open cache database at {}: {}", path.display(), e))?;

    debug!(path = %path.display(), "Opened cache database");

    Ok(Self {
      conn: Mutex::new(conn),
    })
  }

  pub fn open_in_memory() -> Result<Self> {
    let conn = Connection::open_in_memory()
      .map_err(|e| eyre!("Failed to open in-memory cache: {}", e))?;

    Ok(Self {
      conn: Mutex::new(conn),
    })
  }

  /// Close the underlying connection, surfacing any error SQLite reports.
  pub fn close(self) -> Result<()> {
    let conn = self
      .conn
      .into_inner()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .close()
      .map_err(|(_, e)| eyre!("Failed to close cache database: {}", e))?;

    debug!("Closed cache database");
    Ok(())
  }

  /// Close the cache at the end of a batch, keeping the batch's outcome.
  ///
  /// When both the batch and the close fail, the batch error is returned and
  /// the close error is only logged.
  pub fn close_after<T>(self, outcome: Result<T>) -> Result<T> {
    settle(outcome, self.close())
  }

  /// Number of stored entity rows, duplicates included.
  pub fn entity_count(&self) -> Result<u64> {
    let conn = self.lock()?;
    if !table_exists(&conn, ENTITIES_TABLE)? {
      return Ok(0);
    }

    let count: i64 = conn
      .query_row("SELECT COUNT(*) FROM entities", [], |row| row.get(0))
      .map_err(|e| eyre!("Failed to count entities: {}", e))?;

    Ok(count as u64)
  }

  fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
    self.conn.lock().map_err(|e| eyre!("Lock poisoned: {}", e))
  }
}

fn settle<T>(outcome: Result<T>, closed: Result<()>) -> Result<T> {
  match (outcome, closed) {
    (Err(e), Err(close_err)) => {
      warn!(error = %close_err, "Failed to close cache after a failed batch");
      Err(e)
    }
    (outcome, closed) => {
      closed?;
      outcome
    }
  }
}

fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
  let count: i64 = conn
    .query_row(
      "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
      params![table],
      |row| row.get(0),
    )
    .map_err(|e| eyre!("Failed to inspect schema: {}", e))?;

  Ok(count > 0)
}

impl CacheStore for SqliteCache {
  fn store_entities(&self, records: &[CatalogEntity]) -> Result<()> {
    let mut conn = self.lock()?;

    conn
      .execute_batch(ENTITIES_SCHEMA)
      .map_err(|e| eyre!("Failed to create entities table: {}", e))?;

    let tx = conn
      .transaction()
      .map_err(|e| eyre!("Failed to begin transaction: {}", e))?;
    {
      let mut stmt = tx
        .prepare("INSERT INTO entities (id, name) VALUES (?, ?)")
        .map_err(|e| eyre!("Failed to prepare insert: {}", e))?;

      for record in records {
        stmt
          .execute(params![record.id, record.name])
          .map_err(|e| eyre!("Failed to store entity {}: {}", record.id, e))?;
      }
    }
    tx.commit()
      .map_err(|e| eyre!("Failed to commit transaction: {}", e))?;

    debug!(rows = records.len(), "Stored entities");
    Ok(())
  }

  fn lookup_entity_id(&self, name: &str) -> Result<Option<i64>> {
    let conn = self.lock()?;
    if !table_exists(&conn, ENTITIES_TABLE)? {
      return Ok(None);
    }

    conn
      .query_row(
        "SELECT id FROM entities WHERE name = ? ORDER BY rowid LIMIT 1",
        params![name],
        |row| row.get(0),
      )
      .optional()
      .map_err(|e| eyre!("Failed to look up entity '{}': {}", name, e))
  }

  fn store_associated(&self, records: &[AssociatedRecord]) -> Result<()> {
    let mut conn = self.lock()?;

    conn
      .execute_batch(ASSOCIATED_SCHEMA)
      .map_err(|e| eyre!("Failed to create associated table: {}", e))?;

    let tx = conn
      .transaction()
      .map_err(|e| eyre!("Failed to begin transaction: {}", e))?;
    {
      let mut stmt = tx
        .prepare("INSERT INTO associated (entity_id, title) VALUES (?, ?)")
        .map_err(|e| eyre!("Failed to prepare insert: {}", e))?;

      for record in records {
        stmt
          .execute(params![record.entity_id, record.title])
          .map_err(|e| eyre!("Failed to store associated record: {}", e))?;
      }
    }
    tx.commit()
      .map_err(|e| eyre!("Failed to commit transaction: {}", e))?;

    debug!(rows = records.len(), "Stored associated records");
    Ok(())
  }

  fn lookup_associated(&self, id: i64) -> Result<Vec<String>> {
    let conn = self.lock()?;
    if !table_exists(&conn, ASSOCIATED_TABLE)? {
      return Ok(Vec::new());
    }

    let mut stmt = conn
      .prepare("SELECT title FROM associated WHERE entity_id = ?")
      .map_err(|e| eyre!("Failed to prepare query: {}", e))?;

    let titles = stmt
      .query_map(params![id], |row| row.get(0))
      .map_err(|e| eyre!("Failed to query associated records: {}", e))?
      .collect::<rusqlite::Result<Vec<String>>>()
      .map_err(|e| eyre!("Failed to read associated record: {}", e))?;

    Ok(titles)
  }

  fn is_synchronized(&self, id: i64) -> Result<bool> {
    let conn = self.lock()?;
    if !table_exists(&conn, ASSOCIATED_TABLE)? {
      return Ok(false);
    }

    let found: Option<i64> = conn
      .query_row(
        "SELECT entity_id FROM associated WHERE entity_id = ? LIMIT 1",
        params![id],
        |row| row.get(0),
      )
      .optional()
      .map_err(|e| eyre!("Failed to check cache for {}: {}", id, e))?;

    Ok(found.is_some())
  }
}
