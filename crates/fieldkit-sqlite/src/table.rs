//! [`SqliteTable`]: foreign-key existence checks against a SQLite table.

use std::sync::TryLockError;

use fieldkit_core::ReferencedTable;
use rusqlite::OptionalExtension as _;

use crate::SharedConnection;

/// A referenced table living in a SQLite database.
///
/// Hand it to [`fieldkit_core::ForeignKey::references`] inside an `Arc`;
/// keys keep only a weak handle, so dropping the `Arc` unbinds them.
///
/// Lookups never wait for the shared connection. While another guard on it
/// is held (including one held by the caller) every id reads as missing.
pub struct SqliteTable {
  conn:       SharedConnection,
  name:       String,
  key_column: String,
}

impl SqliteTable {
  /// A table keyed by its `id` column.
  pub fn new(conn: SharedConnection, name: impl Into<String>) -> Self {
    Self::with_key_column(conn, name, "id")
  }

  pub fn with_key_column(
    conn: SharedConnection,
    name: impl Into<String>,
    key_column: impl Into<String>,
  ) -> Self {
    Self { conn, name: name.into(), key_column: key_column.into() }
  }

  fn lookup(&self, id: i64) -> rusqlite::Result<bool> {
    let sql = format!(
      "SELECT 1 FROM {} WHERE {} = ?1 LIMIT 1",
      quote_ident(&self.name),
      quote_ident(&self.key_column),
    );
    let conn = match self.conn.try_lock() {
      Ok(conn) => conn,
      Err(TryLockError::WouldBlock) => {
        tracing::warn!(table = %self.name, "connection busy, skipping lookup");
        return Ok(false);
      }
      Err(TryLockError::Poisoned(_)) => {
        tracing::warn!(table = %self.name, "connection mutex poisoned");
        return Ok(false);
      }
    };
    let found = conn
      .query_row(&sql, rusqlite::params![id], |_| Ok(()))
      .optional()?;
    Ok(found.is_some())
  }
}

impl ReferencedTable for SqliteTable {
  fn table_name(&self) -> &str { &self.name }

  fn key_column(&self) -> &str { &self.key_column }

  fn contains_id(&self, id: i64) -> bool {
    match self.lookup(id) {
      Ok(found) => {
        tracing::debug!(table = %self.name, id, found, "foreign key lookup");
        found
      }
      Err(e) => {
        tracing::warn!(table = %self.name, id, error = %e, "foreign key lookup failed");
        false
      }
    }
  }
}

/// Double-quote an SQL identifier, doubling embedded quotes.
fn quote_ident(ident: &str) -> String {
  format!("\"{}\"", ident.replace('"', "\"\""))
}
