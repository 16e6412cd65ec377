//! The storage boundary: how a field is written to and read back from a
//! persistent store.
//!
//! Backends translate [`StorageValue`] to their native representation; the
//! field types only ever see these five shapes. Timestamps are stored as
//! RFC 3339 strings, UUIDs as hyphenated lowercase strings and documents as
//! compact JSON.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::{Error, Result};

// ─── StorageValue ────────────────────────────────────────────────────────────

/// A storage-safe scalar.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageValue {
  Null,
  Integer(i64),
  Real(f64),
  Text(String),
  Blob(Vec<u8>),
}

impl StorageValue {
  /// Short name of the variant, used in error messages.
  pub fn kind(&self) -> &'static str {
    match self {
      Self::Null => "null",
      Self::Integer(_) => "integer",
      Self::Real(_) => "real",
      Self::Text(_) => "text",
      Self::Blob(_) => "blob",
    }
  }

  pub fn is_null(&self) -> bool { matches!(self, Self::Null) }

  /// The value as UTF-8 text, if it is text or a blob holding valid UTF-8.
  pub fn as_text(&self) -> Option<&str> {
    match self {
      Self::Text(s) => Some(s),
      Self::Blob(b) => std::str::from_utf8(b).ok(),
      _ => None,
    }
  }

  pub(crate) fn unexpected(&self, field: &'static str) -> Error {
    Error::UnexpectedStorage { field, found: self.kind() }
  }
}

impl From<i64> for StorageValue {
  fn from(value: i64) -> Self { Self::Integer(value) }
}

impl From<String> for StorageValue {
  fn from(value: String) -> Self { Self::Text(value) }
}

impl From<&str> for StorageValue {
  fn from(value: &str) -> Self { Self::Text(value.to_owned()) }
}

impl<T: Into<StorageValue>> From<Option<T>> for StorageValue {
  fn from(value: Option<T>) -> Self {
    value.map(Into::into).unwrap_or(Self::Null)
  }
}

// ─── Contract ────────────────────────────────────────────────────────────────

/// Populate a field in place from a value read back from storage.
///
/// In-place rather than constructing: some fields carry configuration (a
/// column name, a referenced table) that a read must not clobber.
pub trait StorageRead {
  fn scan(&mut self, value: StorageValue) -> Result<()>;
}

/// Produce the storage-safe scalar for a field.
pub trait StorageWrite {
  fn to_storage(&self) -> Result<StorageValue>;
}

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

/// SQLite's `CURRENT_TIMESTAMP` format.
const SQLITE_DATETIME: &str = "%Y-%m-%d %H:%M:%S";

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

/// Parse an RFC 3339 timestamp, falling back to the naive
/// `YYYY-MM-DD HH:MM:SS` form (interpreted as UTC).
pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Ok(dt.with_timezone(&Utc));
  }
  NaiveDateTime::parse_from_str(s, SQLITE_DATETIME)
    .map(|naive| naive.and_utc())
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

pub(crate) fn decode_dt_value(
  field: &'static str,
  value: &StorageValue,
) -> Result<DateTime<Utc>> {
  match value.as_text() {
    Some(s) => decode_dt(s),
    None => Err(value.unexpected(field)),
  }
}
