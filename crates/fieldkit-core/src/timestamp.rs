//! Creation, update and soft-delete times for a row.
//!
//! `updated_at` is assumed to be at or after `created_at`; nothing enforces
//! it.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  ColumnDef, ColumnModifier, ColumnType, Result, TableDef,
  storage::{StorageValue, decode_dt_value, encode_dt},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamp {
  /// Server-assigned; never changes after creation.
  pub created_at: DateTime<Utc>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub updated_at: Option<DateTime<Utc>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub deleted_at: Option<DateTime<Utc>>,
}

impl Timestamp {
  /// Timestamps are normally assigned by the store; this is for callers that
  /// already know the creation time.
  pub fn new(created_at: DateTime<Utc>) -> Self {
    Self { created_at, updated_at: None, deleted_at: None }
  }

  pub fn now() -> Self { Self::new(Utc::now()) }

  /// Time elapsed since creation.
  pub fn age(&self) -> TimeDelta { self.age_at(Utc::now()) }

  pub fn age_at(&self, now: DateTime<Utc>) -> TimeDelta { now - self.created_at }

  /// Deletion wins over update, update wins over creation.
  pub fn last_activity(&self) -> DateTime<Utc> {
    self
      .deleted_at
      .or(self.updated_at)
      .unwrap_or(self.created_at)
  }

  pub fn mark_updated(&mut self, when: DateTime<Utc>) {
    self.updated_at = Some(when);
  }

  /// Soft-delete. Marking twice moves the deletion time.
  pub fn mark_deleted(&mut self, when: DateTime<Utc>) {
    self.deleted_at = Some(when);
  }

  pub fn was_updated(&self) -> bool { self.updated_at.is_some() }

  pub fn is_deleted(&self) -> bool { self.deleted_at.is_some() }

  /// Values for the `created_at`, `updated_at` and `deleted_at` columns.
  pub fn to_storage_columns(&self) -> [StorageValue; 3] {
    [
      StorageValue::Text(encode_dt(self.created_at)),
      self.updated_at.map(encode_dt).into(),
      self.deleted_at.map(encode_dt).into(),
    ]
  }

  /// Read back the three columns written by
  /// [`Timestamp::to_storage_columns`].
  pub fn from_storage_columns(
    created_at: StorageValue,
    updated_at: StorageValue,
    deleted_at: StorageValue,
  ) -> Result<Self> {
    let optional = |field, value: StorageValue| {
      if value.is_null() {
        Ok(None)
      } else {
        decode_dt_value(field, &value).map(Some)
      }
    };
    Ok(Self {
      created_at: decode_dt_value("created_at", &created_at)?,
      updated_at: optional("updated_at", updated_at)?,
      deleted_at: optional("deleted_at", deleted_at)?,
    })
  }
}

impl Default for Timestamp {
  fn default() -> Self { Self::now() }
}

impl ColumnModifier for Timestamp {
  fn modify(&self, table: &mut TableDef) -> Result<()> {
    table.add_column(
      ColumnDef::new("created_at", ColumnType::TimestampTz)
        .not_null()
        .default_expr("now()"),
    )?;
    table.add_column(ColumnDef::new("updated_at", ColumnType::TimestampTz))?;
    table.add_column(ColumnDef::new("deleted_at", ColumnType::TimestampTz))
  }
}
