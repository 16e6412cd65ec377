//! An embeddable auto-incrementing primary key.

use serde::{Deserialize, Serialize};

use crate::{
  ColumnDef, ColumnModifier, ColumnType, Result, TableDef,
  storage::{StorageRead, StorageValue, StorageWrite},
};

/// Primary key placeholder; `#[serde(flatten)]` it into a row struct to get
/// an `"id"` member.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub struct Serial {
  pub id: i64,
}

impl Serial {
  pub fn new(id: i64) -> Self { Self { id } }

  pub fn id(&self) -> i64 { self.id }

  /// `true` once the id has been assigned (is non-zero).
  pub fn exists(&self) -> bool { self.id != 0 }

  /// The primary key values, in column order.
  pub fn keys(&self) -> Vec<StorageValue> { vec![StorageValue::Integer(self.id)] }
}

impl StorageRead for Serial {
  fn scan(&mut self, value: StorageValue) -> Result<()> {
    match value {
      StorageValue::Integer(id) => {
        self.id = id;
        Ok(())
      }
      other => Err(other.unexpected("serial")),
    }
  }
}

impl StorageWrite for Serial {
  /// Unassigned ids are written as NULL so the store assigns one.
  fn to_storage(&self) -> Result<StorageValue> {
    Ok(match self.id {
      0 => StorageValue::Null,
      id => StorageValue::Integer(id),
    })
  }
}

impl ColumnModifier for Serial {
  fn modify(&self, table: &mut TableDef) -> Result<()> {
    table.add_column(ColumnDef::new("id", ColumnType::Serial).primary_key())
  }
}
