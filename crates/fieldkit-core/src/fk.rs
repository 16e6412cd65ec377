//! Foreign keys, in a required (write-once) and a nullable (write-many)
//! variant.
//!
//! Both hold a non-owning handle to the table they reference, used only to
//! answer "does the referenced row exist". A key whose table has been
//! dropped, or was never bound, fails that check closed.

use std::{
  fmt,
  sync::{Arc, Weak},
};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::{
  ColumnDef, ColumnModifier, ColumnType, Error, ForeignKeyDef, KeyError,
  ReferencedTable, Result, TableDef,
  storage::{StorageRead, StorageValue, StorageWrite},
};

// ─── Target ──────────────────────────────────────────────────────────────────

/// The referencing column and the table it points at.
#[derive(Clone, Default)]
struct Target {
  column: String,
  table:  Option<TableRef>,
}

#[derive(Clone)]
struct TableRef {
  name:       String,
  key_column: String,
  handle:     Weak<dyn ReferencedTable>,
}

impl Target {
  fn unbound(column: String) -> Self { Self { column, table: None } }

  fn bind<T: ReferencedTable + 'static>(&mut self, column: String, table: &Arc<T>) {
    let handle: Weak<dyn ReferencedTable> = Arc::<T>::downgrade(table);
    self.column = column;
    self.table = Some(TableRef {
      name: table.table_name().to_owned(),
      key_column: table.key_column().to_owned(),
      handle,
    });
  }

  fn contains(&self, id: i64) -> bool {
    let Some(table) = self.table.as_ref() else {
      return false;
    };
    match table.handle.upgrade() {
      Some(handle) => handle.contains_id(id),
      None => {
        tracing::debug!(table = %table.name, "referenced table dropped");
        false
      }
    }
  }

  fn column_def(&self, nullable: bool) -> Result<ColumnDef> {
    let table = self
      .table
      .as_ref()
      .ok_or_else(|| Error::UnboundReference(self.column.clone()))?;
    let mut column = ColumnDef::new(self.column.clone(), ColumnType::Integer)
      .references(ForeignKeyDef {
        table:  table.name.clone(),
        column: table.key_column.clone(),
      });
    if !nullable {
      column = column.not_null();
    }
    Ok(column)
  }
}

impl fmt::Debug for Target {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Target")
      .field("column", &self.column)
      .field("table", &self.table.as_ref().map(|t| &t.name))
      .finish()
  }
}

/// Read an integer candidate out of a JSON fragment.
fn json_candidate(value: &serde_json::Value) -> Result<i64, KeyError> {
  value
    .as_i64()
    .ok_or_else(|| KeyError::Malformed(format!("expected an integer, got {value}")))
}

// ─── KeyState ────────────────────────────────────────────────────────────────

/// Assignment state of a required foreign key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyState {
  #[default]
  Unset,
  /// Always positive.
  Set(i64),
}

impl KeyState {
  /// The write-once transition: an unset key accepts any positive id, a set
  /// key accepts only its own id again.
  fn accept(self, candidate: i64) -> Result<Self, KeyError> {
    if candidate <= 0 {
      return Err(KeyError::NonPositive(candidate));
    }
    match self {
      Self::Unset => Ok(Self::Set(candidate)),
      Self::Set(current) if current == candidate => Ok(self),
      Self::Set(current) => Err(KeyError::Reassignment {
        current,
        attempted: candidate,
      }),
    }
  }
}

// ─── ForeignKey ──────────────────────────────────────────────────────────────

/// A required foreign key. Once its id is set it can never point anywhere
/// else.
#[derive(Debug, Clone, Default)]
pub struct ForeignKey {
  state:  KeyState,
  target: Target,
}

impl ForeignKey {
  /// An unset key for `column` with no referenced table bound yet.
  pub fn new(column: impl Into<String>) -> Self {
    Self { state: KeyState::Unset, target: Target::unbound(column.into()) }
  }

  /// An unset key for `column` referencing `table`.
  pub fn references<T: ReferencedTable + 'static>(
    column: impl Into<String>,
    table: &Arc<T>,
  ) -> Self {
    let mut key = Self::default();
    key.bind(column, table);
    key
  }

  /// Set the column name and referenced table, keeping the current id.
  pub fn bind<T: ReferencedTable + 'static>(
    &mut self,
    column: impl Into<String>,
    table: &Arc<T>,
  ) {
    self.target.bind(column.into(), table);
  }

  /// The id, or `0` while unset.
  pub fn id(&self) -> i64 {
    match self.state {
      KeyState::Unset => 0,
      KeyState::Set(id) => id,
    }
  }

  pub fn state(&self) -> KeyState { self.state }

  pub fn is_set(&self) -> bool { self.state != KeyState::Unset }

  pub fn column(&self) -> &str { &self.target.column }

  pub fn table_name(&self) -> Option<&str> {
    self.target.table.as_ref().map(|t| t.name.as_str())
  }

  /// Assign an id. See [`KeyState`] for the rules; on error nothing changes.
  pub fn assign(&mut self, candidate: i64) -> Result<(), KeyError> {
    self.state = self.state.accept(candidate)?;
    Ok(())
  }

  /// Assign from a JSON fragment, which must be an integer.
  pub fn assign_json(&mut self, value: &serde_json::Value) -> Result<(), KeyError> {
    self.assign(json_candidate(value)?)
  }

  /// Whether the referenced table has a row with this key's id. Unset keys
  /// and keys without a live table never exist.
  pub fn exists(&self) -> bool {
    match self.state {
      KeyState::Unset => false,
      KeyState::Set(id) => self.target.contains(id),
    }
  }
}

impl Serialize for ForeignKey {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_i64(self.id())
  }
}

/// Decodes an unbound key; the id must be a positive integer.
impl<'de> Deserialize<'de> for ForeignKey {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let candidate = i64::deserialize(deserializer)?;
    let state = KeyState::Unset.accept(candidate).map_err(de::Error::custom)?;
    Ok(Self { state, target: Target::default() })
  }
}

/// Reads the stored id as-is; the write-once rule does not apply to rows
/// loaded from storage.
impl StorageRead for ForeignKey {
  fn scan(&mut self, value: StorageValue) -> Result<()> {
    self.state = match value {
      StorageValue::Integer(0) => KeyState::Unset,
      StorageValue::Integer(id) if id > 0 => KeyState::Set(id),
      StorageValue::Integer(id) => return Err(KeyError::Negative(id).into()),
      other => return Err(other.unexpected("foreign key")),
    };
    Ok(())
  }
}

impl StorageWrite for ForeignKey {
  fn to_storage(&self) -> Result<StorageValue> {
    Ok(match self.state {
      KeyState::Unset => StorageValue::Null,
      KeyState::Set(id) => StorageValue::Integer(id),
    })
  }
}

impl ColumnModifier for ForeignKey {
  fn modify(&self, table: &mut TableDef) -> Result<()> {
    table.add_column(self.target.column_def(false)?)
  }
}

// ─── NullableForeignKey ──────────────────────────────────────────────────────

/// A foreign key that may be NULL and may be re-pointed at any time.
#[derive(Debug, Clone, Default)]
pub struct NullableForeignKey {
  /// `None` is NULL; `Some` is always positive.
  id:     Option<i64>,
  target: Target,
}

impl NullableForeignKey {
  /// A NULL key for `column` with no referenced table bound yet.
  pub fn new(column: impl Into<String>) -> Self {
    Self { id: None, target: Target::unbound(column.into()) }
  }

  /// A NULL key for `column` referencing `table`.
  pub fn references<T: ReferencedTable + 'static>(
    column: impl Into<String>,
    table: &Arc<T>,
  ) -> Self {
    let mut key = Self::default();
    key.bind(column, table);
    key
  }

  pub fn bind<T: ReferencedTable + 'static>(
    &mut self,
    column: impl Into<String>,
    table: &Arc<T>,
  ) {
    self.target.bind(column.into(), table);
  }

  /// `false` when the key is NULL.
  pub fn is_valid(&self) -> bool { self.id.is_some() }

  /// The id, or `0` when NULL.
  pub fn id(&self) -> i64 { self.id.unwrap_or(0) }

  pub fn get(&self) -> Option<i64> { self.id }

  pub fn column(&self) -> &str { &self.target.column }

  pub fn table_name(&self) -> Option<&str> {
    self.target.table.as_ref().map(|t| t.name.as_str())
  }

  /// Overwrite the id, or clear it with `None`. Zero also clears it.
  /// Negative ids are rejected and leave the key unchanged.
  pub fn assign(&mut self, candidate: Option<i64>) -> Result<(), KeyError> {
    self.id = match candidate {
      Some(id) if id < 0 => return Err(KeyError::Negative(id)),
      Some(0) | None => None,
      Some(id) => Some(id),
    };
    Ok(())
  }

  /// Assign from a JSON fragment: `null` or an integer.
  pub fn assign_json(&mut self, value: &serde_json::Value) -> Result<(), KeyError> {
    if value.is_null() {
      return self.assign(None);
    }
    self.assign(Some(json_candidate(value)?))
  }

  /// NULL keys always "exist"; otherwise the referenced row must.
  pub fn exists(&self) -> bool {
    match self.id {
      None => true,
      Some(id) => self.target.contains(id),
    }
  }
}

impl Serialize for NullableForeignKey {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    match self.id {
      Some(id) => serializer.serialize_i64(id),
      None => serializer.serialize_none(),
    }
  }
}

impl<'de> Deserialize<'de> for NullableForeignKey {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let candidate = Option::<i64>::deserialize(deserializer)?;
    let mut key = Self::default();
    key.assign(candidate).map_err(de::Error::custom)?;
    Ok(key)
  }
}

impl StorageRead for NullableForeignKey {
  fn scan(&mut self, value: StorageValue) -> Result<()> {
    let candidate = match value {
      StorageValue::Null => None,
      StorageValue::Integer(id) => Some(id),
      other => return Err(other.unexpected("nullable foreign key")),
    };
    Ok(self.assign(candidate)?)
  }
}

impl StorageWrite for NullableForeignKey {
  fn to_storage(&self) -> Result<StorageValue> { Ok(self.id.into()) }
}

impl ColumnModifier for NullableForeignKey {
  fn modify(&self, table: &mut TableDef) -> Result<()> {
    table.add_column(self.target.column_def(true)?)
  }
}
