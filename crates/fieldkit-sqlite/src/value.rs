//! Conversion between [`StorageValue`] and rusqlite's dynamic values.
//!
//! Row-mapping closures read plain [`StorageValue`]s with [`read_value`];
//! decoding into fields happens afterwards with [`scan`], outside the
//! connection call, so field errors never masquerade as database errors.

use fieldkit_core::{StorageRead, StorageValue, StorageWrite};
use rusqlite::types::{Value, ValueRef};

use crate::Result;

pub fn to_sql(value: StorageValue) -> Value {
  match value {
    StorageValue::Null => Value::Null,
    StorageValue::Integer(i) => Value::Integer(i),
    StorageValue::Real(f) => Value::Real(f),
    StorageValue::Text(s) => Value::Text(s),
    StorageValue::Blob(b) => Value::Blob(b),
  }
}

/// Text that is not valid UTF-8 is returned as a blob.
pub fn from_sql(value: ValueRef<'_>) -> StorageValue {
  match value {
    ValueRef::Null => StorageValue::Null,
    ValueRef::Integer(i) => StorageValue::Integer(i),
    ValueRef::Real(f) => StorageValue::Real(f),
    ValueRef::Text(t) => match std::str::from_utf8(t) {
      Ok(s) => StorageValue::Text(s.to_owned()),
      Err(_) => StorageValue::Blob(t.to_vec()),
    },
    ValueRef::Blob(b) => StorageValue::Blob(b.to_vec()),
  }
}

/// The bindable parameter for a field.
pub fn bind<T: StorageWrite + ?Sized>(field: &T) -> Result<Value> {
  Ok(to_sql(field.to_storage()?))
}

/// Read column `idx` of `row` without interpreting it.
pub fn read_value(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<StorageValue> {
  Ok(from_sql(row.get_ref(idx)?))
}

/// Populate `field` from a value previously read with [`read_value`].
pub fn scan<T: StorageRead + ?Sized>(field: &mut T, value: StorageValue) -> Result<()> {
  Ok(field.scan(value)?)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn every_variant_crosses_unchanged() {
    let values = [
      StorageValue::Null,
      StorageValue::Integer(-4),
      StorageValue::Real(1.5),
      StorageValue::Text("x".into()),
      StorageValue::Blob(vec![0, 1, 2]),
    ];
    for value in values {
      let sql = to_sql(value.clone());
      assert_eq!(from_sql(ValueRef::from(&sql)), value);
    }
  }

  #[test]
  fn invalid_utf8_text_becomes_blob() {
    let bytes = [0xff, 0xfe];
    assert_eq!(
      from_sql(ValueRef::Text(&bytes)),
      StorageValue::Blob(bytes.to_vec())
    );
  }
}
