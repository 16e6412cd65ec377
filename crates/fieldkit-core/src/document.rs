//! Opaque JSON documents: a string-keyed map with no shape constraints.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::{
  Error, Result,
  storage::{StorageRead, StorageValue, StorageWrite},
};

/// Text produced by [`Document::get`] for a null or missing value.
pub const NULL_DISPLAY: &str = "<nil>";

/// Whole floats below this magnitude display without a fraction or exponent.
const PLAIN_FLOAT_LIMIT: f64 = 1e21;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

impl Document {
  pub fn new() -> Self { Self::default() }

  /// The value at `key` as display text.
  ///
  /// Strings are returned without quotes; booleans in their JSON form;
  /// arrays and objects as compact JSON. Numbers use their shortest form, and
  /// whole floats drop the fraction (`3.0` reads as `"3"`). Null and missing
  /// values both yield [`NULL_DISPLAY`].
  pub fn get(&self, key: &str) -> String {
    match self.0.get(key) {
      None | Some(Value::Null) => NULL_DISPLAY.to_owned(),
      Some(Value::String(s)) => s.clone(),
      Some(Value::Number(n)) => display_number(n),
      Some(other) => other.to_string(),
    }
  }

  /// Parse the display text at `key` as an integer.
  pub fn int64(&self, key: &str) -> Result<i64> {
    let text = self.get(key);
    text.parse().map_err(|_| Error::NotAnInteger {
      key:   key.to_owned(),
      value: text,
    })
  }

  pub fn value(&self, key: &str) -> Option<&Value> { self.0.get(key) }

  pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
    self.0.insert(key.into(), value.into())
  }

  pub fn remove(&mut self, key: &str) -> Option<Value> { self.0.remove(key) }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> { self.0.iter() }

  pub fn into_inner(self) -> Map<String, Value> { self.0 }
}

fn display_number(n: &Number) -> String {
  match n.as_f64() {
    Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < PLAIN_FLOAT_LIMIT => {
      format!("{f:.0}")
    }
    _ => n.to_string(),
  }
}

impl From<Map<String, Value>> for Document {
  fn from(map: Map<String, Value>) -> Self { Self(map) }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Document {
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
  }
}

impl StorageRead for Document {
  fn scan(&mut self, value: StorageValue) -> Result<()> {
    let text = value.as_text().ok_or_else(|| value.unexpected("document"))?;
    self.0 = serde_json::from_str(text)?;
    Ok(())
  }
}

impl StorageWrite for Document {
  fn to_storage(&self) -> Result<StorageValue> {
    Ok(StorageValue::Text(serde_json::to_string(&self.0)?))
  }
}
