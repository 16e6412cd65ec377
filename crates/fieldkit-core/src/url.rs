//! URL field. Stored verbatim; JSON input is trimmed but not validated.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::{
  Result,
  storage::{StorageRead, StorageValue, StorageWrite},
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Url(String);

impl Url {
  pub fn new(url: impl Into<String>) -> Self { Self(url.into()) }

  pub fn as_str(&self) -> &str { &self.0 }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl fmt::Display for Url {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl<'de> Deserialize<'de> for Url {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let raw = String::deserialize(deserializer)?;
    Ok(Self(raw.trim().to_owned()))
  }
}

impl StorageRead for Url {
  fn scan(&mut self, value: StorageValue) -> Result<()> {
    let raw = value.as_text().ok_or_else(|| value.unexpected("url"))?;
    self.0 = raw.to_owned();
    Ok(())
  }
}

impl StorageWrite for Url {
  fn to_storage(&self) -> Result<StorageValue> {
    Ok(StorageValue::Text(self.0.clone()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn json_trims_whitespace() {
    let url: Url = serde_json::from_str("\"  https://example.com/a \"").unwrap();
    assert_eq!(url.as_str(), "https://example.com/a");
    assert_eq!(
      serde_json::to_string(&url).unwrap(),
      "\"https://example.com/a\""
    );
    assert!(serde_json::from_str::<Url>("null").is_err());
  }

  #[test]
  fn storage_is_verbatim() {
    let mut url = Url::default();
    url.scan(StorageValue::Text(" kept ".into())).unwrap();
    assert_eq!(url.as_str(), " kept ");
    assert_eq!(url.to_storage().unwrap(), StorageValue::Text(" kept ".into()));
    assert!(url.scan(StorageValue::Null).is_err());
  }
}
