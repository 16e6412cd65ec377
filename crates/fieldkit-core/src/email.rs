//! Normalized email addresses.
//!
//! Only the shape `local@domain` is checked: exactly one `@` with a
//! non-empty part on each side. This is not an RFC 5322 parser.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::{
  EmailError, Result,
  storage::{StorageRead, StorageValue, StorageWrite},
};

/// Trim, validate and lowercase an email address.
pub fn normalize_email(email: &str) -> Result<String, EmailError> {
  let mut parts = email.trim().split('@');
  let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
    (_, None, _) => return Err(EmailError::MissingAt),
    (_, _, Some(_)) => return Err(EmailError::MultipleAt),
    (Some(local), Some(domain), None) => (local, domain),
    (None, ..) => return Err(EmailError::MissingAt),
  };
  if local.is_empty() || domain.is_empty() {
    return Err(EmailError::EmptyPart);
  }
  Ok(format!("{local}@{domain}").to_lowercase())
}

/// An email address that is either normalized or empty.
///
/// The empty value means "unset"; a non-empty value is never partially
/// normalized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Email(String);

impl Email {
  /// Normalize `raw`, yielding the empty email if it is not valid.
  ///
  /// Use [`Email::parse`] when the reason for rejection matters.
  pub fn new(raw: &str) -> Self {
    match Self::parse(raw) {
      Ok(email) => email,
      Err(e) => {
        tracing::debug!(error = %e, "discarding invalid email");
        Self::default()
      }
    }
  }

  pub fn parse(raw: &str) -> Result<Self, EmailError> {
    normalize_email(raw).map(Self)
  }

  /// Re-run normalization in place. On error the value is left unchanged.
  pub fn normalize(&mut self) -> Result<(), EmailError> {
    self.0 = normalize_email(&self.0)?;
    Ok(())
  }

  pub fn as_str(&self) -> &str { &self.0 }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  /// Empty text stays empty; anything else must normalize.
  fn from_text(raw: &str) -> Result<Self, EmailError> {
    if raw.trim().is_empty() {
      return Ok(Self::default());
    }
    Self::parse(raw)
  }
}

impl fmt::Display for Email {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl AsRef<str> for Email {
  fn as_ref(&self) -> &str { &self.0 }
}

impl Serialize for Email {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&self.0)
  }
}

impl<'de> Deserialize<'de> for Email {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let raw = String::deserialize(deserializer)?;
    Self::from_text(&raw).map_err(de::Error::custom)
  }
}

impl StorageRead for Email {
  fn scan(&mut self, value: StorageValue) -> Result<()> {
    let raw = value.as_text().ok_or_else(|| value.unexpected("email"))?;
    *self = Self::from_text(raw)?;
    Ok(())
  }
}

impl StorageWrite for Email {
  fn to_storage(&self) -> Result<StorageValue> {
    Ok(StorageValue::Text(self.0.clone()))
  }
}

#[cfg(test)]
mod tests {
  use proptest::prelude::*;

  use super::*;

  #[test]
  fn new_lowercases() {
    assert_eq!(Email::new("A@example.com").as_str(), "a@example.com");
  }

  #[test]
  fn normalize_email_table() {
    let cases: &[(&str, Result<&str, EmailError>)] = &[
      ("", Err(EmailError::MissingAt)),
      ("dachshundlover", Err(EmailError::MissingAt)),
      ("k@r@j", Err(EmailError::MultipleAt)),
      ("a@b@c", Err(EmailError::MultipleAt)),
      ("K@", Err(EmailError::EmptyPart)),
      ("@j", Err(EmailError::EmptyPart)),
      ("K@J", Ok("k@j")),
      ("A@B", Ok("a@b")),
      ("  Bob@Example.COM \n", Ok("bob@example.com")),
    ];
    for (input, expected) in cases {
      let result = normalize_email(input);
      assert_eq!(result.as_deref(), expected.as_deref(), "input {input:?}");
    }
  }

  #[test]
  fn new_swallows_errors() {
    assert!(Email::new("").is_empty());
    assert!(Email::new("noatsign").is_empty());
    assert!(Email::new("a@").is_empty());
    assert_eq!(Email::parse("noatsign"), Err(EmailError::MissingAt));
  }

  #[test]
  fn normalize_in_place() {
    let mut email = Email("A@Example.com".into());
    email.normalize().unwrap();
    assert_eq!(email.as_str(), "a@example.com");
  }

  #[test]
  fn failed_normalize_does_not_mutate() {
    let mut email = Email("Not An Email".into());
    assert_eq!(email.normalize(), Err(EmailError::MissingAt));
    assert_eq!(email.as_str(), "Not An Email");
  }

  #[test]
  fn json_decode_normalizes_or_rejects() {
    let email: Email = serde_json::from_str("\" Jo@Example.com \"").unwrap();
    assert_eq!(email.as_str(), "jo@example.com");

    let empty: Email = serde_json::from_str("\"  \"").unwrap();
    assert!(empty.is_empty());

    assert!(serde_json::from_str::<Email>("\"jo\"").is_err());
    assert!(serde_json::from_str::<Email>("3").is_err());
    assert_eq!(serde_json::to_string(&email).unwrap(), "\"jo@example.com\"");
  }

  #[test]
  fn storage_roundtrip() {
    let email = Email::new("Jo@Example.com");
    let stored = email.to_storage().unwrap();
    let mut read = Email::default();
    read.scan(stored).unwrap();
    assert_eq!(read, email);

    let mut read = Email::default();
    read.scan(StorageValue::Blob(b"X@Y".to_vec())).unwrap();
    assert_eq!(read.as_str(), "x@y");

    assert!(read.scan(StorageValue::Integer(1)).is_err());
    assert!(read.scan(StorageValue::Text("x@y@z".into())).is_err());
  }

  proptest! {
    #[test]
    fn normalization_is_idempotent(
      local in "[A-Za-z0-9._+-]{1,16}",
      domain in "[A-Za-z0-9.-]{1,16}",
    ) {
      let once = normalize_email(&format!("{local}@{domain}")).unwrap();
      let twice = normalize_email(&once).unwrap();
      prop_assert_eq!(once, twice);
    }
  }
}
