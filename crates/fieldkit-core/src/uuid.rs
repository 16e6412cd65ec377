//! RFC 4122 version-4 UUIDs.
//!
//! Generation always yields a valid v4 value. Parsing is purely syntactic:
//! a well-formed UUID of any version parses, and only [`Uuid::exists`]
//! checks the version nibble.
//!
//! There are two read paths. The storage read ([`StorageRead`])
//! degrades anything unparseable to the nil UUID without an error, while the
//! JSON read ([`Deserialize`]) rejects it.

use std::{fmt, str::FromStr};

use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::{
  ColumnDef, ColumnModifier, ColumnType, Result, TableDef, UuidError,
  hexdigits::decode_pair,
  storage::{StorageRead, StorageValue, StorageWrite},
};

/// Length of the canonical `xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx` form.
const ENCODED_LEN: usize = 36;

const DASH_OFFSETS: [usize; 4] = [8, 13, 18, 23];

/// Offset of the first hex digit of each byte in the canonical form.
const BYTE_OFFSETS: [usize; 16] =
  [0, 2, 4, 6, 9, 11, 14, 16, 19, 21, 24, 26, 28, 30, 32, 34];

/// A 16-byte identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Uuid([u8; 16]);

impl Uuid {
  /// The all-zero UUID; the "unset" value.
  pub const fn nil() -> Self { Self([0; 16]) }

  pub const fn from_bytes(bytes: [u8; 16]) -> Self { Self(bytes) }

  pub fn as_bytes(&self) -> &[u8; 16] { &self.0 }

  pub fn is_nil(&self) -> bool { self.0 == [0; 16] }

  /// Generate a random version-4 UUID from the operating system's secure
  /// random source.
  ///
  /// # Panics
  ///
  /// Panics if the secure random source is unavailable; no usable identifier
  /// can be produced without it.
  pub fn new_v4() -> Self {
    let mut bytes = [0u8; 16];
    if let Err(e) = OsRng.try_fill_bytes(&mut bytes) {
      panic!("secure random source unavailable: {e}");
    }
    Self::from_random_bytes(bytes)
  }

  /// Stamp the version (4) and variant (`10`) bits onto 16 random bytes.
  pub fn from_random_bytes(mut bytes: [u8; 16]) -> Self {
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;
    Self(bytes)
  }

  /// Parse the canonical 36-character form. Hex digits may be either case.
  ///
  /// Version and variant bits are not checked; see [`Uuid::exists`].
  pub fn parse(s: &str) -> Result<Self, UuidError> {
    let s = s.as_bytes();
    if s.len() != ENCODED_LEN {
      return Err(UuidError::InvalidLength(s.len()));
    }
    if DASH_OFFSETS.iter().any(|&i| s[i] != b'-') {
      return Err(UuidError::MisplacedDash);
    }

    let mut bytes = [0u8; 16];
    for (byte, &position) in bytes.iter_mut().zip(BYTE_OFFSETS.iter()) {
      *byte = decode_pair(&s[position..])
        .ok_or(UuidError::InvalidHex { position })?;
    }
    Ok(Self(bytes))
  }

  /// Whether this is a valid version-4 UUID: the high nibble of byte 6 is
  /// `0x4`. The variant bits are not checked.
  pub fn exists(&self) -> bool { self.0[6] >> 4 == 0x4 }

  /// Lenient storage read: anything that is not a canonical UUID string
  /// becomes the nil UUID.
  pub fn from_storage_lenient(value: &StorageValue) -> Self {
    let parsed = value
      .as_text()
      .ok_or_else(|| value.kind().to_owned())
      .and_then(|s| Self::parse(s).map_err(|e| e.to_string()));
    match parsed {
      Ok(uuid) => uuid,
      Err(reason) => {
        tracing::debug!(%reason, "unreadable stored uuid, using nil");
        Self::nil()
      }
    }
  }
}

// ─── Text ────────────────────────────────────────────────────────────────────

impl fmt::Display for Uuid {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let b = &self.0;
    write!(
      f,
      "{}-{}-{}-{}-{}",
      hex::encode(&b[..4]),
      hex::encode(&b[4..6]),
      hex::encode(&b[6..8]),
      hex::encode(&b[8..10]),
      hex::encode(&b[10..]),
    )
  }
}

impl fmt::Debug for Uuid {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Uuid({self})")
  }
}

impl FromStr for Uuid {
  type Err = UuidError;

  fn from_str(s: &str) -> Result<Self, UuidError> { Self::parse(s) }
}

impl From<::uuid::Uuid> for Uuid {
  fn from(value: ::uuid::Uuid) -> Self { Self(value.into_bytes()) }
}

impl From<Uuid> for ::uuid::Uuid {
  fn from(value: Uuid) -> Self { Self::from_bytes(value.0) }
}

// ─── JSON ────────────────────────────────────────────────────────────────────

/// The nil UUID is written as `""`.
impl Serialize for Uuid {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    if self.is_nil() {
      return serializer.serialize_str("");
    }
    serializer.collect_str(self)
  }
}

/// Accepts a canonical UUID string or `""` (the nil UUID). Anything else is
/// an error.
impl<'de> Deserialize<'de> for Uuid {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let s = String::deserialize(deserializer)?;
    if s.is_empty() {
      return Ok(Self::nil());
    }
    Self::parse(&s).map_err(de::Error::custom)
  }
}

// ─── Storage ─────────────────────────────────────────────────────────────────

impl StorageRead for Uuid {
  fn scan(&mut self, value: StorageValue) -> Result<()> {
    *self = Self::from_storage_lenient(&value);
    Ok(())
  }
}

impl StorageWrite for Uuid {
  fn to_storage(&self) -> Result<StorageValue> {
    Ok(StorageValue::Text(self.to_string()))
  }
}

impl ColumnModifier for Uuid {
  fn modify(&self, table: &mut TableDef) -> Result<()> {
    table.add_column(ColumnDef::new("uuid", ColumnType::Uuid).not_null())
  }
}

#[cfg(test)]
mod tests {
  use proptest::prelude::*;
  use serde::Deserialize;

  use super::*;

  const SAMPLE: &str = "f47ac10b-58cc-4372-a567-0e02b2c3d479";

  #[test]
  fn generated_uuids_are_valid_and_parse_back() {
    let uuid = Uuid::new_v4();
    let parsed = Uuid::parse(&uuid.to_string()).unwrap();
    assert_eq!(uuid, parsed);
    assert!(uuid.exists());
    assert_eq!(uuid.as_bytes()[8] & 0xc0, 0x80);
  }

  #[test]
  fn generated_uuids_differ() {
    assert_ne!(Uuid::new_v4(), Uuid::new_v4());
  }

  #[test]
  fn version_and_variant_are_forced() {
    let high = Uuid::from_random_bytes([0xff; 16]);
    assert_eq!(high.as_bytes()[6], 0x4f);
    assert_eq!(high.as_bytes()[8], 0xbf);

    let low = Uuid::from_random_bytes([0x00; 16]);
    assert_eq!(low.as_bytes()[6], 0x40);
    assert_eq!(low.as_bytes()[8], 0x80);
    assert!(low.exists());
  }

  #[test]
  fn formats_canonical_lowercase() {
    let uuid = Uuid::parse(&SAMPLE.to_uppercase()).unwrap();
    assert_eq!(uuid.to_string(), SAMPLE);
    assert_eq!(format!("{uuid:?}"), format!("Uuid({SAMPLE})"));
  }

  #[test]
  fn formatting_matches_uuid_crate() {
    let ours = Uuid::new_v4();
    let theirs: ::uuid::Uuid = ours.into();
    assert_eq!(ours.to_string(), theirs.hyphenated().to_string());
    assert_eq!(Uuid::from(theirs), ours);
  }

  #[test]
  fn parse_rejects_wrong_length() {
    assert_eq!(Uuid::parse(""), Err(UuidError::InvalidLength(0)));
    assert_eq!(Uuid::parse(&SAMPLE[1..]), Err(UuidError::InvalidLength(35)));
    assert_eq!(
      Uuid::parse(&format!("{SAMPLE}0")),
      Err(UuidError::InvalidLength(37))
    );
    assert_eq!(
      Uuid::parse(&format!("{{{SAMPLE}}}")),
      Err(UuidError::InvalidLength(38))
    );
  }

  #[test]
  fn parse_rejects_misplaced_dash() {
    // Dash moved from offset 8 to offset 7.
    let s = "f47ac10-b58cc-4372-a567-0e02b2c3d479";
    assert_eq!(s.len(), 36);
    assert_eq!(Uuid::parse(s), Err(UuidError::MisplacedDash));

    let no_dashes = "f47ac10b058cc043720a56700e02b2c3d479";
    assert_eq!(Uuid::parse(no_dashes), Err(UuidError::MisplacedDash));
  }

  #[test]
  fn parse_reports_offset_of_bad_hex() {
    let s = "f47ac10b-58cc-4372-a567-0e02b2c3d4z9";
    assert_eq!(Uuid::parse(s), Err(UuidError::InvalidHex { position: 34 }));

    let s = "g47ac10b-58cc-4372-a567-0e02b2c3d479";
    assert_eq!(Uuid::parse(s), Err(UuidError::InvalidHex { position: 0 }));
  }

  #[test]
  fn parse_rejects_non_ascii() {
    // 'é' is two bytes, so pad to 36 bytes with one fewer character.
    let s = "é7ac10b-58cc-4372-a567-0e02b2c3d479";
    assert_eq!(s.len(), 36);
    assert!(Uuid::parse(s).is_err());
  }

  #[test]
  fn parse_does_not_enforce_version() {
    let v1 = "6ba7b810-9dad-11d1-80b4-00c04fd430c8";
    let uuid = Uuid::parse(v1).unwrap();
    assert_eq!(uuid.to_string(), v1);
    assert!(!uuid.exists());
    assert!(!Uuid::nil().exists());
  }

  #[test]
  fn json_writes_quoted_canonical_string() {
    let uuid = Uuid::new_v4();
    let json = serde_json::to_string(&uuid).unwrap();
    assert_eq!(json, format!("\"{uuid}\""));
    assert_eq!(serde_json::to_string(&Uuid::nil()).unwrap(), "\"\"");
  }

  #[test]
  fn json_read_is_strict() {
    let uuid: Uuid = serde_json::from_str(&format!("\"{SAMPLE}\"")).unwrap();
    assert_eq!(uuid.to_string(), SAMPLE);

    let empty: Uuid = serde_json::from_str("\"\"").unwrap();
    assert!(empty.is_nil());

    assert!(serde_json::from_str::<Uuid>("\"not-a-uuid\"").is_err());
    assert!(serde_json::from_str::<Uuid>("12").is_err());
    assert!(serde_json::from_str::<Uuid>("null").is_err());
  }

  #[test]
  fn malformed_uuid_fails_the_whole_document() {
    #[derive(Deserialize)]
    #[allow(dead_code)]
    struct Row {
      uuid: Uuid,
      name: String,
    }

    let good = format!(r#"{{"uuid":"{SAMPLE}","name":"x"}}"#);
    assert!(serde_json::from_str::<Row>(&good).is_ok());
    let bad = r#"{"uuid":"f47ac10b","name":"x"}"#;
    assert!(serde_json::from_str::<Row>(bad).is_err());
  }

  #[test]
  fn storage_read_is_lenient() {
    let mut uuid = Uuid::new_v4();
    uuid.scan(StorageValue::Text("garbage".into())).unwrap();
    assert!(uuid.is_nil());

    let mut uuid = Uuid::new_v4();
    uuid.scan(StorageValue::Integer(7)).unwrap();
    assert!(uuid.is_nil());

    let mut uuid = Uuid::nil();
    uuid.scan(StorageValue::Blob(SAMPLE.as_bytes().to_vec())).unwrap();
    assert_eq!(uuid.to_string(), SAMPLE);
  }

  #[test]
  fn storage_write_is_canonical_text() {
    let uuid = Uuid::parse(SAMPLE).unwrap();
    assert_eq!(
      uuid.to_storage().unwrap(),
      StorageValue::Text(SAMPLE.to_owned())
    );
  }

  #[test]
  fn contributes_not_null_uuid_column() {
    let table = TableDef::new("things").with(&Uuid::nil()).unwrap();
    let col = table.column("uuid").unwrap();
    assert_eq!(col.column_type, ColumnType::Uuid);
    assert!(!col.nullable);
  }

  proptest! {
    #[test]
    fn format_then_parse_is_identity(bytes in any::<[u8; 16]>()) {
      let uuid = Uuid::from_bytes(bytes);
      prop_assert_eq!(Uuid::parse(&uuid.to_string()).unwrap(), uuid);
    }

    #[test]
    fn random_bytes_always_yield_v4(bytes in any::<[u8; 16]>()) {
      prop_assert!(Uuid::from_random_bytes(bytes).exists());
    }

    #[test]
    fn parse_then_format_lowercases(
      s in "[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}"
    ) {
      prop_assert_eq!(Uuid::parse(&s).unwrap().to_string(), s.to_lowercase());
    }

    #[test]
    fn wrong_length_never_parses(s in ".{0,60}") {
      prop_assume!(s.len() != ENCODED_LEN);
      prop_assert_eq!(Uuid::parse(&s), Err(UuidError::InvalidLength(s.len())));
    }

    #[test]
    fn any_non_hex_digit_is_rejected(
      bytes in any::<[u8; 16]>(),
      slot in 0usize..32,
      bad in "[g-zG-Z_ ]",
    ) {
      let mut s = Uuid::from_bytes(bytes).to_string().into_bytes();
      let offset = BYTE_OFFSETS[slot / 2] + slot % 2;
      s[offset] = bad.as_bytes()[0];
      let s = String::from_utf8(s).unwrap();
      prop_assert!(
        matches!(Uuid::parse(&s), Err(UuidError::InvalidHex { .. })),
        "accepted {}", s
      );
    }
  }
}
