//! Error types for `fieldkit-core`.
//!
//! Malformed input and policy violations are reported as distinct variants so
//! callers can tell "this could never be a key" apart from "this key may not
//! be changed".

use thiserror::Error;

/// A UUID string that is not in canonical `8-4-4-4-12` form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UuidError {
  #[error("uuid must be 36 characters long, got {0}")]
  InvalidLength(usize),

  #[error("uuid must have dashes at offsets 8, 13, 18 and 23")]
  MisplacedDash,

  #[error("uuid has an invalid hex byte at offset {position}")]
  InvalidHex { position: usize },
}

/// An email address that cannot be normalized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmailError {
  #[error("email must contain an '@'")]
  MissingAt,

  #[error("email cannot contain more than one '@'")]
  MultipleAt,

  #[error("email must be of the form 'user@domain'")]
  EmptyPart,
}

/// A rejected foreign key candidate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
  #[error("failed to parse foreign key: {0}")]
  Malformed(String),

  #[error("foreign keys cannot be zero or negative, got {0}")]
  NonPositive(i64),

  #[error("foreign keys cannot be negative, got {0}")]
  Negative(i64),

  #[error("foreign key {current} cannot be overwritten with {attempted}")]
  Reassignment { current: i64, attempted: i64 },
}

impl KeyError {
  /// `true` for rejections of well-formed input that break the mutation
  /// policy, `false` for input that is not an integer at all.
  pub fn is_policy_violation(&self) -> bool {
    !matches!(self, Self::Malformed(_))
  }
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("malformed uuid: {0}")]
  Uuid(#[from] UuidError),

  #[error("malformed email: {0}")]
  Email(#[from] EmailError),

  #[error(transparent)]
  Key(#[from] KeyError),

  #[error("unexpected storage value for {field}: {found}")]
  UnexpectedStorage {
    field: &'static str,
    found: &'static str,
  },

  #[error("column {column:?} is already defined on table {table:?}")]
  DuplicateColumn { table: String, column: String },

  #[error("foreign key column {0:?} has no referenced table")]
  UnboundReference(String),

  #[error("document value {key:?} is not an integer: {value}")]
  NotAnInteger { key: String, value: String },

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
