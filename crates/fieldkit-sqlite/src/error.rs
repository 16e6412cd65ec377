//! Error type for `fieldkit-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("field error: {0}")]
  Field(#[from] fieldkit_core::Error),

  #[error("database error: {0}")]
  Database(#[from] rusqlite::Error),

  #[error("config error: {0}")]
  Config(#[from] config::ConfigError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
