//! Connection settings.
//!
//! Loaded from an optional TOML file layered under `FIELDKIT_*` environment
//! variables, e.g. `FIELDKIT_PATH=/var/lib/app.db`.

use std::{
  path::{Path, PathBuf},
  sync::{Arc, Mutex},
  time::Duration,
};

use rusqlite::Connection;
use serde::Deserialize;

use crate::Result;

/// Path that selects an in-memory database.
const IN_MEMORY: &str = ":memory:";

/// A connection shared between row code and [`crate::SqliteTable`] handles.
pub type SharedConnection = Arc<Mutex<Connection>>;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
  /// Database file, or `:memory:`.
  pub path:                 PathBuf,
  /// Run `PRAGMA foreign_keys = ON` so referencing columns are checked.
  pub enforce_foreign_keys: bool,
  pub busy_timeout_ms:      u64,
}

impl Default for StoreConfig {
  fn default() -> Self {
    Self {
      path:                 PathBuf::from(IN_MEMORY),
      enforce_foreign_keys: true,
      busy_timeout_ms:      5000,
    }
  }
}

impl StoreConfig {
  /// Read settings from `file` (if given and present) and the environment.
  /// Unspecified settings keep their defaults.
  pub fn load(file: Option<&Path>) -> Result<Self> {
    let mut builder = config::Config::builder();
    if let Some(file) = file {
      builder = builder.add_source(config::File::from(file).required(false));
    }
    let settings = builder
      .add_source(config::Environment::with_prefix("FIELDKIT"))
      .build()?;
    Ok(settings.try_deserialize()?)
  }

  pub fn in_memory() -> Self { Self::default() }

  pub fn is_in_memory(&self) -> bool { self.path.as_os_str() == IN_MEMORY }
}

/// Open a connection configured by `config`.
pub fn open_connection(config: &StoreConfig) -> Result<Connection> {
  let conn = if config.is_in_memory() {
    Connection::open_in_memory()?
  } else {
    Connection::open(&config.path)?
  };
  conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
  conn.pragma_update(None, "foreign_keys", config.enforce_foreign_keys)?;
  tracing::debug!(
    path = %config.path.display(),
    foreign_keys = config.enforce_foreign_keys,
    "opened sqlite connection"
  );
  Ok(conn)
}

/// [`open_connection`], wrapped for sharing.
pub fn open_shared(config: &StoreConfig) -> Result<SharedConnection> {
  Ok(Arc::new(Mutex::new(open_connection(config)?)))
}
