//! SQLite backend for `fieldkit` fields.
//!
//! Converts between [`fieldkit_core::StorageValue`] and rusqlite values, and
//! provides [`SqliteTable`], a foreign-key existence check backed by a live
//! connection.

mod settings;
mod table;
mod value;

pub mod error;

pub use settings::{SharedConnection, StoreConfig, open_connection, open_shared};
pub use error::{Error, Result};
pub use table::SqliteTable;
pub use value::{bind, from_sql, read_value, scan, to_sql};
