//! Self-validating scalar field types for database row structs.
//!
//! Each type enforces its own invariants when it is constructed or parsed,
//! and knows how to cross three boundaries: the storage representation
//! ([`storage`]), the JSON document representation (serde), and the columns
//! it contributes to a table definition ([`column`]).
//!
//! This crate has no database dependencies. Storage
//! backends (e.g. `fieldkit-sqlite`) convert [`StorageValue`] to and from
//! their native values.

pub mod column;
pub mod document;
pub mod email;
pub mod error;
pub mod fk;
mod hexdigits;
pub mod reference;
pub mod serial;
pub mod storage;
pub mod timestamp;
pub mod url;
pub mod uuid;

pub use column::{
  ColumnDef, ColumnModifier, ColumnType, ForeignKeyDef, TableDef,
};
pub use document::Document;
pub use email::{Email, normalize_email};
pub use error::{EmailError, Error, KeyError, Result, UuidError};
pub use fk::{ForeignKey, KeyState, NullableForeignKey};
pub use reference::ReferencedTable;
pub use serial::Serial;
pub use storage::{StorageRead, StorageValue, StorageWrite};
pub use timestamp::Timestamp;
pub use url::Url;
pub use crate::uuid::Uuid;
