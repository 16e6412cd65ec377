//! The capability a foreign key uses to check referential integrity.

/// A table (or any collection) that foreign keys may point at.
///
/// Foreign keys hold this as a non-owning handle; they never keep the
/// referenced table alive.
pub trait ReferencedTable: Send + Sync {
  /// Name of the referenced table.
  fn table_name(&self) -> &str;

  /// Name of the referenced key column.
  fn key_column(&self) -> &str { "id" }

  /// Whether a record with `id` is present. Implementations should answer
  /// `false` when the lookup itself fails.
  fn contains_id(&self, id: i64) -> bool;
}
