//! Column contributions.
//!
//! A field describes the column(s) and constraints it implies by modifying a
//! [`TableDef`]. Turning a table definition into DDL is the job of an
//! external schema tool; this module only records the intent.

use crate::{Error, Result};

// ─── Column types ────────────────────────────────────────────────────────────

/// The logical SQL type of a contributed column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
  Integer,
  /// Auto-incrementing integer.
  Serial,
  Uuid,
  /// Timestamp with time zone.
  TimestampTz,
}

/// A `REFERENCES table(column) ON UPDATE CASCADE ON DELETE CASCADE`
/// constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyDef {
  pub table:  String,
  pub column: String,
}

// ─── ColumnDef ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
  pub name:        String,
  pub column_type: ColumnType,
  pub nullable:    bool,
  pub primary_key: bool,
  /// Default value expression (SQL).
  pub default:     Option<String>,
  pub foreign_key: Option<ForeignKeyDef>,
}

impl ColumnDef {
  /// A nullable column with no constraints.
  pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
    Self {
      name: name.into(),
      column_type,
      nullable: true,
      primary_key: false,
      default: None,
      foreign_key: None,
    }
  }

  pub fn not_null(mut self) -> Self {
    self.nullable = false;
    self
  }

  pub fn primary_key(mut self) -> Self {
    self.primary_key = true;
    self.nullable = false;
    self
  }

  pub fn default_expr(mut self, expr: impl Into<String>) -> Self {
    self.default = Some(expr.into());
    self
  }

  pub fn references(mut self, fk: ForeignKeyDef) -> Self {
    self.foreign_key = Some(fk);
    self
  }
}

// ─── TableDef ────────────────────────────────────────────────────────────────

/// The columns collected for one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDef {
  pub name:    String,
  pub columns: Vec<ColumnDef>,
}

impl TableDef {
  pub fn new(name: impl Into<String>) -> Self {
    Self { name: name.into(), columns: Vec::new() }
  }

  /// Add a column; column names are unique per table.
  pub fn add_column(&mut self, column: ColumnDef) -> Result<()> {
    if self.column(&column.name).is_some() {
      return Err(Error::DuplicateColumn {
        table:  self.name.clone(),
        column: column.name,
      });
    }
    self.columns.push(column);
    Ok(())
  }

  pub fn column(&self, name: &str) -> Option<&ColumnDef> {
    self.columns.iter().find(|c| c.name == name)
  }

  /// Apply a modifier and return the table, for chained construction.
  pub fn with(mut self, modifier: &dyn ColumnModifier) -> Result<Self> {
    modifier.modify(&mut self)?;
    Ok(self)
  }
}

/// Implemented by every field that contributes columns to its table.
pub trait ColumnModifier {
  fn modify(&self, table: &mut TableDef) -> Result<()>;
}

impl ColumnModifier for ColumnDef {
  fn modify(&self, table: &mut TableDef) -> Result<()> {
    table.add_column(self.clone())
  }
}
