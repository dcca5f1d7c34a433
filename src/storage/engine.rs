use super::table::TableSchema;
use crate::core::{Attributes, Column, Result, Value};
use crate::query::Query;

/// Storage engine trait - the persistence capabilities the composition
/// layer relies on. Any record store can back host and composed entities
/// by implementing it.
pub trait StorageEngine {
    /// Create a new table with the given schema
    fn create_table(&mut self, schema: TableSchema) -> Result<()>;

    /// Drop a table and all of its rows
    fn drop_table(&mut self, name: &str) -> Result<()>;

    /// Check if a table exists
    fn table_exists(&self, name: &str) -> bool;

    /// Column introspection for a table, in declaration order
    fn columns(&self, table: &str) -> Result<Vec<Column>>;

    /// Insert a record. Assigns an identity when the record carries none and
    /// fills creation/update timestamps; returns the stored attributes.
    fn insert(&mut self, table: &str, attributes: Attributes) -> Result<Attributes>;

    /// Update the given attributes of record `id`, refreshing its update
    /// timestamp; returns the stored attributes.
    fn update(&mut self, table: &str, id: i64, attributes: Attributes) -> Result<Attributes>;

    /// Write a single column of record `id` without touching timestamps.
    fn update_column(&mut self, table: &str, id: i64, column: &str, value: Value) -> Result<()>;

    /// Load a record by identity
    fn find(&self, table: &str, id: i64) -> Result<Option<Attributes>>;

    /// Run a query, returning the base table's attributes for every match
    fn select(&self, query: &Query) -> Result<Vec<Attributes>>;

    /// Get table row count
    fn row_count(&self, table: &str) -> Result<usize>;

    /// List all table names
    fn list_tables(&self) -> Vec<String>;
}
