use indexmap::IndexMap;
use tracing::debug;
use crate::core::{DbError, Result, Value};
use crate::query::Query;
use super::host::HostModel;

/// Conjunctive equality filter: field name -> required value.
pub type Filter = IndexMap<String, Value>;

impl HostModel {
    /// Unrestricted query over the host table.
    pub fn query(&self) -> Query {
        Query::from(self.table_name())
    }

    /// Turns a field filter into a query over the host table.
    ///
    /// Host columns are filtered directly. Delegated fields join the owning
    /// association's table (once per association) and filter the mapped
    /// composed column there; a host column always wins over a delegated
    /// field of the same name. An absent or empty filter yields the
    /// unrestricted query. Only single-hop joins are produced.
    pub fn rewrite_filter(&self, filter: Option<&Filter>) -> Result<Query> {
        let mut query = self.query();
        let Some(filter) = filter.filter(|f| !f.is_empty()) else {
            return Ok(query);
        };

        for (field, value) in filter {
            if self.has_column(field) {
                query = query.filter(self.table_name(), field.as_str(), value.clone());
                continue;
            }

            let descriptor = self
                .registry()
                .owner_of(field)
                .ok_or_else(|| DbError::ColumnNotFound(field.clone(), self.table_name().to_string()))?;
            let column = descriptor.column_for(field).ok_or_else(|| {
                DbError::ColumnNotFound(field.clone(), descriptor.composed_table().to_string())
            })?;

            query = query
                .join(descriptor.join())
                .filter(descriptor.composed_table(), column, value.clone());
        }

        debug!(host = self.name(), sql = %query, "filter rewritten");
        Ok(query)
    }
}
