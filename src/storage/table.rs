use crate::core::{
    Attributes, CREATED_AT_COLUMN, Column, DataType, DbError, IDENTITY_COLUMN, Result, Row,
    Schema, UPDATED_AT_COLUMN, Value,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Rows of one table keyed by their identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    schema: TableSchema,
    rows: BTreeMap<i64, Row>,
    next_id: i64,
}

impl Table {
    pub fn new(schema: TableSchema) -> Self {
        Self {
            schema,
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// Inserts a record. A missing or `NULL` identity is assigned from the
    /// table's sequence; timestamp columns are stamped with `now`.
    pub fn insert(&mut self, attributes: &Attributes, now: &Value) -> Result<Attributes> {
        let id_idx = self.identity_index()?;
        let mut row = self.to_row(attributes)?;

        let id = match row[id_idx].as_i64() {
            Some(id) => id,
            None if row[id_idx].is_null() => self.next_id,
            None => {
                return Err(DbError::TypeMismatch(format!(
                    "Identity of '{}' must be an INTEGER, got {}",
                    self.schema.name,
                    row[id_idx].type_name()
                )));
            }
        };

        if self.rows.contains_key(&id) {
            return Err(DbError::ConstraintViolation(format!(
                "Duplicate identity {} in table '{}'",
                id, self.schema.name
            )));
        }

        row[id_idx] = Value::Integer(id);
        for stamp in [CREATED_AT_COLUMN, UPDATED_AT_COLUMN] {
            if let Some(idx) = self.schema.schema().find_column_index(stamp)
                && row[idx].is_null()
            {
                row[idx] = now.clone();
            }
        }

        self.validate_row(&row)?;
        self.next_id = self.next_id.max(id + 1);
        self.rows.insert(id, row.clone());
        Ok(self.to_attributes(&row))
    }

    /// Overwrites the given columns of record `id`. When `now` is provided the
    /// update timestamp is refreshed as well.
    pub fn update(&mut self, id: i64, attributes: &Attributes, now: Option<&Value>) -> Result<Attributes> {
        let mut row = self
            .rows
            .get(&id)
            .cloned()
            .ok_or_else(|| DbError::RecordNotFound {
                table: self.schema.name.clone(),
                id,
            })?;

        for (name, value) in attributes {
            if name == IDENTITY_COLUMN && value.as_i64() != Some(id) {
                return Err(DbError::ConstraintViolation(format!(
                    "Identity of record {} in '{}' cannot change",
                    id, self.schema.name
                )));
            }
            let idx = self.column_index(name)?;
            row[idx] = value.clone();
        }
        if let Some(now) = now
            && let Some(idx) = self.schema.schema().find_column_index(UPDATED_AT_COLUMN)
        {
            row[idx] = now.clone();
        }

        self.validate_row(&row)?;
        self.rows.insert(id, row.clone());
        Ok(self.to_attributes(&row))
    }

    pub fn get(&self, id: i64) -> Option<Attributes> {
        self.rows.get(&id).map(|row| self.to_attributes(row))
    }

    pub fn scan(&self) -> impl Iterator<Item = Attributes> + '_ {
        self.rows.values().map(|row| self.to_attributes(row))
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn identity_index(&self) -> Result<usize> {
        self.column_index(IDENTITY_COLUMN)
    }

    fn column_index(&self, name: &str) -> Result<usize> {
        self.schema
            .schema()
            .find_column_index(name)
            .ok_or_else(|| DbError::ColumnNotFound(name.to_string(), self.schema.name.clone()))
    }

    fn to_row(&self, attributes: &Attributes) -> Result<Row> {
        let mut row = vec![Value::Null; self.schema.schema().column_count()];
        for (name, value) in attributes {
            let idx = self.column_index(name)?;
            row[idx] = value.clone();
        }
        Ok(row)
    }

    fn to_attributes(&self, row: &Row) -> Attributes {
        self.schema
            .schema()
            .columns()
            .iter()
            .zip(row.iter())
            .map(|(col, value)| (col.name.clone(), value.clone()))
            .collect()
    }

    fn validate_row(&self, row: &Row) -> Result<()> {
        for (column, value) in self.schema.schema().columns().iter().zip(row.iter()) {
            column.validate(value)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    name: String,
    schema: Schema,
}

impl TableSchema {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            schema: Schema::new(columns),
        }
    }

    /// Entity table: `id` first, then `columns`, then creation/update timestamps.
    pub fn entity(name: impl Into<String>, columns: Vec<Column>) -> Self {
        let mut all = Vec::with_capacity(columns.len() + 3);
        all.push(Column::new(IDENTITY_COLUMN, DataType::Integer).not_null());
        all.extend(columns);
        all.push(Column::new(CREATED_AT_COLUMN, DataType::Text));
        all.push(Column::new(UPDATED_AT_COLUMN, DataType::Text));
        Self::new(name, all)
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn schema(&self) -> &Schema { &self.schema }
}
