use super::{Catalog, StorageEngine, Table, TableSchema};
use crate::core::{Attributes, Column, DbError, Result, Value};
use crate::query::{Condition, Query};
use chrono::Utc;
use std::collections::HashMap;

/// Reference record store keeping every table in process memory.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    catalog: Catalog,
    tables: HashMap<String, Table>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    fn table(&self, name: &str) -> Result<&Table> {
        self.tables
            .get(name)
            .ok_or_else(|| DbError::TableNotFound(name.to_string()))
    }

    fn table_mut(&mut self, name: &str) -> Result<&mut Table> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| DbError::TableNotFound(name.to_string()))
    }

    fn now() -> Value {
        Value::Text(Utc::now().to_rfc3339())
    }

    /// Every column a query touches must exist before any row is scanned.
    fn validate_query(&self, query: &Query) -> Result<()> {
        let base = self.table(query.table())?;
        for join in query.joins() {
            let joined = self.table(&join.table)?;
            if !base.schema().schema().has_column(&join.left_column) {
                return Err(DbError::ColumnNotFound(join.left_column.clone(), query.table().to_string()));
            }
            if !joined.schema().schema().has_column(&join.right_column) {
                return Err(DbError::ColumnNotFound(join.right_column.clone(), join.table.clone()));
            }
        }
        for cond in query.conditions() {
            let in_scope = cond.table == query.table()
                || query.joins().iter().any(|join| join.table == cond.table);
            if !in_scope {
                return Err(DbError::TableNotFound(cond.table.clone()));
            }
            if !self.table(&cond.table)?.schema().schema().has_column(&cond.column) {
                return Err(DbError::ColumnNotFound(cond.column.clone(), cond.table.clone()));
            }
        }
        Ok(())
    }

    fn matches(condition: &Condition, attributes: &Attributes) -> bool {
        attributes
            .get(&condition.column)
            .is_some_and(|value| *value == condition.value)
    }
}

impl StorageEngine for InMemoryStorage {
    fn create_table(&mut self, schema: TableSchema) -> Result<()> {
        let name = schema.name().to_string();
        self.catalog = self.catalog.clone().with_table(schema.clone())?;
        self.tables.insert(name, Table::new(schema));
        Ok(())
    }

    fn drop_table(&mut self, name: &str) -> Result<()> {
        self.catalog = self.catalog.clone().without_table(name)?;
        self.tables.remove(name);
        Ok(())
    }

    fn table_exists(&self, name: &str) -> bool {
        self.catalog.table_exists(name)
    }

    fn columns(&self, table: &str) -> Result<Vec<Column>> {
        Ok(self.catalog.get_table(table)?.schema().columns().to_vec())
    }

    fn insert(&mut self, table: &str, attributes: Attributes) -> Result<Attributes> {
        let now = Self::now();
        self.table_mut(table)?.insert(&attributes, &now)
    }

    fn update(&mut self, table: &str, id: i64, attributes: Attributes) -> Result<Attributes> {
        let now = Self::now();
        self.table_mut(table)?.update(id, &attributes, Some(&now))
    }

    fn update_column(&mut self, table: &str, id: i64, column: &str, value: Value) -> Result<()> {
        let mut attributes = Attributes::new();
        attributes.insert(column.to_string(), value);
        self.table_mut(table)?.update(id, &attributes, None)?;
        Ok(())
    }

    fn find(&self, table: &str, id: i64) -> Result<Option<Attributes>> {
        Ok(self.table(table)?.get(id))
    }

    fn select(&self, query: &Query) -> Result<Vec<Attributes>> {
        self.validate_query(query)?;
        let base = self.table(query.table())?;

        let mut results = Vec::new();
        'rows: for row in base.scan() {
            let mut scope: HashMap<&str, Attributes> = HashMap::new();
            for join in query.joins() {
                let joined = self.table(&join.table)?;
                let key = row.get(&join.left_column).cloned().unwrap_or(Value::Null);
                if key.is_null() {
                    continue 'rows;
                }
                let matched = joined
                    .scan()
                    .find(|candidate| candidate.get(&join.right_column) == Some(&key));
                match matched {
                    Some(attributes) => {
                        scope.insert(join.table.as_str(), attributes);
                    }
                    None => continue 'rows,
                }
            }

            for cond in query.conditions() {
                let attributes = if cond.table == query.table() {
                    &row
                } else {
                    match scope.get(cond.table.as_str()) {
                        Some(attributes) => attributes,
                        None => continue 'rows,
                    }
                };
                if !Self::matches(cond, attributes) {
                    continue 'rows;
                }
            }
            results.push(row);
        }
        Ok(results)
    }

    fn row_count(&self, table: &str) -> Result<usize> {
        Ok(self.table(table)?.row_count())
    }

    fn list_tables(&self) -> Vec<String> {
        self.catalog.list_tables().into_iter().map(String::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DataType;
    use crate::query::Join;

    fn storage() -> InMemoryStorage {
        let mut storage = InMemoryStorage::new();
        storage
            .create_table(TableSchema::entity(
                "paints",
                vec![Column::new("color", DataType::Text)],
            ))
            .unwrap();
        storage
            .create_table(TableSchema::entity(
                "cars",
                vec![
                    Column::new("make", DataType::Text),
                    Column::new("paint_id", DataType::Integer),
                ],
            ))
            .unwrap();
        storage
    }

    fn attrs(pairs: &[(&str, Value)]) -> Attributes {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    fn paint_join() -> Join {
        Join {
            association: "paint".into(),
            table: "paints".into(),
            left_column: "paint_id".into(),
            right_column: "id".into(),
        }
    }

    #[test]
    fn test_select_with_join_filters_on_joined_table() {
        let mut storage = storage();
        storage.insert("paints", attrs(&[("color", "red".into())])).unwrap();
        storage.insert("paints", attrs(&[("color", "blue".into())])).unwrap();
        storage.insert("cars", attrs(&[("make", "Toyota".into()), ("paint_id", 1.into())])).unwrap();
        storage.insert("cars", attrs(&[("make", "Honda".into()), ("paint_id", 2.into())])).unwrap();
        storage.insert("cars", attrs(&[("make", "Kia".into())])).unwrap();

        let query = Query::from("cars").join(paint_join()).filter("paints", "color", "red");
        let rows = storage.select(&query).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["make"], Value::from("Toyota"));

        let all = storage.select(&Query::from("cars")).unwrap();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_select_rejects_unknown_columns() {
        let storage = storage();
        let query = Query::from("cars").filter("cars", "color", "red");
        assert!(matches!(storage.select(&query), Err(DbError::ColumnNotFound(_, _))));

        let unjoined = Query::from("cars").filter("paints", "color", "red");
        assert!(matches!(storage.select(&unjoined), Err(DbError::TableNotFound(_))));
    }

    #[test]
    fn test_update_column_keeps_update_timestamp() {
        let mut storage = storage();
        let stored = storage.insert("paints", attrs(&[("color", "red".into())])).unwrap();
        let stamp = stored["updated_at"].clone();

        storage.update_column("paints", 1, "color", "teal".into()).unwrap();
        let reloaded = storage.find("paints", 1).unwrap().unwrap();
        assert_eq!(reloaded["color"], Value::from("teal"));
        assert_eq!(reloaded["updated_at"], stamp);
    }

    #[test]
    fn test_drop_table() {
        let mut storage = storage();
        storage.drop_table("paints").unwrap();
        assert!(!storage.table_exists("paints"));
        assert!(matches!(storage.columns("paints"), Err(DbError::TableNotFound(_))));
    }
}
