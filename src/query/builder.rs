use std::fmt;
use crate::core::Value;

/// `INNER JOIN <table> ON <table>.<right_column> = <base>.<left_column>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    pub association: String,
    pub table: String,
    /// Column on the base table holding the joined record's identity.
    pub left_column: String,
    /// Column on the joined table matched against `left_column`.
    pub right_column: String,
}

/// `<table>.<column> = <value>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub table: String,
    pub column: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    table: String,
    joins: Vec<Join>,
    conditions: Vec<Condition>,
}

impl Query {
    pub fn from(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            joins: Vec::new(),
            conditions: Vec::new(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn joins(&self) -> &[Join] {
        &self.joins
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Adds a join unless the same table is already joined.
    pub fn join(mut self, join: Join) -> Self {
        if !self.joins.iter().any(|existing| existing.table == join.table) {
            self.joins.push(join);
        }
        self
    }

    pub fn filter(mut self, table: impl Into<String>, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition {
            table: table.into(),
            column: column.into(),
            value: value.into(),
        });
        self
    }

    pub fn joined_tables(&self) -> Vec<&str> {
        self.joins.iter().map(|join| join.table.as_str()).collect()
    }

    pub fn is_unrestricted(&self) -> bool {
        self.joins.is_empty() && self.conditions.is_empty()
    }

    /// Renders the query as SQL text, for logging and inspection.
    pub fn to_sql(&self) -> String {
        let mut sql = format!("SELECT {}.* FROM {}", self.table, self.table);
        for join in &self.joins {
            sql.push_str(&format!(
                " INNER JOIN {} ON {}.{} = {}.{}",
                join.table, join.table, join.right_column, self.table, join.left_column
            ));
        }
        if !self.conditions.is_empty() {
            let clauses: Vec<String> = self
                .conditions
                .iter()
                .map(|cond| match &cond.value {
                    Value::Null => format!("{}.{} IS NULL", cond.table, cond.column),
                    value => format!("{}.{} = {}", cond.table, cond.column, value.to_sql_literal()),
                })
                .collect();
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_sql())
    }
}
