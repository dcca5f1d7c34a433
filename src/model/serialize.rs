use serde::{Deserialize, Serialize};
use crate::core::{Attributes, Result, Value};
use super::Record;

/// Field selection for [`as_json`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializeOptions {
    /// Restrict columns to these names.
    pub only: Option<Vec<String>>,
    /// Columns to leave out.
    pub except: Vec<String>,
    /// Extra members read by name and added after the columns.
    pub methods: Vec<String>,
}

impl SerializeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn only<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.only = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn except<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.except.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn methods<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.union_methods(fields);
        self
    }

    /// Adds `fields` to `methods`, skipping names already present.
    pub fn union_methods<I, S>(&mut self, fields: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for field in fields {
            let field = field.into();
            if !self.methods.contains(&field) {
                self.methods.push(field);
            }
        }
    }

    fn includes_column(&self, name: &str) -> bool {
        let allowed = self
            .only
            .as_ref()
            .is_none_or(|only| only.iter().any(|f| f == name));
        allowed && !self.except.iter().any(|f| f == name)
    }
}

/// Something [`as_json`] can serialize: stored columns plus members
/// readable by name.
pub trait JsonSource {
    fn json_attributes(&self) -> Attributes;

    fn json_member(&mut self, name: &str) -> Result<Value>;
}

impl JsonSource for Record {
    fn json_attributes(&self) -> Attributes {
        self.attributes().clone()
    }

    fn json_member(&mut self, name: &str) -> Result<Value> {
        self.call(name, &[])
    }
}

/// Serializes the selected columns followed by every member in `methods`.
pub fn as_json<S: JsonSource + ?Sized>(source: &mut S, options: &SerializeOptions) -> Result<serde_json::Value> {
    let mut object = serde_json::Map::new();
    for (name, value) in source.json_attributes() {
        if options.includes_column(&name) {
            object.insert(name, value.to_json());
        }
    }
    for method in &options.methods {
        let value = source.json_member(method)?;
        object.insert(method.clone(), value.to_json());
    }
    Ok(serde_json::Value::Object(object))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use crate::core::{Column, DataType};
    use crate::model::EntityClass;

    fn paint() -> Record {
        let class = Arc::new(
            EntityClass::new("Paint").reader("shade", |record: &Record| {
                Ok(Value::Text(format!("dark {}", record.read_attribute("color")?)))
            }),
        );
        let mut record = Record::build(
            class,
            &[Column::new("id", DataType::Integer), Column::new("color", DataType::Text)],
        );
        record.set("color", "red").unwrap();
        record
    }

    #[test]
    fn test_columns_and_methods() {
        let mut record = paint();
        let json = as_json(&mut record, &SerializeOptions::new().methods(["shade"])).unwrap();
        assert_eq!(json, serde_json::json!({"id": null, "color": "red", "shade": "dark red"}));
    }

    #[test]
    fn test_only_and_except() {
        let mut record = paint();
        let only = as_json(&mut record, &SerializeOptions::new().only(["color"])).unwrap();
        assert_eq!(only, serde_json::json!({"color": "red"}));

        let except = as_json(&mut record, &SerializeOptions::new().except(["id"])).unwrap();
        assert_eq!(except, serde_json::json!({"color": "red"}));
    }

    #[test]
    fn test_union_methods_keeps_caller_fields() {
        let mut options = SerializeOptions::new().methods(["shade", "label"]);
        options.union_methods(["color", "shade"]);
        assert_eq!(options.methods, vec!["shade", "label", "color"]);
    }
}
