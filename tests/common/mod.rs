#![allow(dead_code)]

use composedb::{
    ActsAsOptions, ClassRegistry, Column, DataType, EntityClass, HostModel, InMemoryStorage,
    Record, Result, StorageEngine, TableSchema, Value,
};
use std::sync::Arc;

/// Cars composed over paints; trucks sharing their identity with engines.
pub fn store() -> InMemoryStorage {
    let mut store = InMemoryStorage::new();
    store
        .create_table(TableSchema::entity(
            "paints",
            vec![
                Column::new("color", DataType::Text),
                Column::new("finish", DataType::Text),
                Column::new("name", DataType::Text),
            ],
        ))
        .unwrap();
    store
        .create_table(TableSchema::entity(
            "cars",
            vec![
                Column::new("make", DataType::Text),
                Column::new("status", DataType::Text),
                Column::new("paint_id", DataType::Integer),
                Column::new("trim_id", DataType::Integer),
                Column::new("sticker_id", DataType::Integer),
            ],
        ))
        .unwrap();
    store
        .create_table(TableSchema::entity(
            "engines",
            vec![Column::new("horsepower", DataType::Integer)],
        ))
        .unwrap();
    store
        .create_table(TableSchema::entity(
            "trucks",
            vec![Column::new("model", DataType::Text)],
        ))
        .unwrap();
    store
}

pub fn classes() -> ClassRegistry {
    let mut classes = ClassRegistry::new();
    classes.register(
        EntityClass::new("Paint")
            .reader("shade", |paint: &Record| {
                Ok(Value::Text(format!("dark {}", paint.read_attribute("color")?)))
            })
            .method("mix", |paint: &mut Record, args: &[Value]| {
                let color = paint.read_attribute("color")?;
                let other = args.first().cloned().unwrap_or_default();
                Ok(Value::Text(format!("{}-{}", color, other)))
            }),
    );
    classes.register(EntityClass::new("Car"));
    classes.register(EntityClass::new("Trim"));
    classes.register(EntityClass::new("Sticker"));
    classes.register(EntityClass::new("Engine"));
    classes.register(EntityClass::new("Truck"));
    classes
}

pub fn car_model(store: &InMemoryStorage, classes: &ClassRegistry) -> Result<Arc<HostModel>> {
    Ok(HostModel::define(store, classes, "car")?
        .acts_as("paint", ActsAsOptions::new())?
        .build())
}

pub fn truck_model(store: &InMemoryStorage, classes: &ClassRegistry) -> Result<Arc<HostModel>> {
    Ok(HostModel::define(store, classes, "truck")?
        .acts_as("engine", ActsAsOptions::new().shared_primary_key())?
        .build())
}
