// ============================================================================
// ComposeDB Library
// ============================================================================

//! Entity composition over a record store.
//!
//! A host entity declares that it "acts as" one or more composed entities
//! linked one-to-one. The host then reads, writes, filters on and serializes
//! the composed entities' fields as if they were its own, and saving the host
//! saves the composed records with it.
//!
//! # Examples
//!
//! ```
//! use composedb::{
//!     ActsAsOptions, ClassRegistry, Column, DataType, EntityClass, Filter, HostModel,
//!     InMemoryStorage, StorageEngine, TableSchema, Value,
//! };
//!
//! # fn main() -> composedb::Result<()> {
//! let mut store = InMemoryStorage::new();
//! store.create_table(TableSchema::entity("paints", vec![Column::new("color", DataType::Text)]))?;
//! store.create_table(TableSchema::entity(
//!     "cars",
//!     vec![Column::new("make", DataType::Text), Column::new("paint_id", DataType::Integer)],
//! ))?;
//!
//! let mut classes = ClassRegistry::new();
//! classes.register(EntityClass::new("Paint"));
//! classes.register(EntityClass::new("Car"));
//!
//! let cars = HostModel::define(&store, &classes, "car")?
//!     .acts_as("paint", ActsAsOptions::new())?
//!     .build();
//!
//! let mut car = cars.new_record();
//! car.write(&mut store, "make", "Toyota")?;
//! car.write(&mut store, "color", "red")?;
//! car.save(&mut store)?;
//!
//! let filter: Filter = [("color".to_string(), Value::from("red"))].into_iter().collect();
//! let found = cars.select(&store, Some(&filter))?;
//! assert_eq!(found.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod storage;
pub mod query;
pub mod model;
pub mod compose;

// Re-export main types for convenience
pub use core::{ChangeSet, Column, DataType, DbError, FieldChange, Result, Value};
pub use storage::{InMemoryStorage, StorageEngine, TableSchema};
pub use query::{Condition, Join, Query};
pub use model::{ClassRegistry, EntityClass, Record, SerializeOptions};

// Re-export the composition API
pub use compose::{
    ActsAsOptions, AssociationDescriptor, AssociationRegistry, Filter, ForeignKeyPolicy,
    HostModel, HostModelBuilder, HostRecord,
};
