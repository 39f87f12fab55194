// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime record types with typed readers and structural mapping.
//!
//! Assemble a record type from named fields at runtime, instantiate it, read
//! fields back through typed accessors, and copy data between records whose
//! shapes only partially overlap.
//!
//! # Features
//!
//! - **SchemaBuilder**: add/remove/edit fields, then freeze into a [`DynamicStruct`]
//! - **DynamicStruct**: factory for instances, instance slices and instance maps
//! - **RecordReader / FieldReader**: presence checks and typed accessors
//! - **Mapper**: recursive, name-based copy across optional/required and
//!   numeric width boundaries
//! - **record!**: declare ordinary structs that take part in reading and mapping
//! - **JSON bridge**: generic round trip through `serde_json`
//!
//! # Example
//!
//! ```rust
//! use hdds_dynstruct::{record, Kind, RecordReader, SchemaBuilder};
//!
//! record! {
//!     #[derive(Debug, Default)]
//!     pub struct Reading {
//!         pub id: u16,
//!         pub celsius: Option<f32>,
//!     }
//! }
//!
//! let mut builder = SchemaBuilder::new();
//! builder
//!     .add_field("id", Kind::I64, "json:\"id\"")
//!     .add_field("celsius", Kind::F64, "")
//!     .add_field("raw", Kind::String, "");
//!
//! let mut payload = builder.build().new_instance();
//! payload.set("id", 7i64).unwrap();
//! payload.set("celsius", 21.5f64).unwrap();
//!
//! let reader = RecordReader::new(&payload);
//! assert_eq!(reader.get_field("id").unwrap().i8(), 7);
//!
//! let mut reading = Reading::default();
//! reader.copy_into(&mut reading).unwrap();
//! assert_eq!(reading.id, 7);
//! assert_eq!(reading.celsius, Some(21.5));
//! ```

pub mod builder;
pub mod dynamic_struct;
pub mod error;
pub mod field_type;
pub mod json_bridge;
pub mod mapper;
pub mod reader;
pub mod record;
pub mod type_descriptor;
pub mod value;

pub use builder::{FieldConfig, SchemaBuilder};
pub use dynamic_struct::{DynamicStruct, InstanceMap, InstanceSlice};
pub use error::{DynStructError, Result};
pub use field_type::FieldType;
pub use mapper::{copy_into, ConfigError, Mapper, MapperConfig};
pub use reader::{FieldReader, RecordReader};
pub use record::{DynamicRecord, Record, RecordRef};
pub use type_descriptor::{FieldDescriptor, Kind, RecordType};
pub use value::Value;
