// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Read-only views over records and their fields.
//!
//! A [`RecordReader`] binds to one record; a [`FieldReader`] exposes one field
//! through typed accessors. Accessors come in four flavours:
//!
//! - `i32()`: value form, panics when the field is not a signed integer
//! - `try_i32()`: same, returning `TypeAssertion` instead of panicking
//! - `opt_i32()`: optional form, `None` when the field is an absent optional
//! - `try_opt_i32()`: fallible optional form
//!
//! Numeric width is reinterpreted freely within a family (a stored `300`
//! read through `i8()` gives `44`); the family itself must match.

use std::borrow::Cow;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use serde::de::DeserializeOwned;

use crate::error::{DynStructError, Result};
use crate::json_bridge;
use crate::mapper::Mapper;
use crate::record::Record;
use crate::type_descriptor::{FieldDescriptor, Kind, RecordType};
use crate::value::Value;

/// View over a single record.
pub struct RecordReader<'a> {
    record: &'a dyn Record,
    record_type: Arc<RecordType>,
}

impl<'a> RecordReader<'a> {
    pub fn new(record: &'a dyn Record) -> Self {
        Self {
            record_type: record.record_type(),
            record,
        }
    }

    /// Readers for every record held by a sequence or map value.
    ///
    /// Map entries come back in key order. A present optional wrapping the
    /// container is looked through.
    pub fn readers_of(value: &'a Value) -> Result<Vec<RecordReader<'a>>> {
        fn reader_for(item: &Value) -> Result<RecordReader<'_>> {
            match item.present() {
                Some(Value::Record(rec)) => Ok(RecordReader::new(rec)),
                _ => Err(DynStructError::InvalidArgument(format!(
                    "expected a record element, found {}",
                    item.kind_name()
                ))),
            }
        }

        match value.present() {
            Some(Value::Sequence(items)) => items.iter().map(reader_for).collect(),
            Some(Value::Map(entries)) => entries.values().map(reader_for).collect(),
            _ => Err(DynStructError::InvalidArgument(format!(
                "expected a sequence or map of records, found {}",
                value.kind_name()
            ))),
        }
    }

    /// The bound record.
    pub fn record(&self) -> &'a dyn Record {
        self.record
    }

    pub fn record_type(&self) -> &Arc<RecordType> {
        &self.record_type
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.record_type.has_field(name)
    }

    /// Reader for one field, or `None` if the record has no such field.
    pub fn get_field(&self, name: &str) -> Option<FieldReader<'a>> {
        let index = self.record_type.field_index(name)?;
        let value = self.record.field(name)?;
        Some(FieldReader {
            record_type: self.record_type.clone(),
            index,
            value,
        })
    }

    /// Readers for all fields, in layout order.
    pub fn all_fields(&self) -> Vec<FieldReader<'a>> {
        self.record_type
            .fields()
            .iter()
            .filter_map(|f| self.get_field(&f.name))
            .collect()
    }

    /// Structurally copy the bound record into `destination` with the
    /// default mapper configuration.
    pub fn copy_into(&self, destination: &mut dyn Record) -> Result<()> {
        Mapper::default().copy_into(self.record, destination)
    }

    /// Round-trip the record through JSON into any deserializable type.
    ///
    /// Fails with `InvalidArgument` if a field holds a NaN or infinite float.
    pub fn map_to<T: DeserializeOwned>(&self) -> Result<T> {
        let json = json_bridge::record_to_json(self.record)?;
        Ok(serde_json::from_value(json)?)
    }

    /// Round-trip the record through JSON into another record.
    ///
    /// Fields missing from the source or not assignable on the destination
    /// keep their current value.
    pub fn map_into(&self, destination: &mut dyn Record) -> Result<()> {
        let json = json_bridge::record_to_json(self.record)?;
        json_bridge::assign_json(destination, &json)
    }
}

/// View over a single field of a record.
pub struct FieldReader<'a> {
    record_type: Arc<RecordType>,
    index: usize,
    value: Cow<'a, Value>,
}

macro_rules! accessors {
    ($(($name:ident, $try_name:ident, $opt_name:ident, $try_opt_name:ident, $ty:ty, $family:ident, $label:literal)),* $(,)?) => {
        $(
            #[doc = concat!("Read as `", stringify!($ty), "`; panics on a family mismatch or an absent optional.")]
            pub fn $name(&self) -> $ty {
                self.$try_name().unwrap_or_else(|e| panic!("{}", e))
            }

            #[doc = concat!("Read as `", stringify!($ty), "`.")]
            pub fn $try_name(&self) -> Result<$ty> {
                self.$try_opt_name()?
                    .ok_or_else(|| self.assertion($label, "absent optional"))
            }

            #[doc = concat!("Read as `Option<", stringify!($ty), ">`; panics on a family mismatch.")]
            pub fn $opt_name(&self) -> Option<$ty> {
                self.$try_opt_name().unwrap_or_else(|e| panic!("{}", e))
            }

            #[doc = concat!("Read as `Option<", stringify!($ty), ">`.")]
            pub fn $try_opt_name(&self) -> Result<Option<$ty>> {
                self.extract($label, |v| v.$family().map(|n| n as $ty))
            }
        )*
    };
}

impl<'a> FieldReader<'a> {
    pub fn descriptor(&self) -> &FieldDescriptor {
        &self.record_type.fields()[self.index]
    }

    pub fn name(&self) -> &str {
        &self.descriptor().name
    }

    pub fn metadata(&self) -> &str {
        &self.descriptor().metadata
    }

    pub fn kind(&self) -> &Kind {
        &self.descriptor().kind
    }

    /// Whether the field is an optional that is currently unset.
    pub fn is_absent(&self) -> bool {
        self.value.is_absent()
    }

    /// Untyped current value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value.into_owned()
    }

    /// Round-trip the field value through JSON into any deserializable type.
    pub fn map_to<T: DeserializeOwned>(&self) -> Result<T> {
        let json = json_bridge::field_to_json(self.name(), &self.value)?;
        Ok(serde_json::from_value(json)?)
    }

    fn assertion(&self, expected: &str, actual: &str) -> DynStructError {
        DynStructError::TypeAssertion {
            field: self.name().to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    fn extract<T>(&self, expected: &str, f: impl FnOnce(&Value) -> Option<T>) -> Result<Option<T>> {
        match self.value.present() {
            None => Ok(None),
            Some(v) => f(v)
                .map(Some)
                .ok_or_else(|| self.assertion(expected, &self.kind().to_string())),
        }
    }

    accessors!(
        (i8, try_i8, opt_i8, try_opt_i8, i8, as_i64, "signed integer"),
        (i16, try_i16, opt_i16, try_opt_i16, i16, as_i64, "signed integer"),
        (i32, try_i32, opt_i32, try_opt_i32, i32, as_i64, "signed integer"),
        (i64, try_i64, opt_i64, try_opt_i64, i64, as_i64, "signed integer"),
        (u8, try_u8, opt_u8, try_opt_u8, u8, as_u64, "unsigned integer"),
        (u16, try_u16, opt_u16, try_opt_u16, u16, as_u64, "unsigned integer"),
        (u32, try_u32, opt_u32, try_opt_u32, u32, as_u64, "unsigned integer"),
        (u64, try_u64, opt_u64, try_opt_u64, u64, as_u64, "unsigned integer"),
        (f32, try_f32, opt_f32, try_opt_f32, f32, as_f64, "float"),
        (f64, try_f64, opt_f64, try_opt_f64, f64, as_f64, "float"),
    );

    pub fn string(&self) -> String {
        self.try_string().unwrap_or_else(|e| panic!("{}", e))
    }

    pub fn try_string(&self) -> Result<String> {
        self.try_opt_string()?
            .ok_or_else(|| self.assertion("string", "absent optional"))
    }

    pub fn opt_string(&self) -> Option<String> {
        self.try_opt_string().unwrap_or_else(|e| panic!("{}", e))
    }

    pub fn try_opt_string(&self) -> Result<Option<String>> {
        self.extract("string", |v| v.as_str().map(str::to_string))
    }

    pub fn bool(&self) -> bool {
        self.try_bool().unwrap_or_else(|e| panic!("{}", e))
    }

    pub fn try_bool(&self) -> Result<bool> {
        self.try_opt_bool()?
            .ok_or_else(|| self.assertion("bool", "absent optional"))
    }

    pub fn opt_bool(&self) -> Option<bool> {
        self.try_opt_bool().unwrap_or_else(|e| panic!("{}", e))
    }

    pub fn try_opt_bool(&self) -> Result<Option<bool>> {
        self.extract("bool", Value::as_bool)
    }

    pub fn time(&self) -> DateTime<FixedOffset> {
        self.try_time().unwrap_or_else(|e| panic!("{}", e))
    }

    pub fn try_time(&self) -> Result<DateTime<FixedOffset>> {
        self.try_opt_time()?
            .ok_or_else(|| self.assertion("time", "absent optional"))
    }

    pub fn opt_time(&self) -> Option<DateTime<FixedOffset>> {
        self.try_opt_time().unwrap_or_else(|e| panic!("{}", e))
    }

    pub fn try_opt_time(&self) -> Result<Option<DateTime<FixedOffset>>> {
        self.extract("time", |v| v.as_time().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::SchemaBuilder;
    use crate::record::DynamicRecord;

    fn sample() -> DynamicRecord {
        let mut b = SchemaBuilder::new();
        b.add_field("Wide", Kind::I64, "json:\"wide\"")
            .add_field("Count", Kind::U32, "")
            .add_field("Ratio", Kind::F32, "")
            .add_field("Name", Kind::String, "")
            .add_field("Flag", Kind::optional(Kind::Bool), "")
            .add_field("Seen", Kind::Time, "")
            .add_field("Maybe", Kind::optional(Kind::I32), "");
        let mut rec = b.build().new_instance();
        rec.set("Wide", 300i64).expect("set");
        rec.set("Count", 7u32).expect("set");
        rec.set("Ratio", 0.5f32).expect("set");
        rec.set("Name", "sensor").expect("set");
        rec.set("Flag", Value::some(true)).expect("set");
        let seen = DateTime::parse_from_rfc3339("2024-05-01T12:00:00+02:00").expect("rfc3339");
        rec.set("Seen", seen).expect("set");
        rec
    }

    #[test]
    fn test_presence() {
        let rec = sample();
        let reader = RecordReader::new(&rec);
        assert!(reader.has_field("Wide"));
        assert!(!reader.has_field("wide"));
        assert!(reader.get_field("Nope").is_none());
        assert_eq!(reader.all_fields().len(), 7);
    }

    #[test]
    fn test_field_metadata() {
        let rec = sample();
        let reader = RecordReader::new(&rec);
        let f = reader.get_field("Wide").expect("Wide");
        assert_eq!(f.name(), "Wide");
        assert_eq!(f.metadata(), "json:\"wide\"");
        assert_eq!(f.kind(), &Kind::I64);
    }

    #[test]
    fn test_width_truncation() {
        let rec = sample();
        let f = RecordReader::new(&rec).get_field("Wide").expect("Wide");
        assert_eq!(f.i8(), 44);
        assert_eq!(f.i16(), 300);
        assert_eq!(f.i64(), 300);
    }

    #[test]
    fn test_typed_reads() {
        let rec = sample();
        let reader = RecordReader::new(&rec);
        assert_eq!(reader.get_field("Count").expect("Count").u8(), 7);
        assert_eq!(reader.get_field("Ratio").expect("Ratio").f64(), 0.5);
        assert_eq!(reader.get_field("Name").expect("Name").string(), "sensor");
        assert!(reader.get_field("Flag").expect("Flag").bool());
        assert_eq!(
            reader.get_field("Seen").expect("Seen").time().to_rfc3339(),
            "2024-05-01T12:00:00+02:00"
        );
    }

    #[test]
    fn test_optional_forms() {
        let rec = sample();
        let reader = RecordReader::new(&rec);
        let maybe = reader.get_field("Maybe").expect("Maybe");
        assert!(maybe.is_absent());
        assert_eq!(maybe.opt_i32(), None);
        assert!(maybe.try_i32().is_err());
        assert_eq!(reader.get_field("Flag").expect("Flag").opt_bool(), Some(true));
        assert_eq!(reader.get_field("Count").expect("Count").opt_u64(), Some(7));
    }

    #[test]
    fn test_wrong_family_is_type_assertion() {
        let rec = sample();
        let reader = RecordReader::new(&rec);
        let err = reader.get_field("Wide").expect("Wide").try_time().unwrap_err();
        match err {
            DynStructError::TypeAssertion { field, expected, actual } => {
                assert_eq!(field, "Wide");
                assert_eq!(expected, "time");
                assert_eq!(actual, "i64");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(reader.get_field("Count").expect("Count").try_i32().is_err());
        assert!(reader.get_field("Name").expect("Name").try_f64().is_err());
    }

    #[test]
    #[should_panic(expected = "Type assertion failed")]
    fn test_wrong_family_panics() {
        let rec = sample();
        let reader = RecordReader::new(&rec);
        let _ = reader.get_field("Wide").expect("Wide").time();
    }

    #[test]
    fn test_untyped_value() {
        let rec = sample();
        let reader = RecordReader::new(&rec);
        let f = reader.get_field("Name").expect("Name");
        assert_eq!(f.value(), &Value::from("sensor"));
        assert_eq!(f.into_value(), Value::from("sensor"));
    }

    #[test]
    fn test_readers_of() {
        let mut b = SchemaBuilder::new();
        b.add_field("N", Kind::U8, "");
        let ty = b.build();
        let mut first = ty.new_instance();
        first.set("N", 1u8).expect("set");
        let second = ty.new_instance();
        let seq = Value::Sequence(vec![Value::Record(first), Value::Record(second)]);
        let readers = RecordReader::readers_of(&seq).expect("readers");
        assert_eq!(readers.len(), 2);
        assert_eq!(readers[0].get_field("N").expect("N").u8(), 1);
        assert!(RecordReader::readers_of(&Value::I32(1)).is_err());
        assert!(RecordReader::readers_of(&Value::from(vec![1u8])).is_err());
    }

    #[test]
    fn test_map_to_rejects_non_finite_float() {
        let mut rec = sample();
        rec.set("Ratio", f32::NAN).expect("set");
        let reader = RecordReader::new(&rec);

        let err = reader
            .map_to::<std::collections::BTreeMap<String, serde_json::Value>>()
            .unwrap_err();
        match err {
            DynStructError::InvalidArgument(msg) => assert!(msg.contains("\"Ratio\""), "{msg}"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(matches!(
            reader.get_field("Ratio").expect("Ratio").map_to::<f32>(),
            Err(DynStructError::InvalidArgument(_))
        ));
        assert_eq!(
            reader.get_field("Count").expect("Count").map_to::<u32>().expect("u32"),
            7
        );
    }
}
