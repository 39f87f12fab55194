// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Record capability trait and the dynamic record container.

use std::borrow::Cow;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::{DynStructError, Result};
use crate::type_descriptor::{Kind, RecordType};
use crate::value::Value;

/// Field access shared by builder-produced and statically declared records.
///
/// The structural mapper and the readers only ever talk to records through
/// this trait, so both variants can appear on either side of a mapping.
pub trait Record {
    /// Layout of this record.
    fn record_type(&self) -> Arc<RecordType>;

    /// Current value of a field, or `None` if the record has no such field.
    fn field(&self, name: &str) -> Option<Cow<'_, Value>>;

    /// Assign a field.
    ///
    /// Fails with `UnknownField`, `UnassignableField` or `TypeMismatch`.
    fn set_field(&mut self, name: &str, value: Value) -> Result<()>;

    fn has_field(&self, name: &str) -> bool {
        self.record_type().has_field(name)
    }
}

/// Borrowed record handle, used where an operation needs to know whether
/// the caller handed over mutable access.
pub enum RecordRef<'a> {
    Shared(&'a dyn Record),
    Mutable(&'a mut dyn Record),
}

impl<'a> RecordRef<'a> {
    pub fn as_record(&self) -> &dyn Record {
        match self {
            Self::Shared(r) => *r,
            Self::Mutable(r) => &**r,
        }
    }

    pub fn is_mutable(&self) -> bool {
        matches!(self, Self::Mutable(_))
    }
}

impl<'a> From<&'a dyn Record> for RecordRef<'a> {
    fn from(r: &'a dyn Record) -> Self {
        Self::Shared(r)
    }
}

impl<'a> From<&'a mut dyn Record> for RecordRef<'a> {
    fn from(r: &'a mut dyn Record) -> Self {
        Self::Mutable(r)
    }
}

/// Instance of a runtime-built record type.
///
/// Each instance owns its field storage; cloning deep-copies it.
#[derive(Debug, Clone)]
pub struct DynamicRecord {
    record_type: Arc<RecordType>,
    values: Vec<Value>,
}

impl DynamicRecord {
    /// Create a zero-valued instance of `record_type`.
    pub fn new(record_type: Arc<RecordType>) -> Self {
        let values = record_type.fields().iter().map(|f| f.kind.zero()).collect();
        Self {
            record_type,
            values,
        }
    }

    /// Get the record type.
    pub fn record_type(&self) -> &Arc<RecordType> {
        &self.record_type
    }

    /// Get a field value by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        let idx = self.record_type.field_index(name)?;
        self.values.get(idx)
    }

    /// Set a field value by name, checking it against the field kind.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        self.assign(name, value.into(), false)
    }

    /// Remove a field's value, leaving its zero value behind.
    pub fn take(&mut self, name: &str) -> Option<Value> {
        let idx = self.record_type.field_index(name)?;
        let zero = self.record_type.fields()[idx].kind.zero();
        Some(std::mem::replace(&mut self.values[idx], zero))
    }

    /// Iterate over `(name, value)` pairs in layout order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.record_type
            .fields()
            .iter()
            .zip(self.values.iter())
            .map(|(f, v)| (f.name.as_str(), v))
    }

    /// Copy a record of any shape into a dynamic instance with its own layout.
    pub fn snapshot(record: &dyn Record) -> Self {
        let record_type = record.record_type();
        let values = record_type
            .fields()
            .iter()
            .map(|f| {
                record
                    .field(&f.name)
                    .map_or_else(|| f.kind.zero(), Cow::into_owned)
            })
            .collect();
        Self {
            record_type,
            values,
        }
    }

    fn assign(&mut self, name: &str, value: Value, respect_settable: bool) -> Result<()> {
        let idx = self
            .record_type
            .field_index(name)
            .ok_or_else(|| DynStructError::UnknownField(name.to_string()))?;
        let field = &self.record_type.fields()[idx];
        if respect_settable && !field.settable {
            return Err(DynStructError::UnassignableField(name.to_string()));
        }
        if !value.conforms_to(&field.kind) {
            return Err(DynStructError::TypeMismatch {
                field: name.to_string(),
                expected: field.kind.to_string(),
                actual: value.kind_name().to_string(),
            });
        }
        self.values[idx] = value;
        Ok(())
    }
}

impl Record for DynamicRecord {
    fn record_type(&self) -> Arc<RecordType> {
        self.record_type.clone()
    }

    fn field(&self, name: &str) -> Option<Cow<'_, Value>> {
        self.get(name).map(Cow::Borrowed)
    }

    fn set_field(&mut self, name: &str, value: Value) -> Result<()> {
        self.assign(name, value, true)
    }

    fn has_field(&self, name: &str) -> bool {
        self.record_type.has_field(name)
    }
}

impl PartialEq for DynamicRecord {
    fn eq(&self, other: &Self) -> bool {
        (Arc::ptr_eq(&self.record_type, &other.record_type)
            || self.record_type == other.record_type)
            && self.values == other.values
    }
}

impl Serialize for DynamicRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.fields() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl From<&DynamicRecord> for Kind {
    fn from(sample: &DynamicRecord) -> Self {
        Kind::Record(sample.record_type.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::type_descriptor::FieldDescriptor;

    fn sensor_type() -> Arc<RecordType> {
        Arc::new(RecordType::anonymous(vec![
            FieldDescriptor::new("Id", Kind::U32, ""),
            FieldDescriptor::new("Reading", Kind::optional(Kind::F64), ""),
            FieldDescriptor::new("Label", Kind::String, "").with_settable(false),
        ]))
    }

    #[test]
    fn test_new_is_zero_valued() {
        let rec = DynamicRecord::new(sensor_type());
        assert_eq!(rec.get("Id"), Some(&Value::U32(0)));
        assert_eq!(rec.get("Reading"), Some(&Value::none()));
        assert_eq!(rec.get("Label"), Some(&Value::String(String::new())));
        assert!(rec.get("Missing").is_none());
    }

    #[test]
    fn test_set_checks_kind() {
        let mut rec = DynamicRecord::new(sensor_type());
        rec.set("Id", 42u32).expect("set Id");
        rec.set("Reading", Value::some(21.5f64)).expect("set Reading");
        assert!(matches!(
            rec.set("Id", 42i64),
            Err(DynStructError::TypeMismatch { .. })
        ));
        assert!(matches!(
            rec.set("Reading", 1.0f64),
            Err(DynStructError::TypeMismatch { .. })
        ));
        assert!(matches!(
            rec.set("Nope", 1u32),
            Err(DynStructError::UnknownField(_))
        ));
    }

    #[test]
    fn test_set_field_respects_settable() {
        let mut rec = DynamicRecord::new(sensor_type());
        rec.set("Label", "direct").expect("inherent set ignores settable");
        let err = rec
            .set_field("Label", Value::from("via trait"))
            .unwrap_err();
        assert!(matches!(err, DynStructError::UnassignableField(_)));
        assert_eq!(rec.get("Label").and_then(Value::as_str), Some("direct"));
    }

    #[test]
    fn test_instances_do_not_alias() {
        let ty = sensor_type();
        let mut a = DynamicRecord::new(ty.clone());
        let b = DynamicRecord::new(ty);
        a.set("Id", 7u32).expect("set");
        let c = a.clone();
        a.set("Id", 8u32).expect("set");
        assert_eq!(b.get("Id"), Some(&Value::U32(0)));
        assert_eq!(c.get("Id"), Some(&Value::U32(7)));
    }

    #[test]
    fn test_take_leaves_zero() {
        let mut rec = DynamicRecord::new(sensor_type());
        rec.set("Reading", Value::some(1.0f64)).expect("set");
        assert_eq!(rec.take("Reading"), Some(Value::some(1.0f64)));
        assert_eq!(rec.get("Reading"), Some(&Value::none()));
    }

    #[test]
    fn test_record_ref_mutability() {
        let mut rec = DynamicRecord::new(sensor_type());
        let shared = RecordRef::Shared(&rec);
        assert!(!shared.is_mutable());
        let mutable = RecordRef::Mutable(&mut rec);
        assert!(mutable.is_mutable());
        assert!(mutable.as_record().has_field("Id"));
    }
}
