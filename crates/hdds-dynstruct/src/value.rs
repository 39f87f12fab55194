// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Dynamic value types.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::record::DynamicRecord;
use crate::type_descriptor::Kind;

/// A dynamic value that can hold any field kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    // Scalars
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    String(String),
    Time(DateTime<FixedOffset>),

    // Composites
    Sequence(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Record(DynamicRecord),

    /// Nullable slot: `None` is absent.
    Optional(Option<Box<Value>>),
}

impl Value {
    /// Present optional value.
    pub fn some(value: impl Into<Value>) -> Self {
        Self::Optional(Some(Box::new(value.into())))
    }

    /// Absent optional value.
    pub fn none() -> Self {
        Self::Optional(None)
    }

    /// Check if this is an absent optional.
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Optional(None))
    }

    /// Look through one optional wrapper.
    ///
    /// Returns `None` for an absent optional and the value itself for
    /// anything that is not optional.
    pub fn present(&self) -> Option<&Value> {
        match self {
            Self::Optional(inner) => inner.as_deref(),
            other => Some(other),
        }
    }

    /// Owned counterpart of [`Value::present`].
    pub fn into_present(self) -> Option<Value> {
        match self {
            Self::Optional(inner) => inner.map(|v| *v),
            other => Some(other),
        }
    }

    /// Short name of the variant, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::I8(_) => "i8",
            Self::I16(_) => "i16",
            Self::I32(_) => "i32",
            Self::I64(_) => "i64",
            Self::U8(_) => "u8",
            Self::U16(_) => "u16",
            Self::U32(_) => "u32",
            Self::U64(_) => "u64",
            Self::F32(_) => "f32",
            Self::F64(_) => "f64",
            Self::String(_) => "string",
            Self::Time(_) => "time",
            Self::Sequence(_) => "sequence",
            Self::Map(_) => "map",
            Self::Record(_) => "record",
            Self::Optional(_) => "optional",
        }
    }

    /// Widen a signed integer to i64.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Self::I8(v) => Some(v as i64),
            Self::I16(v) => Some(v as i64),
            Self::I32(v) => Some(v as i64),
            Self::I64(v) => Some(v),
            _ => None,
        }
    }

    /// Widen an unsigned integer to u64.
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Self::U8(v) => Some(v as u64),
            Self::U16(v) => Some(v as u64),
            Self::U32(v) => Some(v as u64),
            Self::U64(v) => Some(v),
            _ => None,
        }
    }

    /// Widen a float to f64.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::F32(v) => Some(v as f64),
            Self::F64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            Self::Time(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Self::Sequence(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Self::Map(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&DynamicRecord> {
        match self {
            Self::Record(v) => Some(v),
            _ => None,
        }
    }

    /// Check that this value can be stored in a field of `kind`.
    pub fn conforms_to(&self, kind: &Kind) -> bool {
        match (self, kind) {
            (Self::Bool(_), Kind::Bool)
            | (Self::I8(_), Kind::I8)
            | (Self::I16(_), Kind::I16)
            | (Self::I32(_), Kind::I32)
            | (Self::I64(_), Kind::I64)
            | (Self::U8(_), Kind::U8)
            | (Self::U16(_), Kind::U16)
            | (Self::U32(_), Kind::U32)
            | (Self::U64(_), Kind::U64)
            | (Self::F32(_), Kind::F32)
            | (Self::F64(_), Kind::F64)
            | (Self::String(_), Kind::String)
            | (Self::Time(_), Kind::Time) => true,
            (Self::Sequence(items), Kind::Sequence(elem)) => {
                items.iter().all(|v| v.conforms_to(elem))
            }
            (Self::Map(entries), Kind::Map(elem)) => entries.values().all(|v| v.conforms_to(elem)),
            (Self::Record(rec), Kind::Record(ty)) => {
                std::sync::Arc::ptr_eq(rec.record_type(), ty) || **rec.record_type() == **ty
            }
            (Self::Optional(None), Kind::Optional(_)) => true,
            (Self::Optional(Some(inner)), Kind::Optional(k)) => inner.conforms_to(k),
            _ => false,
        }
    }

    /// Numeric conversion into `target`.
    ///
    /// Integer narrowing truncates (two's complement), float to integer
    /// saturates, integer to float rounds to nearest. Returns `None` when
    /// either side is not numeric.
    pub fn convert_to(&self, target: &Kind) -> Option<Value> {
        if let Some(v) = self.as_i64() {
            return Self::from_i64(v, target);
        }
        if let Some(v) = self.as_u64() {
            return Self::from_u64(v, target);
        }
        let v = self.as_f64()?;
        Some(match target {
            Kind::I8 => Self::I8(v as i8),
            Kind::I16 => Self::I16(v as i16),
            Kind::I32 => Self::I32(v as i32),
            Kind::I64 => Self::I64(v as i64),
            Kind::U8 => Self::U8(v as u8),
            Kind::U16 => Self::U16(v as u16),
            Kind::U32 => Self::U32(v as u32),
            Kind::U64 => Self::U64(v as u64),
            Kind::F32 => Self::F32(v as f32),
            Kind::F64 => Self::F64(v),
            _ => return None,
        })
    }

    fn from_i64(v: i64, target: &Kind) -> Option<Value> {
        Some(match target {
            Kind::I8 => Self::I8(v as i8),
            Kind::I16 => Self::I16(v as i16),
            Kind::I32 => Self::I32(v as i32),
            Kind::I64 => Self::I64(v),
            Kind::U8 => Self::U8(v as u8),
            Kind::U16 => Self::U16(v as u16),
            Kind::U32 => Self::U32(v as u32),
            Kind::U64 => Self::U64(v as u64),
            Kind::F32 => Self::F32(v as f32),
            Kind::F64 => Self::F64(v as f64),
            _ => return None,
        })
    }

    fn from_u64(v: u64, target: &Kind) -> Option<Value> {
        Some(match target {
            Kind::I8 => Self::I8(v as i8),
            Kind::I16 => Self::I16(v as i16),
            Kind::I32 => Self::I32(v as i32),
            Kind::I64 => Self::I64(v as i64),
            Kind::U8 => Self::U8(v as u8),
            Kind::U16 => Self::U16(v as u16),
            Kind::U32 => Self::U32(v as u32),
            Kind::U64 => Self::U64(v),
            Kind::F32 => Self::F32(v as f32),
            Kind::F64 => Self::F64(v as f64),
            _ => return None,
        })
    }
}

// Conversion traits
macro_rules! impl_from_scalar {
    ($ty:ty, $variant:ident) => {
        impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Self::$variant(v)
            }
        }
    };
}

impl_from_scalar!(bool, Bool);
impl_from_scalar!(i8, I8);
impl_from_scalar!(i16, I16);
impl_from_scalar!(i32, I32);
impl_from_scalar!(i64, I64);
impl_from_scalar!(u8, U8);
impl_from_scalar!(u16, U16);
impl_from_scalar!(u32, U32);
impl_from_scalar!(u64, U64);
impl_from_scalar!(f32, F32);
impl_from_scalar!(f64, F64);
impl_from_scalar!(String, String);
impl_from_scalar!(DateTime<FixedOffset>, Time);
impl_from_scalar!(DynamicRecord, Record);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::Sequence(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        Self::Optional(v.map(|inner| Box::new(inner.into())))
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Bool(v) => serializer.serialize_bool(*v),
            Self::I8(v) => serializer.serialize_i8(*v),
            Self::I16(v) => serializer.serialize_i16(*v),
            Self::I32(v) => serializer.serialize_i32(*v),
            Self::I64(v) => serializer.serialize_i64(*v),
            Self::U8(v) => serializer.serialize_u8(*v),
            Self::U16(v) => serializer.serialize_u16(*v),
            Self::U32(v) => serializer.serialize_u32(*v),
            Self::U64(v) => serializer.serialize_u64(*v),
            Self::F32(v) => serializer.serialize_f32(*v),
            Self::F64(v) => serializer.serialize_f64(*v),
            Self::String(v) => serializer.serialize_str(v),
            Self::Time(v) => serializer.serialize_str(&v.to_rfc3339()),
            Self::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            Self::Record(rec) => rec.serialize(serializer),
            Self::Optional(None) => serializer.serialize_none(),
            Self::Optional(Some(inner)) => serializer.serialize_some(inner.as_ref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_present() {
        assert_eq!(Value::some(5i32).present(), Some(&Value::I32(5)));
        assert_eq!(Value::none().present(), None);
        assert_eq!(Value::I32(5).present(), Some(&Value::I32(5)));
        assert!(Value::none().is_absent());
        assert!(!Value::I32(0).is_absent());
    }

    #[test]
    fn test_widening_accessors() {
        assert_eq!(Value::I8(-3).as_i64(), Some(-3));
        assert_eq!(Value::U16(7).as_u64(), Some(7));
        assert_eq!(Value::F32(1.5).as_f64(), Some(1.5));
        assert_eq!(Value::U16(7).as_i64(), None);
    }

    #[test]
    fn test_convert_truncates() {
        assert_eq!(Value::I64(300).convert_to(&Kind::I8), Some(Value::I8(44)));
        assert_eq!(Value::I64(-1).convert_to(&Kind::U16), Some(Value::U16(u16::MAX)));
        assert_eq!(Value::U8(200).convert_to(&Kind::F64), Some(Value::F64(200.0)));
        assert_eq!(Value::F64(12.9).convert_to(&Kind::I32), Some(Value::I32(12)));
        assert_eq!(Value::String("1".into()).convert_to(&Kind::I32), None);
        assert_eq!(Value::I32(1).convert_to(&Kind::String), None);
    }

    #[test]
    fn test_conforms_to() {
        assert!(Value::I32(1).conforms_to(&Kind::I32));
        assert!(!Value::I32(1).conforms_to(&Kind::I64));
        assert!(Value::none().conforms_to(&Kind::optional(Kind::Bool)));
        assert!(Value::some(true).conforms_to(&Kind::optional(Kind::Bool)));
        assert!(!Value::Bool(true).conforms_to(&Kind::optional(Kind::Bool)));
        assert!(Value::from(vec![1u8, 2, 3]).conforms_to(&Kind::sequence(Kind::U8)));
        assert!(!Value::from(vec![1u8, 2, 3]).conforms_to(&Kind::sequence(Kind::U16)));
    }

    #[test]
    fn test_serialize_json() {
        let mut map = BTreeMap::new();
        map.insert("a".to_string(), Value::from(vec![1i32, 2]));
        map.insert("b".to_string(), Value::none());
        map.insert("c".to_string(), Value::some("x"));
        let json = serde_json::to_value(Value::Map(map)).expect("serialize");
        assert_eq!(json, serde_json::json!({"a": [1, 2], "b": null, "c": "x"}));
    }
}
