// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Binding between Rust field types and dynamic kinds/values.
//!
//! [`FieldType`] lets statically declared records (see [`crate::record!`])
//! describe their fields with the same [`Kind`]s the builder uses, so the
//! mapper can treat both through the [`crate::Record`] trait.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};

use crate::error::{DynStructError, Result};
use crate::type_descriptor::Kind;
use crate::value::Value;

/// A Rust type usable as a record field.
pub trait FieldType: Sized {
    /// Kind describing this type.
    fn kind() -> Kind;

    /// Convert to a dynamic value.
    fn to_value(&self) -> Value;

    /// Convert back from a dynamic value of the same kind.
    fn from_value(value: Value) -> Result<Self>;

    /// Zero value.
    fn zero() -> Self;
}

pub(crate) fn mismatch<T: FieldType>(value: &Value) -> DynStructError {
    DynStructError::TypeMismatch {
        field: String::new(),
        expected: T::kind().to_string(),
        actual: value.kind_name().to_string(),
    }
}

macro_rules! impl_field_type {
    ($ty:ty, $variant:ident) => {
        impl FieldType for $ty {
            fn kind() -> Kind {
                Kind::$variant
            }

            fn to_value(&self) -> Value {
                Value::$variant(self.clone())
            }

            fn from_value(value: Value) -> Result<Self> {
                match value {
                    Value::$variant(v) => Ok(v),
                    other => Err(mismatch::<Self>(&other)),
                }
            }

            fn zero() -> Self {
                Default::default()
            }
        }
    };
}

impl_field_type!(bool, Bool);
impl_field_type!(i8, I8);
impl_field_type!(i16, I16);
impl_field_type!(i32, I32);
impl_field_type!(i64, I64);
impl_field_type!(u8, U8);
impl_field_type!(u16, U16);
impl_field_type!(u32, U32);
impl_field_type!(u64, U64);
impl_field_type!(f32, F32);
impl_field_type!(f64, F64);
impl_field_type!(String, String);
impl_field_type!(DateTime<FixedOffset>, Time);

impl<T: FieldType> FieldType for Option<T> {
    fn kind() -> Kind {
        Kind::optional(T::kind())
    }

    fn to_value(&self) -> Value {
        Value::Optional(self.as_ref().map(|v| Box::new(v.to_value())))
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Optional(None) => Ok(None),
            Value::Optional(Some(inner)) => T::from_value(*inner).map(Some),
            other => Err(mismatch::<Self>(&other)),
        }
    }

    fn zero() -> Self {
        None
    }
}

impl<T: FieldType> FieldType for Vec<T> {
    fn kind() -> Kind {
        Kind::sequence(T::kind())
    }

    fn to_value(&self) -> Value {
        Value::Sequence(self.iter().map(FieldType::to_value).collect())
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Sequence(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(mismatch::<Self>(&other)),
        }
    }

    fn zero() -> Self {
        Vec::new()
    }
}

impl<T: FieldType> FieldType for BTreeMap<String, T> {
    fn kind() -> Kind {
        Kind::map(T::kind())
    }

    fn to_value(&self) -> Value {
        Value::Map(
            self.iter()
                .map(|(k, v)| (k.clone(), v.to_value()))
                .collect(),
        )
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Map(entries) => entries
                .into_iter()
                .map(|(k, v)| T::from_value(v).map(|v| (k, v)))
                .collect(),
            other => Err(mismatch::<Self>(&other)),
        }
    }

    fn zero() -> Self {
        BTreeMap::new()
    }
}

/// Declare a record type with a fixed, compile-time field set.
///
/// The struct is emitted as written and gains [`crate::Record`] and
/// [`FieldType`] implementations, so it can be read, mapped from and mapped
/// into like any builder-produced record, and nested inside other records.
///
/// A field may carry a metadata string with `#[tag = "..."]`. Fields without
/// a visibility modifier are not assignable through the record interface.
///
/// ```rust
/// use hdds_dynstruct::{record, Record, Value};
///
/// record! {
///     #[derive(Debug, Clone, PartialEq)]
///     pub struct Sensor {
///         #[tag = "json:\"id\""]
///         pub id: u32,
///         pub reading: Option<f64>,
///         serial: String,
///     }
/// }
///
/// let mut sensor = Sensor { id: 1, reading: None, serial: "A-1".into() };
/// sensor.set_field("reading", Value::some(20.5f64)).unwrap();
/// assert_eq!(sensor.reading, Some(20.5));
/// assert!(sensor.set_field("serial", Value::from("B-2")).is_err());
/// ```
#[macro_export]
macro_rules! record {
    (
        $(#[$smeta:meta])*
        $svis:vis struct $name:ident {
            $(
                $(#[tag = $tag:literal])?
                $fvis:vis $field:ident : $fty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$smeta])*
        $svis struct $name {
            $( $fvis $field: $fty, )*
        }

        impl $name {
            fn __record_type() -> ::std::sync::Arc<$crate::RecordType> {
                static SHAPE: ::std::sync::OnceLock<::std::sync::Arc<$crate::RecordType>> =
                    ::std::sync::OnceLock::new();
                SHAPE
                    .get_or_init(|| {
                        ::std::sync::Arc::new($crate::RecordType::declared(
                            stringify!($name),
                            module_path!(),
                            vec![$(
                                $crate::FieldDescriptor::new(
                                    stringify!($field),
                                    <$fty as $crate::FieldType>::kind(),
                                    $crate::record!(@tag $($tag)?),
                                )
                                .with_settable(!stringify!($fvis).is_empty()),
                            )*],
                        ))
                    })
                    .clone()
            }
        }

        impl $crate::Record for $name {
            fn record_type(&self) -> ::std::sync::Arc<$crate::RecordType> {
                Self::__record_type()
            }

            fn field(&self, name: &str) -> Option<::std::borrow::Cow<'_, $crate::Value>> {
                $(
                    if name == stringify!($field) {
                        return Some(::std::borrow::Cow::Owned(
                            $crate::FieldType::to_value(&self.$field),
                        ));
                    }
                )*
                None
            }

            fn set_field(&mut self, name: &str, value: $crate::Value) -> $crate::Result<()> {
                $(
                    if name == stringify!($field) {
                        if stringify!($fvis).is_empty() {
                            return Err($crate::DynStructError::UnassignableField(name.to_string()));
                        }
                        self.$field = <$fty as $crate::FieldType>::from_value(value).map_err(
                            |e| $crate::field_type::with_field_name(e, name),
                        )?;
                        return Ok(());
                    }
                )*
                Err($crate::DynStructError::UnknownField(name.to_string()))
            }
        }

        impl $crate::FieldType for $name {
            fn kind() -> $crate::Kind {
                $crate::Kind::Record(Self::__record_type())
            }

            fn to_value(&self) -> $crate::Value {
                $crate::Value::Record($crate::DynamicRecord::snapshot(self))
            }

            fn from_value(value: $crate::Value) -> $crate::Result<Self> {
                let mut record = match value {
                    $crate::Value::Record(record) => record,
                    other => {
                        return Err($crate::DynStructError::TypeMismatch {
                            field: String::new(),
                            expected: <Self as $crate::FieldType>::kind().to_string(),
                            actual: other.kind_name().to_string(),
                        })
                    }
                };
                Ok(Self {
                    $(
                        $field: match record.take(stringify!($field)) {
                            Some(v) => <$fty as $crate::FieldType>::from_value(v).map_err(
                                |e| $crate::field_type::with_field_name(e, stringify!($field)),
                            )?,
                            None => <$fty as $crate::FieldType>::zero(),
                        },
                    )*
                })
            }

            fn zero() -> Self {
                Self {
                    $( $field: <$fty as $crate::FieldType>::zero(), )*
                }
            }
        }
    };
    (@tag $tag:literal) => { $tag };
    (@tag) => { "" };
}

/// Attach a field name to a type mismatch raised below field level.
#[doc(hidden)]
pub fn with_field_name(err: DynStructError, name: &str) -> DynStructError {
    match err {
        DynStructError::TypeMismatch {
            field,
            expected,
            actual,
        } if field.is_empty() => DynStructError::TypeMismatch {
            field: name.to_string(),
            expected,
            actual,
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::DynamicRecord;
    use crate::Record;

    crate::record! {
        #[derive(Debug, Clone, PartialEq)]
        pub struct Inner {
            pub count: i32,
        }
    }

    crate::record! {
        #[derive(Debug, Clone, PartialEq)]
        pub struct Outer {
            #[tag = "json:\"name\""]
            pub name: String,
            pub inner: Inner,
            pub maybe: Option<u16>,
            pub tags: Vec<String>,
            hidden: i64,
        }
    }

    fn outer() -> Outer {
        Outer {
            name: "o".into(),
            inner: Inner { count: 3 },
            maybe: Some(9),
            tags: vec!["a".into(), "b".into()],
            hidden: 77,
        }
    }

    #[test]
    fn test_declared_record_type() {
        let ty = outer().record_type();
        assert_eq!(ty.name(), Some("Outer"));
        assert_eq!(ty.origin(), Some(module_path!()));
        assert_eq!(ty.len(), 5);
        assert_eq!(ty.field("name").map(|f| f.metadata.as_str()), Some("json:\"name\""));
        assert_eq!(ty.field("maybe").map(|f| &f.kind), Some(&Kind::optional(Kind::U16)));
        assert_eq!(ty.field("hidden").map(|f| f.settable), Some(false));
        assert_eq!(ty.field("inner").map(|f| f.settable), Some(true));
    }

    #[test]
    fn test_record_type_is_shared() {
        let a = outer().record_type();
        let b = Outer::zero().record_type();
        assert!(std::sync::Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_value_roundtrip_through_dynamic() {
        let original = outer();
        let value = original.to_value();
        let rec = value.as_record().expect("record value");
        assert_eq!(rec.get("hidden"), Some(&Value::I64(77)));
        let back = Outer::from_value(value).expect("from_value");
        assert_eq!(back, original);
    }

    #[test]
    fn test_set_field_static() {
        let mut o = outer();
        o.set_field("maybe", Value::none()).expect("set maybe");
        assert_eq!(o.maybe, None);
        let err = o.set_field("maybe", Value::U16(1)).unwrap_err();
        match err {
            DynStructError::TypeMismatch { field, .. } => assert_eq!(field, "maybe"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(matches!(
            o.set_field("hidden", Value::I64(1)),
            Err(DynStructError::UnassignableField(_))
        ));
        assert!(matches!(
            o.set_field("nope", Value::I64(1)),
            Err(DynStructError::UnknownField(_))
        ));
    }

    #[test]
    fn test_from_value_rejects_other_kinds() {
        assert!(Inner::from_value(Value::I32(1)).is_err());
        let rec = DynamicRecord::new(Inner::__record_type());
        assert_eq!(Inner::from_value(Value::Record(rec)).expect("zero"), Inner { count: 0 });
    }

    #[test]
    fn test_collections() {
        let mut m = BTreeMap::new();
        m.insert("k".to_string(), 1u8);
        let v = m.to_value();
        assert!(v.conforms_to(&Kind::map(Kind::U8)));
        assert_eq!(BTreeMap::<String, u8>::from_value(v).expect("map"), m);
        assert!(Vec::<u8>::from_value(Value::I32(1)).is_err());
    }
}
