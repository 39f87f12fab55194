// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Kinds, record types and field descriptors.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::field_type::FieldType;
use crate::value::Value;

/// Shape of a single field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Kind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    String,
    /// Timestamp with a fixed UTC offset.
    Time,
    /// Growable sequence of elements.
    Sequence(Box<Kind>),
    /// Text-keyed mapping.
    Map(Box<Kind>),
    /// Nested record.
    Record(Arc<RecordType>),
    /// Nullable wrapper around the true kind.
    Optional(Box<Kind>),
}

impl Kind {
    /// Kind of a statically typed field.
    pub fn of<T: FieldType>() -> Self {
        T::kind()
    }

    /// Wrap a kind as optional.
    pub fn optional(inner: Kind) -> Self {
        Self::Optional(Box::new(inner))
    }

    /// Sequence of `element`.
    pub fn sequence(element: Kind) -> Self {
        Self::Sequence(Box::new(element))
    }

    /// Text-keyed map of `value`.
    pub fn map(value: Kind) -> Self {
        Self::Map(Box::new(value))
    }

    /// Check if this kind is an optional wrapper.
    pub fn is_optional(&self) -> bool {
        matches!(self, Self::Optional(_))
    }

    /// The true kind: one level of optional wrapping stripped.
    pub fn strip_optional(&self) -> &Kind {
        match self {
            Self::Optional(inner) => inner,
            other => other,
        }
    }

    /// Record type, looking through one optional wrapper.
    pub fn as_record(&self) -> Option<&Arc<RecordType>> {
        match self.strip_optional() {
            Self::Record(ty) => Some(ty),
            _ => None,
        }
    }

    pub fn is_signed(&self) -> bool {
        matches!(self, Self::I8 | Self::I16 | Self::I32 | Self::I64)
    }

    pub fn is_unsigned(&self) -> bool {
        matches!(self, Self::U8 | Self::U16 | Self::U32 | Self::U64)
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    pub fn is_numeric(&self) -> bool {
        self.is_signed() || self.is_unsigned() || self.is_float()
    }

    /// Whether a value of this kind converts to `target` without being identical.
    ///
    /// Only numeric widening/narrowing is defined. Text, booleans, timestamps
    /// and composites never convert implicitly.
    pub fn convertible_to(&self, target: &Kind) -> bool {
        self.is_numeric() && target.is_numeric()
    }

    /// Zero value of this kind.
    pub fn zero(&self) -> Value {
        match self {
            Self::Bool => Value::Bool(false),
            Self::I8 => Value::I8(0),
            Self::I16 => Value::I16(0),
            Self::I32 => Value::I32(0),
            Self::I64 => Value::I64(0),
            Self::U8 => Value::U8(0),
            Self::U16 => Value::U16(0),
            Self::U32 => Value::U32(0),
            Self::U64 => Value::U64(0),
            Self::F32 => Value::F32(0.0),
            Self::F64 => Value::F64(0.0),
            Self::String => Value::String(String::new()),
            Self::Time => Value::Time(Default::default()),
            Self::Sequence(_) => Value::Sequence(Vec::new()),
            Self::Map(_) => Value::Map(Default::default()),
            Self::Record(ty) => Value::Record(crate::record::DynamicRecord::new(ty.clone())),
            Self::Optional(_) => Value::Optional(None),
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => write!(f, "bool"),
            Self::I8 => write!(f, "i8"),
            Self::I16 => write!(f, "i16"),
            Self::I32 => write!(f, "i32"),
            Self::I64 => write!(f, "i64"),
            Self::U8 => write!(f, "u8"),
            Self::U16 => write!(f, "u16"),
            Self::U32 => write!(f, "u32"),
            Self::U64 => write!(f, "u64"),
            Self::F32 => write!(f, "f32"),
            Self::F64 => write!(f, "f64"),
            Self::String => write!(f, "string"),
            Self::Time => write!(f, "time"),
            Self::Sequence(elem) => write!(f, "sequence<{}>", elem),
            Self::Map(value) => write!(f, "map<string, {}>", value),
            Self::Record(ty) => write!(f, "record {}", ty.display_name()),
            Self::Optional(inner) => write!(f, "optional<{}>", inner),
        }
    }
}

/// Field descriptor for record members.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Field name (case-sensitive, unique within a record).
    pub name: String,
    /// Field kind.
    pub kind: Kind,
    /// Opaque annotation string, stored and exposed verbatim.
    pub metadata: String,
    /// Whether the field can be assigned through [`crate::Record::set_field`].
    pub settable: bool,
}

impl FieldDescriptor {
    /// Create a new, settable field descriptor.
    pub fn new(name: impl Into<String>, kind: Kind, metadata: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            metadata: metadata.into(),
            settable: true,
        }
    }

    /// Set assignability.
    pub fn with_settable(mut self, settable: bool) -> Self {
        self.settable = settable;
        self
    }
}

/// Frozen layout of a record.
///
/// Builder-produced types are anonymous; types declared with [`crate::record!`]
/// carry their declared name and the module path they were declared in.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordType {
    name: Option<String>,
    origin: Option<String>,
    fields: Vec<FieldDescriptor>,
    index: HashMap<String, usize>,
}

impl RecordType {
    /// Create an anonymous record type.
    pub fn anonymous(fields: Vec<FieldDescriptor>) -> Self {
        Self::with_identity(None, None, fields)
    }

    /// Create a declared record type.
    pub fn declared(
        name: impl Into<String>,
        origin: impl Into<String>,
        fields: Vec<FieldDescriptor>,
    ) -> Self {
        Self::with_identity(Some(name.into()), Some(origin.into()), fields)
    }

    fn with_identity(
        name: Option<String>,
        origin: Option<String>,
        fields: Vec<FieldDescriptor>,
    ) -> Self {
        let index = fields
            .iter()
            .enumerate()
            .map(|(i, f)| (f.name.clone(), i))
            .collect();
        Self {
            name,
            origin,
            fields,
            index,
        }
    }

    /// Declared name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Declaring module path, if any.
    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    /// Fields in layout order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Get field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    /// Get field index by name.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Whether both types are the same declared record (same name and origin).
    ///
    /// Anonymous types are never the same declaration, even when their
    /// layouts are identical.
    pub fn same_declaration(&self, other: &RecordType) -> bool {
        match (&self.name, &self.origin, &other.name, &other.origin) {
            (Some(a), Some(ao), Some(b), Some(bo)) => a == b && ao == bo,
            _ => false,
        }
    }

    pub(crate) fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<anonymous>")
    }
}
