// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema builder: assemble a record type from named fields at runtime.

use std::collections::HashMap;
use std::sync::Arc;

use crate::dynamic_struct::DynamicStruct;
use crate::error::{DynStructError, Result};
use crate::record::{Record, RecordRef};
use crate::type_descriptor::{FieldDescriptor, Kind, RecordType};

/// Editable configuration of one field in a [`SchemaBuilder`].
#[derive(Debug, Clone, PartialEq)]
pub struct FieldConfig {
    kind: Kind,
    metadata: String,
}

impl FieldConfig {
    /// Replace the field kind.
    pub fn set_kind(&mut self, kind: impl Into<Kind>) -> &mut Self {
        self.kind = kind.into();
        self
    }

    /// Replace the metadata string.
    pub fn set_metadata(&mut self, metadata: impl Into<String>) -> &mut Self {
        self.metadata = metadata.into();
        self
    }

    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    pub fn metadata(&self) -> &str {
        &self.metadata
    }
}

/// Mutable set of field definitions, frozen into a [`DynamicStruct`] by
/// [`SchemaBuilder::build`].
///
/// Fields are keyed by name; adding a name twice overwrites the earlier
/// definition. Insertion order is not retained.
///
/// # Example
///
/// ```rust
/// use hdds_dynstruct::{Kind, SchemaBuilder};
///
/// let mut builder = SchemaBuilder::new();
/// builder
///     .add_field("Id", Kind::U32, "json:\"id\"")
///     .add_field("Name", Kind::String, "")
///     .add_field("Score", Kind::optional(Kind::F64), "");
///
/// let shape = builder.build();
/// let instance = shape.new_instance();
/// assert!(instance.get("Score").is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    fields: HashMap<String, FieldConfig>,
}

impl SchemaBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder seeded with every field of `record`.
    pub fn extend(record: &dyn Record) -> Self {
        let mut builder = Self::new();
        builder.absorb(record, false);
        builder
    }

    /// Builder seeded with the fields of all `records`; later records win
    /// on name collision.
    pub fn merge(records: &[&dyn Record]) -> Self {
        let mut builder = Self::new();
        for record in records {
            builder.absorb(*record, false);
        }
        builder
    }

    /// Like [`SchemaBuilder::merge`], but only assignable fields are taken and
    /// every source must be handed over as [`RecordRef::Mutable`].
    pub fn merge_settable(records: Vec<RecordRef<'_>>) -> Result<Self> {
        if let Some(pos) = records.iter().position(|r| !r.is_mutable()) {
            return Err(DynStructError::InvalidArgument(format!(
                "source #{} must be a mutable record handle",
                pos
            )));
        }
        let mut builder = Self::new();
        for record in &records {
            builder.absorb(record.as_record(), true);
        }
        Ok(builder)
    }

    fn absorb(&mut self, record: &dyn Record, settable_only: bool) {
        let record_type = record.record_type();
        let mut taken = 0usize;
        for field in record_type.fields() {
            if settable_only && !field.settable {
                log::trace!("merge: skipping unassignable field '{}'", field.name);
                continue;
            }
            self.add_field(&field.name, field.kind.clone(), field.metadata.clone());
            taken += 1;
        }
        log::debug!(
            "merged {} field(s) from record {}",
            taken,
            record_type.display_name()
        );
    }

    /// Insert or overwrite a field.
    ///
    /// Empty names are ignored.
    ///
    /// `kind` is the type witness: a [`Kind`], or a sample such as
    /// `&DynamicStruct`/`&DynamicRecord` for a nested record field.
    pub fn add_field(
        &mut self,
        name: impl Into<String>,
        kind: impl Into<Kind>,
        metadata: impl Into<String>,
    ) -> &mut Self {
        let name = name.into();
        if name.is_empty() {
            log::warn!("add_field: ignoring field with an empty name");
            return self;
        }
        self.fields.insert(
            name,
            FieldConfig {
                kind: kind.into(),
                metadata: metadata.into(),
            },
        );
        self
    }

    /// Remove a field; no-op if absent.
    pub fn remove_field(&mut self, name: &str) -> &mut Self {
        self.fields.remove(name);
        self
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Editable handle on a field, or `None` if the name is unknown.
    pub fn get_field(&mut self, name: &str) -> Option<&mut FieldConfig> {
        self.fields.get_mut(name)
    }

    /// Field names, sorted.
    pub fn field_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.fields.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Freeze the current field set into a new, independent type.
    ///
    /// The builder is left untouched and can be built again.
    pub fn build(&self) -> DynamicStruct {
        let mut fields: Vec<FieldDescriptor> = self
            .fields
            .iter()
            .map(|(name, cfg)| {
                FieldDescriptor::new(name.clone(), cfg.kind.clone(), cfg.metadata.clone())
            })
            .collect();
        // Layout follows names, so equal field sets build equal types.
        fields.sort_by(|a, b| a.name.cmp(&b.name));
        log::debug!("built record type with {} field(s)", fields.len());
        DynamicStruct::from_record_type(Arc::new(RecordType::anonymous(fields)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::DynamicRecord;

    #[test]
    fn test_add_overwrites() {
        let mut b = SchemaBuilder::new();
        b.add_field("A", Kind::I32, "first").add_field("A", Kind::String, "second");
        assert_eq!(b.len(), 1);
        let cfg = b.get_field("A").expect("field A");
        assert_eq!(cfg.kind(), &Kind::String);
        assert_eq!(cfg.metadata(), "second");
    }

    #[test]
    fn test_remove_and_has() {
        let mut b = SchemaBuilder::new();
        b.add_field("A", Kind::I32, "").add_field("B", Kind::Bool, "");
        b.remove_field("A").remove_field("Missing");
        assert!(!b.has_field("A"));
        assert!(b.has_field("B"));
        assert_eq!(b.field_names(), vec!["B"]);
    }

    #[test]
    fn test_get_field_edit() {
        let mut b = SchemaBuilder::new();
        b.add_field("A", Kind::I32, "");
        b.get_field("A")
            .expect("field A")
            .set_kind(Kind::optional(Kind::I64))
            .set_metadata("json:\"a\"");
        assert!(b.get_field("Nope").is_none());

        let ty = b.build();
        let field = ty.record_type().field("A").expect("built field");
        assert_eq!(field.kind, Kind::optional(Kind::I64));
        assert_eq!(field.metadata, "json:\"a\"");
    }

    #[test]
    fn test_build_is_order_independent() {
        let mut a = SchemaBuilder::new();
        a.add_field("X", Kind::I32, "").add_field("Y", Kind::String, "m");
        let mut b = SchemaBuilder::new();
        b.add_field("Y", Kind::String, "m").add_field("X", Kind::I32, "");
        assert_eq!(**a.build().record_type(), **b.build().record_type());
    }

    #[test]
    fn test_nested_witness() {
        let mut inner = SchemaBuilder::new();
        inner.add_field("V", Kind::U8, "");
        let inner = inner.build();

        let mut outer = SchemaBuilder::new();
        outer
            .add_field("Inner", &inner, "")
            .add_field("Sample", &inner.new_instance(), "");
        let outer = outer.build();
        let rt = outer.record_type();
        assert!(rt.field("Inner").and_then(|f| f.kind.as_record()).is_some());
        assert_eq!(rt.field("Inner").map(|f| &f.kind), rt.field("Sample").map(|f| &f.kind));
    }

    #[test]
    fn test_merge_settable_requires_mutable() {
        let ty = Arc::new(RecordType::anonymous(vec![
            FieldDescriptor::new("Open", Kind::I32, ""),
            FieldDescriptor::new("Closed", Kind::I32, "").with_settable(false),
        ]));
        let a = DynamicRecord::new(ty.clone());
        let mut b = DynamicRecord::new(ty);

        let err = SchemaBuilder::merge_settable(vec![RecordRef::Shared(&a)]).unwrap_err();
        assert!(matches!(err, DynStructError::InvalidArgument(_)));

        let merged = SchemaBuilder::merge_settable(vec![RecordRef::Mutable(&mut b)])
            .expect("mutable handles accepted");
        assert_eq!(merged.field_names(), vec!["Open"]);
    }

    #[test]
    fn test_empty_name_is_ignored() {
        let mut b = SchemaBuilder::new();
        b.add_field("", Kind::I32, "").add_field("Kept", Kind::I32, "");
        assert!(!b.has_field(""));
        assert_eq!(b.len(), 1);
        let ty = b.build();
        assert!(!ty.record_type().has_field(""));
        assert_eq!(ty.record_type().len(), 1);
    }
}
