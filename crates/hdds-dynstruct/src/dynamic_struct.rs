// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Frozen record types and the containers they produce.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use crate::error::{DynStructError, Result};
use crate::reader::RecordReader;
use crate::record::DynamicRecord;
use crate::type_descriptor::{Kind, RecordType};

/// Immutable record type produced by [`crate::SchemaBuilder::build`].
///
/// Cheap to clone and safe to share between threads; every instance it
/// creates owns its own storage.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicStruct {
    record_type: Arc<RecordType>,
}

impl DynamicStruct {
    pub(crate) fn from_record_type(record_type: Arc<RecordType>) -> Self {
        Self { record_type }
    }

    /// Frozen layout.
    pub fn record_type(&self) -> &Arc<RecordType> {
        &self.record_type
    }

    /// Zero-valued instance.
    pub fn new_instance(&self) -> DynamicRecord {
        DynamicRecord::new(self.record_type.clone())
    }

    /// Empty sequence of instances.
    pub fn new_sequence(&self) -> InstanceSlice {
        InstanceSlice {
            record_type: self.record_type.clone(),
            items: Vec::new(),
        }
    }

    /// Empty map of instances keyed by `K`.
    pub fn new_map<K: Eq + Hash>(&self) -> InstanceMap<K> {
        InstanceMap {
            record_type: self.record_type.clone(),
            items: HashMap::new(),
        }
    }
}

impl From<&DynamicStruct> for Kind {
    fn from(ty: &DynamicStruct) -> Self {
        Kind::Record(ty.record_type.clone())
    }
}

fn check_shape(expected: &Arc<RecordType>, record: &DynamicRecord) -> Result<()> {
    if Arc::ptr_eq(expected, record.record_type()) || **expected == **record.record_type() {
        Ok(())
    } else {
        Err(DynStructError::InvalidArgument(
            "record does not match the element type".to_string(),
        ))
    }
}

/// Growable sequence whose elements all share one record type.
#[derive(Debug, Clone)]
pub struct InstanceSlice {
    record_type: Arc<RecordType>,
    items: Vec<DynamicRecord>,
}

impl InstanceSlice {
    pub fn record_type(&self) -> &Arc<RecordType> {
        &self.record_type
    }

    /// Append a zero-valued element and return it for population.
    pub fn push_new(&mut self) -> &mut DynamicRecord {
        let idx = self.items.len();
        self.items.push(DynamicRecord::new(self.record_type.clone()));
        &mut self.items[idx]
    }

    /// Append an existing instance of the element type.
    pub fn push(&mut self, record: DynamicRecord) -> Result<()> {
        check_shape(&self.record_type, &record)?;
        self.items.push(record);
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&DynamicRecord> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut DynamicRecord> {
        self.items.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DynamicRecord> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// One reader per element, in order.
    pub fn readers(&self) -> Vec<RecordReader<'_>> {
        self.items.iter().map(|r| RecordReader::new(r)).collect()
    }

    pub fn into_vec(self) -> Vec<DynamicRecord> {
        self.items
    }
}

/// Map from `K` to instances of one record type.
#[derive(Debug, Clone)]
pub struct InstanceMap<K> {
    record_type: Arc<RecordType>,
    items: HashMap<K, DynamicRecord>,
}

impl<K: Eq + Hash> InstanceMap<K> {
    pub fn record_type(&self) -> &Arc<RecordType> {
        &self.record_type
    }

    /// Insert a zero-valued instance under `key`, replacing any previous
    /// entry, and return it for population.
    pub fn insert_new(&mut self, key: K) -> &mut DynamicRecord {
        let record = DynamicRecord::new(self.record_type.clone());
        match self.items.entry(key) {
            std::collections::hash_map::Entry::Occupied(mut e) => {
                e.insert(record);
                e.into_mut()
            }
            std::collections::hash_map::Entry::Vacant(e) => e.insert(record),
        }
    }

    /// Insert an existing instance, returning the replaced one.
    pub fn insert(&mut self, key: K, record: DynamicRecord) -> Result<Option<DynamicRecord>> {
        check_shape(&self.record_type, &record)?;
        Ok(self.items.insert(key, record))
    }

    pub fn get(&self, key: &K) -> Option<&DynamicRecord> {
        self.items.get(key)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut DynamicRecord> {
        self.items.get_mut(key)
    }

    pub fn remove(&mut self, key: &K) -> Option<DynamicRecord> {
        self.items.remove(key)
    }

    pub fn iter(&self) -> std::collections::hash_map::Iter<'_, K, DynamicRecord> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// One reader per entry.
    pub fn readers(&self) -> HashMap<&K, RecordReader<'_>> {
        self.items
            .iter()
            .map(|(k, r)| (k, RecordReader::new(r)))
            .collect()
    }
}
