// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Generic round trip through `serde_json`.
//!
//! Records become JSON objects keyed by field name, timestamps become
//! RFC 3339 strings and absent optionals become `null`. Decoding is guided by
//! the target [`Kind`]; JSON keys without a matching field are ignored and a
//! `null` aimed at a non-optional field leaves that field alone.
//!
//! JSON has no NaN or infinity, so encoding a non-finite float fails with
//! `InvalidArgument` naming the field instead of emitting `null`.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::DateTime;
use serde_json::Value as Json;

use crate::error::{DynStructError, Result};
use crate::field_type::with_field_name;
use crate::record::{DynamicRecord, Record};
use crate::type_descriptor::{Kind, RecordType};
use crate::value::Value;

/// Encode a value as JSON.
pub fn to_json(value: &Value) -> Result<Json> {
    reject_non_finite("value", value)?;
    Ok(serde_json::to_value(value)?)
}

/// Encode a field value as JSON; errors name the field.
pub(crate) fn field_to_json(name: &str, value: &Value) -> Result<Json> {
    reject_non_finite(name, value)?;
    Ok(serde_json::to_value(value)?)
}

/// Encode any record as a JSON object.
pub fn record_to_json(record: &dyn Record) -> Result<Json> {
    let snapshot = DynamicRecord::snapshot(record);
    for (name, value) in snapshot.fields() {
        reject_non_finite(name, value)?;
    }
    Ok(serde_json::to_value(snapshot)?)
}

fn reject_non_finite(path: &str, value: &Value) -> Result<()> {
    let finite = match value {
        Value::F32(v) => v.is_finite(),
        Value::F64(v) => v.is_finite(),
        Value::Sequence(items) => {
            return items.iter().try_for_each(|item| reject_non_finite(path, item));
        }
        Value::Map(entries) => {
            return entries
                .iter()
                .try_for_each(|(key, item)| reject_non_finite(&format!("{}[{}]", path, key), item));
        }
        Value::Record(nested) => {
            return nested
                .fields()
                .try_for_each(|(name, item)| reject_non_finite(&format!("{}.{}", path, name), item));
        }
        Value::Optional(Some(inner)) => return reject_non_finite(path, inner),
        _ => true,
    };
    if finite {
        Ok(())
    } else {
        Err(DynStructError::InvalidArgument(format!(
            "field \"{}\" holds a non-finite float, which JSON cannot represent",
            path
        )))
    }
}

/// Decode JSON into a value of `kind`.
pub fn from_json(kind: &Kind, json: &Json) -> Result<Value> {
    let value = match kind {
        Kind::Bool => json.as_bool().map(Value::Bool),
        Kind::I8 => json.as_i64().and_then(|n| i8::try_from(n).ok()).map(Value::I8),
        Kind::I16 => json.as_i64().and_then(|n| i16::try_from(n).ok()).map(Value::I16),
        Kind::I32 => json.as_i64().and_then(|n| i32::try_from(n).ok()).map(Value::I32),
        Kind::I64 => json.as_i64().map(Value::I64),
        Kind::U8 => json.as_u64().and_then(|n| u8::try_from(n).ok()).map(Value::U8),
        Kind::U16 => json.as_u64().and_then(|n| u16::try_from(n).ok()).map(Value::U16),
        Kind::U32 => json.as_u64().and_then(|n| u32::try_from(n).ok()).map(Value::U32),
        Kind::U64 => json.as_u64().map(Value::U64),
        Kind::F32 => json.as_f64().map(|n| Value::F32(n as f32)),
        Kind::F64 => json.as_f64().map(Value::F64),
        Kind::String => json.as_str().map(|s| Value::String(s.to_string())),
        Kind::Time => json
            .as_str()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(Value::Time),
        Kind::Sequence(elem) => match json.as_array() {
            Some(items) => Some(Value::Sequence(
                items
                    .iter()
                    .map(|item| from_json(elem, item))
                    .collect::<Result<Vec<_>>>()?,
            )),
            None => None,
        },
        Kind::Map(elem) => match json.as_object() {
            Some(entries) => Some(Value::Map(
                entries
                    .iter()
                    .map(|(k, v)| from_json(elem, v).map(|v| (k.clone(), v)))
                    .collect::<Result<BTreeMap<_, _>>>()?,
            )),
            None => None,
        },
        Kind::Record(ty) => match json {
            Json::Object(_) => Some(Value::Record(DynamicRecord::from_json(ty.clone(), json)?)),
            _ => None,
        },
        Kind::Optional(inner) => Some(match json {
            Json::Null => Value::none(),
            other => Value::Optional(Some(Box::new(from_json(inner, other)?))),
        }),
    };

    value.ok_or_else(|| DynStructError::TypeMismatch {
        field: String::new(),
        expected: kind.to_string(),
        actual: json_type_name(json).to_string(),
    })
}

/// Assign the members of a JSON object to matching, assignable fields of
/// `destination`.
pub fn assign_json(destination: &mut dyn Record, json: &Json) -> Result<()> {
    let Json::Object(members) = json else {
        return Err(DynStructError::InvalidArgument(format!(
            "expected a JSON object, found {}",
            json_type_name(json)
        )));
    };
    let record_type = destination.record_type();
    for field in record_type.fields() {
        if !field.settable {
            continue;
        }
        let Some(member) = members.get(&field.name) else {
            continue;
        };
        if member.is_null() && !field.kind.is_optional() {
            continue;
        }
        let value = from_json(&field.kind, member).map_err(|e| with_field_name(e, &field.name))?;
        destination.set_field(&field.name, value)?;
    }
    Ok(())
}

impl DynamicRecord {
    /// Decode a JSON object into a new instance of `record_type`.
    ///
    /// Unlike [`assign_json`], fields are filled regardless of assignability.
    pub fn from_json(record_type: Arc<RecordType>, json: &Json) -> Result<Self> {
        let Json::Object(members) = json else {
            return Err(DynStructError::InvalidArgument(format!(
                "expected a JSON object, found {}",
                json_type_name(json)
            )));
        };
        let mut record = DynamicRecord::new(record_type.clone());
        for field in record_type.fields() {
            match members.get(&field.name) {
                None => {}
                Some(member) if member.is_null() && !field.kind.is_optional() => {}
                Some(member) => {
                    let value = from_json(&field.kind, member)
                        .map_err(|e| with_field_name(e, &field.name))?;
                    record.set(&field.name, value)?;
                }
            }
        }
        Ok(record)
    }
}

fn json_type_name(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}
