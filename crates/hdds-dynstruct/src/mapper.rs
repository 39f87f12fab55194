// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Structural mapper: copy values between records of different shapes.
//!
//! The mapper walks the destination layout and, for every field the source
//! also has, copies the value across:
//!
//! 1. Skip when the source lacks the field or the destination field is not
//!    assignable.
//! 2. Compare the true kinds (one optional level stripped) of both sides.
//! 3. Two records of different declarations: recurse into a fresh zero value
//!    of the destination record.
//! 4. Identical kinds: copy.
//! 5. Numeric kinds: convert (truncating, see [`Value::convert_to`]).
//! 6. Anything else fails with `IncompatibleField`; earlier fields stay copied.
//!
//! An absent optional source never touches the destination. Present values
//! are wrapped or unwrapped to match the destination's optionality.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{DynStructError, Result};
use crate::record::{DynamicRecord, Record};
use crate::type_descriptor::Kind;
use crate::value::Value;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Mapper configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapperConfig {
    /// Maximum record nesting depth, top-level record included.
    /// `None` is unbounded.
    #[serde(default)]
    pub max_depth: Option<usize>,

    /// Convert between numeric kinds of different width or family.
    #[serde(default = "default_true")]
    pub allow_conversion: bool,
}

fn default_true() -> bool {
    true
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            allow_conversion: true,
        }
    }
}

impl MapperConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::result::Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> std::result::Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.max_depth == Some(0) {
            return Err(ConfigError::Invalid(
                "max_depth must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Copy `source` into `destination` with the default configuration.
pub fn copy_into(source: &dyn Record, destination: &mut dyn Record) -> Result<()> {
    Mapper::default().copy_into(source, destination)
}

/// Structural record mapper.
#[derive(Debug, Clone, Default)]
pub struct Mapper {
    config: MapperConfig,
}

impl Mapper {
    pub fn new(config: MapperConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    /// Copy every matching field of `source` into `destination`.
    pub fn copy_into(&self, source: &dyn Record, destination: &mut dyn Record) -> Result<()> {
        self.copy_record(source, destination, 1)
    }

    /// Copy between two record values.
    ///
    /// Fails with `InvalidArgument` unless both hold a present record.
    pub fn copy_value_into(&self, source: &Value, destination: &mut Value) -> Result<()> {
        let src = match source.present() {
            Some(Value::Record(rec)) => rec,
            _ => {
                return Err(DynStructError::InvalidArgument(format!(
                    "source must be a record, found {}",
                    source.kind_name()
                )))
            }
        };
        let kind_name = destination.kind_name();
        let dst = match destination {
            Value::Record(rec) => rec,
            Value::Optional(Some(inner)) => match &mut **inner {
                Value::Record(rec) => rec,
                _ => {
                    return Err(DynStructError::InvalidArgument(
                        "destination must be a record, found optional".to_string(),
                    ))
                }
            },
            _ => {
                return Err(DynStructError::InvalidArgument(format!(
                    "destination must be a record, found {}",
                    kind_name
                )))
            }
        };
        self.copy_into(src, dst)
    }

    fn copy_record(
        &self,
        source: &dyn Record,
        destination: &mut dyn Record,
        depth: usize,
    ) -> Result<()> {
        if let Some(limit) = self.config.max_depth {
            if depth > limit {
                return Err(DynStructError::DepthExceeded { limit });
            }
        }

        let source_type = source.record_type();
        let destination_type = destination.record_type();

        for field in destination_type.fields() {
            if !field.settable {
                log::trace!("skip '{}': destination field not assignable", field.name);
                continue;
            }
            let Some(source_field) = source_type.field(&field.name) else {
                log::trace!("skip '{}': not present on source", field.name);
                continue;
            };
            let Some(value) = source.field(&field.name) else {
                continue;
            };

            if let Some(projected) =
                self.project(&field.name, &source_field.kind, &value, &field.kind, depth)?
            {
                destination.set_field(&field.name, projected)?;
            }
        }
        Ok(())
    }

    /// Produce the value to assign into a destination field of `dst_kind`,
    /// or `None` to leave it untouched.
    fn project(
        &self,
        name: &str,
        src_kind: &Kind,
        value: &Value,
        dst_kind: &Kind,
        depth: usize,
    ) -> Result<Option<Value>> {
        let Some(present) = value.present() else {
            log::trace!("skip '{}': source optional is absent", name);
            return Ok(None);
        };
        let src_true = src_kind.strip_optional();
        let dst_true = dst_kind.strip_optional();

        let projected = match (src_true, dst_true) {
            (Kind::Record(src_ty), Kind::Record(dst_ty)) if !src_ty.same_declaration(dst_ty) => {
                let Value::Record(nested) = present else {
                    return Err(DynStructError::InvalidArgument(format!(
                        "field \"{}\" declared as record but holds {}",
                        name,
                        present.kind_name()
                    )));
                };
                let mut fresh = DynamicRecord::new(dst_ty.clone());
                self.copy_record(nested, &mut fresh, depth + 1)?;
                Value::Record(fresh)
            }
            _ if src_true == dst_true => present.clone(),
            _ if self.config.allow_conversion && src_true.convertible_to(dst_true) => {
                match present.convert_to(dst_true) {
                    Some(v) => v,
                    None => return Err(incompatible(name, src_kind, dst_kind)),
                }
            }
            _ => return Err(incompatible(name, src_kind, dst_kind)),
        };

        Ok(Some(normalize(projected, dst_kind.is_optional())))
    }
}

/// Wrap a present value to match the destination's optionality.
fn normalize(value: Value, dst_optional: bool) -> Value {
    if dst_optional {
        Value::Optional(Some(Box::new(value)))
    } else {
        value
    }
}

fn incompatible(name: &str, src_kind: &Kind, dst_kind: &Kind) -> DynStructError {
    log::debug!(
        "mapping failed on field '{}': {} -> {}",
        name,
        src_kind,
        dst_kind
    );
    DynStructError::IncompatibleField {
        field: name.to_string(),
        source_kind: src_kind.to_string(),
        destination_kind: dst_kind.to_string(),
    }
}
