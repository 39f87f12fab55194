// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types shared by the builder, readers and the structural mapper.

use thiserror::Error;

use crate::mapper::ConfigError;

/// Errors produced by dynamic record operations.
#[derive(Debug, Error)]
pub enum DynStructError {
    /// An argument had the wrong shape (e.g. a destination that is not a record).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Two fields share a name but neither hold the same kind nor convert.
    #[error("Field \"{field}\" is not convertible: {source_kind} -> {destination_kind}")]
    IncompatibleField {
        field: String,
        source_kind: String,
        destination_kind: String,
    },

    /// A typed accessor was used against a field of a different family.
    #[error("Type assertion failed on field \"{field}\": expected {expected}, found {actual}")]
    TypeAssertion {
        field: String,
        expected: String,
        actual: String,
    },

    /// A value does not conform to the kind of the field it is assigned to.
    #[error("Type mismatch on field \"{field}\": expected {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: String,
        actual: String,
    },

    /// The record has no field with this name.
    #[error("Field not found: {0}")]
    UnknownField(String),

    /// The field exists but cannot be assigned through the record interface.
    #[error("Field is not assignable: {0}")]
    UnassignableField(String),

    /// Nested records went deeper than the configured limit.
    #[error("Record nesting exceeds configured depth limit of {limit}")]
    DepthExceeded { limit: usize },

    /// Generic round-trip serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Mapper configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, DynStructError>;
