//! Everything that can go wrong while turning a type description into a template.
//!
//! Leaf variants describe the root cause; the wrapping variants (`Tag`, `Field`,
//! `MapKey`, `MapValue`, `Element`) record where in the type graph it happened and
//! keep the cause as their `source`, so `{:#}` on an `anyhow::Error` prints the
//! whole path from the top-level symptom down to the offending annotation.
use std::num::ParseIntError;

use thiserror::Error;

use crate::ir::Kind;

#[derive(Debug, Error)]
pub enum TemplateError {
    // ---- annotation syntax ----
    #[error("failed to parse flags tag {tag:?} entry #{index}: undefined flag {flag:?}")]
    UnknownFlag {
        tag: String,
        index: usize,
        flag: String,
    },

    #[error("the enum tag should contain 2 comma-separated fields, got {tag:?}")]
    EnumArity { tag: String },

    #[error("failed to parse enum index {index:?} from enum tag {tag:?}")]
    EnumIndex {
        index: String,
        tag: String,
        #[source]
        source: ParseIntError,
    },

    // ---- binding resolution ----
    #[error("failed to get enum field {field:?} from enum tag {tag:?}")]
    EnumFieldNotFound { field: String, tag: String },

    #[error("failed to get enum {field:?} from enum tag {tag:?}: type {ty} provides no enum strings")]
    EnumCapabilityMissing {
        field: String,
        tag: String,
        ty: String,
    },

    // ---- range ----
    #[error("failed to get enum {field:?} from enum tag {tag:?}: index {index} out of range [0, {max}]")]
    EnumIndexOutOfRange {
        field: String,
        tag: String,
        index: i64,
        max: i64,
    },

    // ---- unsupported types / shapes ----
    #[error("the type ({kind}) is not supported")]
    UnsupportedKind { kind: Kind },

    #[error("the object ({ty}) is not a struct type")]
    NotAStruct { ty: String },

    // ---- context ----
    #[error("failed to parse tags for field {field:?}")]
    Tag {
        field: String,
        #[source]
        source: Box<TemplateError>,
    },

    #[error("the object ({ty}) field #{index} {field:?} could not be rendered")]
    Field {
        ty: String,
        index: usize,
        field: String,
        #[source]
        source: Box<TemplateError>,
    },

    #[error("failed to render map key type ({kind})")]
    MapKey {
        kind: Kind,
        #[source]
        source: Box<TemplateError>,
    },

    #[error("failed to render map value type ({kind})")]
    MapValue {
        kind: Kind,
        #[source]
        source: Box<TemplateError>,
    },

    #[error("failed to render sequence element type ({kind})")]
    Element {
        kind: Kind,
        #[source]
        source: Box<TemplateError>,
    },
}

impl TemplateError {
    /// The innermost error of a context chain.
    pub fn root_cause(&self) -> &TemplateError {
        match self {
            Self::Tag { source, .. }
            | Self::Field { source, .. }
            | Self::MapKey { source, .. }
            | Self::MapValue { source, .. }
            | Self::Element { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
