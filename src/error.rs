//! Typed failures surfaced while loading view payloads.

use thiserror::Error;

/// A payload that does not match the declared shape of its view type.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// The payload is not a JSON object or has no string `type` field
    #[error("payload has no type tag")]
    MissingType,

    /// The `type` tag names no known view
    #[error("unknown view type `{type_tag}`")]
    UnknownType { type_tag: String },

    /// The `type` tag is known but the fields do not match it
    #[error("malformed `{type_tag}` payload: {reason}")]
    Malformed { type_tag: String, reason: String },

    /// Fields parse but violate a cross-field constraint
    #[error("inconsistent `{type_tag}` payload: {reason}")]
    Inconsistent { type_tag: String, reason: String },
}

impl ValidationError {
    pub fn type_tag(&self) -> &str {
        match self {
            Self::MissingType => "",
            Self::UnknownType { type_tag }
            | Self::Malformed { type_tag, .. }
            | Self::Inconsistent { type_tag, .. } => type_tag,
        }
    }
}
