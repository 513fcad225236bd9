//! Error types shared across the AST crate.

/// Failure to map between an enumeration and its textual form.
///
/// Raised by the enum helpers; the reflection analyzer downgrades these
/// to reports, the converter treats them as hard errors.
#[derive(Debug, Clone, thiserror::Error)]
#[error("failed to map {from} to {to}: '{value}'")]
pub struct MapError {
    /// Source kind (e.g. `"string"`).
    pub from: &'static str,
    /// Destination kind (e.g. `"BinaryOp"`).
    pub to: &'static str,
    /// The value that failed to map.
    pub value: String,
}

impl MapError {
    pub fn new(from: &'static str, to: &'static str, value: impl Into<String>) -> Self {
        Self {
            from,
            to,
            value: value.into(),
        }
    }
}

/// Errors raised by the type-denoter algebra.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TypeError {
    /// A swizzle or matrix selector does not apply to the subscripted type.
    #[error("invalid subscript '{subscript}' for type {ty}")]
    InvalidSubscript { subscript: String, ty: String },

    /// A swizzle is longer than four components or names an unknown component.
    #[error("invalid vector component '{component}' in subscript '{subscript}'")]
    InvalidComponent { subscript: String, component: char },

    /// A matrix selector indexes outside the matrix dimensions.
    #[error("matrix subscript '{subscript}' out of range for {rows}x{cols} matrix")]
    SubscriptOutOfRange {
        subscript: String,
        rows: u32,
        cols: u32,
    },
}
