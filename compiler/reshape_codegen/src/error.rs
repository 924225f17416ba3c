//! Generation errors.

use reshape_ir::BuildError;
use reshape_shape::ShapeError;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GenError {
    #[error(transparent)]
    Shape(#[from] ShapeError),

    #[error(transparent)]
    Build(#[from] BuildError),

    /// JSON dictionaries need string keys.
    #[error("cannot read or write dictionary {dictionary} as JSON: key type {key} is not String")]
    UnsupportedKeyType { dictionary: String, key: String },

    /// The shapes of a requested mapping have nothing in common.
    #[error("cannot map {from} onto {to}")]
    ShapeMismatch { from: String, to: String },

    /// Nesting deeper than the configured limit, usually a
    /// self-referential type.
    #[error("generation for {ty} exceeded the maximum nesting depth of {max_depth}")]
    DepthExceeded { ty: String, max_depth: usize },
}
