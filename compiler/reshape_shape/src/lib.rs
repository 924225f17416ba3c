//! Shape resolution for reshape.
//!
//! A `Shape` is the structural view generators work from: scalar, string,
//! list, array, dictionary, or record with ordered properties. Shapes refer
//! to nested types by id, so classifying a self-referential record never
//! recurses; generators resolve nested shapes on demand.

mod resolver;
mod shape;

pub use resolver::{ShapeError, ShapeResolver};
pub use shape::{PropertyShape, Shape, ShapeKind};
