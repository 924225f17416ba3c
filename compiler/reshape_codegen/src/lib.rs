//! Shape-driven generators.
//!
//! Each generator walks the shapes of its input and output types and emits
//! one IR [`Function`](reshape_ir::Function) through a [`reshape_ir::Builder`]:
//!
//! - [`mapper`]: object-to-object mapping by property name
//! - [`copier`]: shallow and deep copies
//! - [`projector`]: record to an ordered `[Name] -> text` dictionary
//! - [`json_encoder`] / [`json_decoder`]: JSON text in and out
//! - [`list_mapper`], [`list_copier`], [`list_projector`]: the element-wise
//!   list forms of the above
//!
//! Nested types are inlined into the enclosing function, bounded by the
//! depth limit of the [`GenCx`].

mod context;
mod copy;
mod error;
mod json;
mod list;
mod map;
mod project;

pub use context::GenCx;
pub use copy::copier;
pub use error::GenError;
pub use json::{json_decoder, json_encoder};
pub use list::{list_copier, list_mapper, list_projector};
pub use map::mapper;
pub use project::{projection_type, projector};

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests use unwrap for brevity")]
mod tests;
