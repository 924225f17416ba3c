//! Lowering backend for reshape IR.
//!
//! [`lower`] walks a finished [`reshape_ir::Function`] once and produces a
//! [`CompiledFn`]: a tree of boxed closures over a per-call frame. Lowering
//! is pure; the same IR always yields an equivalent function and nothing
//! outside the returned value is touched.

mod compiled;
pub mod convert;
mod error;
mod lower;
mod operators;

pub use compiled::CompiledFn;
pub use error::LowerError;
pub use lower::lower;
