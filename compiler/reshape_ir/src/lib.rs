//! Expression IR for reshape generators.
//!
//! Generators describe an operation (map, copy, encode, decode) as a tree of
//! typed expressions built through [`Builder`]. A finished [`Function`] is
//! handed to the lowering backend and then discarded.
//!
//! Every node's result type is fixed when the node is built; operator and
//! member errors surface as [`BuildError`] at build time.

mod arena;
mod builder;
mod error;
mod expr;
mod function;
mod ids;
mod ops;
mod print;

pub use arena::ExprArena;
pub use builder::{Builder, Var};
pub use error::BuildError;
pub use expr::{Alloc, ExprKind, FieldInit, LocalDecl, MethodRef};
pub use function::Function;
pub use ids::{ExprId, ExprRange, LabelId, LocalId, LoopLabels};
pub use ops::{BinaryOp, StepOp, UnaryOp};
