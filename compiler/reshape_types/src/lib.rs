//! Runtime type registry and dynamic values for reshape.
//!
//! This is the reflection facility the rest of the workspace is built on:
//! - `TypeRegistry` describes every type (records, collections, builtins)
//!   with its properties, methods and capabilities
//! - `Value` is what compiled artifacts consume and produce
//! - host objects (`TextBuffer`, `JsonReader`) back the JSON generators

mod errors;
pub mod host;
mod registry;
mod scalar;
mod type_id;
mod value;

pub use errors::{
    invalid_conversion, json_error, null_reference, type_mismatch, EvalError, EvalResult,
};
pub use registry::{
    Capability, CollectionBuilder, CtorDef, MethodDef, NativeFn, ParamDef, PropertyDef,
    Receiver, RecordBuilder, Repr, SharedRegistry, TypeDef, TypeKind, TypeRegistry,
};
pub use scalar::ScalarKind;
pub use type_id::TypeId;
pub use value::{
    integer_value, parse_datetime, parse_scalar, HostRef, ListRef, MapRef, ObjectRef, Value,
    DATETIME_FORMAT,
};
