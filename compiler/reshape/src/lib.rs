//! Reflection-driven object mapping, copying, projection and JSON.
//!
//! Types are described once in a [`TypeRegistry`]. For every requested
//! operation the [`Engine`] resolves the shapes involved, generates an
//! expression IR specialized to them, lowers it to a compiled artifact and
//! caches the artifact by [`Signature`]:
//!
//! ```text
//! TypeRegistry -> ShapeResolver -> codegen (IR) -> lower -> ArtifactCache
//! ```
//!
//! Untyped operations take and return [`Value`]s; the [`Reflect`] trait
//! adds typed wrappers (`map_as`, `copy_of`, `to_json_of`, `from_json_as`,
//! `to_string_map_of`).
//!
//! Set `RUST_LOG` and call [`init_tracing`] to see cache and build events.

mod cache;
mod config;
mod engine;
mod error;
pub mod reflect;
mod signature;

pub use cache::{ArtifactCache, CacheStats};
pub use config::{EngineConfig, DEFAULT_MAX_DEPTH};
pub use engine::{Engine, StringMap};
pub use error::{Error, Result};
pub use reflect::Reflect;
pub use signature::{OpFlags, OpKind, Signature};

pub use reshape_codegen::GenError;
pub use reshape_lower::{CompiledFn, LowerError};
pub use reshape_shape::ShapeError;
pub use reshape_types::{
    EvalError, ListRef, MapRef, ObjectRef, SharedRegistry, TypeId, TypeRegistry, Value,
};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Does nothing when `RUST_LOG` is unset; later calls are no-ops.
/// Enable with `RUST_LOG=reshape=debug` (builds and cache misses) or
/// `RUST_LOG=reshape=trace` (also cache hits and generated IR).
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
