//! State shared by every generator in one build.

use std::cell::Cell;
use std::sync::Arc;

use reshape_shape::{Shape, ShapeResolver};
use reshape_types::{TypeId, TypeRegistry};

use crate::error::GenError;

/// Generation context: shape lookups plus the nesting-depth guard.
///
/// One context serves one build on one thread. It is shared (`&GenCx`)
/// across the nested closures a generator hands to the builder, so the
/// depth counter lives in a `Cell`.
pub struct GenCx<'a> {
    resolver: &'a ShapeResolver,
    max_depth: usize,
    depth: Cell<usize>,
}

impl<'a> GenCx<'a> {
    pub fn new(resolver: &'a ShapeResolver, max_depth: usize) -> Self {
        GenCx {
            resolver,
            max_depth,
            depth: Cell::new(0),
        }
    }

    #[inline]
    pub fn registry(&self) -> &'a TypeRegistry {
        self.resolver.registry()
    }

    pub fn shape(&self, ty: TypeId) -> Result<Arc<Shape>, GenError> {
        Ok(self.resolver.classify(ty)?)
    }

    /// Current nesting depth; 0 at the top-level value.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth.get()
    }

    /// Run `f` one nesting level below the current one, for the nested
    /// value of type `ty`.
    pub fn nested<T>(
        &self,
        ty: TypeId,
        f: impl FnOnce() -> Result<T, GenError>,
    ) -> Result<T, GenError> {
        let depth = self.depth.get() + 1;
        if depth > self.max_depth {
            return Err(GenError::DepthExceeded {
                ty: self.registry().name(ty),
                max_depth: self.max_depth,
            });
        }
        self.depth.set(depth);
        let result = f();
        self.depth.set(depth - 1);
        result
    }
}
