//! Memoizing shape resolver.

use std::sync::Arc;

use dashmap::DashMap;
use reshape_types::{Capability, SharedRegistry, TypeDef, TypeId, TypeKind};
use thiserror::Error;

use crate::shape::{PropertyShape, Shape, ShapeKind};

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("type {0} is not registered")]
    UnknownType(TypeId),

    #[error("ambiguous shape for {ty}: {reason}")]
    Ambiguous { ty: String, reason: String },

    #[error("cannot classify {ty}: {reason}")]
    Unclassifiable { ty: String, reason: &'static str },
}

/// Classifies types into shapes and memoizes the result per type.
///
/// Shapes are immutable once computed and live as long as the resolver.
/// Failed classifications are not memoized.
#[derive(Debug)]
pub struct ShapeResolver {
    registry: SharedRegistry,
    memo: DashMap<TypeId, Arc<Shape>>,
}

impl ShapeResolver {
    pub fn new(registry: SharedRegistry) -> Self {
        ShapeResolver {
            registry,
            memo: DashMap::new(),
        }
    }

    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    /// Shape of `ty`, computed on first request.
    pub fn classify(&self, ty: TypeId) -> Result<Arc<Shape>, ShapeError> {
        if let Some(shape) = self.memo.get(&ty) {
            return Ok(Arc::clone(shape.value()));
        }
        let def = self.registry.get(ty).ok_or(ShapeError::UnknownType(ty))?;
        let shape = Arc::new(Shape {
            ty,
            name: def.name.clone(),
            kind: classify_def(&def)?,
        });
        tracing::debug!(%ty, shape = %shape, "classified");
        // A racing thread may have inserted first; keep its shape.
        Ok(Arc::clone(self.memo.entry(ty).or_insert(shape).value()))
    }

    /// Number of memoized shapes.
    pub fn len(&self) -> usize {
        self.memo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memo.is_empty()
    }
}

fn unclassifiable(def: &TypeDef, reason: &'static str) -> ShapeError {
    ShapeError::Unclassifiable {
        ty: def.name.clone(),
        reason,
    }
}

/// Classification order: dictionary capability, then single-argument
/// collection capability, then general enumerable.
fn classify_def(def: &TypeDef) -> Result<ShapeKind, ShapeError> {
    match def.kind {
        TypeKind::Scalar(kind) => return Ok(ShapeKind::Scalar(kind)),
        TypeKind::Nullable(kind) => return Ok(ShapeKind::Nullable(kind)),
        TypeKind::String => return Ok(ShapeKind::String),
        TypeKind::Record => {
            let properties = def
                .properties
                .iter()
                .enumerate()
                .map(|(index, p)| PropertyShape {
                    name: p.name.clone(),
                    ty: p.ty,
                    index,
                })
                .collect();
            return Ok(ShapeKind::Object { properties });
        }
        TypeKind::Void => return Err(unclassifiable(def, "void has no values")),
        TypeKind::Object => return Err(unclassifiable(def, "the top type has no structure")),
        TypeKind::Host => return Err(unclassifiable(def, "host objects have no structure")),
        TypeKind::List | TypeKind::Array | TypeKind::Dictionary | TypeKind::Collection => {}
    }

    let mut dictionaries = Vec::new();
    let mut collections = Vec::new();
    let mut enumerables = Vec::new();
    for cap in &def.capabilities {
        match *cap {
            Capability::Dictionary { key, value } => push_distinct(&mut dictionaries, (key, value)),
            Capability::Collection { element } => push_distinct(&mut collections, element),
            Capability::Enumerable { element } => push_distinct(&mut enumerables, element),
        }
    }

    match dictionaries.as_slice() {
        [(key, value)] => {
            return Ok(ShapeKind::Dictionary {
                key: *key,
                value: *value,
            })
        }
        [] => {}
        many => {
            return Err(ShapeError::Ambiguous {
                ty: def.name.clone(),
                reason: format!("{} distinct dictionary capabilities", many.len()),
            })
        }
    }

    if def.generic_args.len() > 1 {
        return Err(unclassifiable(
            def,
            "multi-argument generic collection without a dictionary capability",
        ));
    }

    match collections.as_slice() {
        [element] if def.kind == TypeKind::Array => {
            return Ok(ShapeKind::Array { element: *element })
        }
        [element] => return Ok(ShapeKind::List { element: *element }),
        [] => {}
        many => {
            return Err(ShapeError::Ambiguous {
                ty: def.name.clone(),
                reason: format!("{} distinct collection element types", many.len()),
            })
        }
    }

    match enumerables.as_slice() {
        // Enumerable-only types are read-only sequences.
        [element] => Ok(ShapeKind::Array { element: *element }),
        [] => Err(unclassifiable(def, "collection advertises no capabilities")),
        many => Err(ShapeError::Ambiguous {
            ty: def.name.clone(),
            reason: format!("{} distinct enumerable element types", many.len()),
        }),
    }
}

fn push_distinct<T: PartialEq>(items: &mut Vec<T>, item: T) {
    if !items.contains(&item) {
        items.push(item);
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests use unwrap for brevity")]
mod tests;
