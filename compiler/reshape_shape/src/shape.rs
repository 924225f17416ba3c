//! Shape data.

use std::fmt;

use reshape_types::{ScalarKind, TypeId};

/// Structural classification of a type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShapeKind {
    Scalar(ScalarKind),
    /// A scalar or null.
    Nullable(ScalarKind),
    String,
    List { element: TypeId },
    Array { element: TypeId },
    Dictionary { key: TypeId, value: TypeId },
    /// Record with public instance properties in declaration order.
    Object { properties: Vec<PropertyShape> },
}

/// One declared property of an object shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyShape {
    pub name: String,
    pub ty: TypeId,
    /// Field slot in the record.
    pub index: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Shape {
    pub ty: TypeId,
    /// Display name of `ty`.
    pub name: String,
    pub kind: ShapeKind,
}

impl Shape {
    /// Scalars, nullable scalars and strings: values written and read as
    /// a single literal.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(
            self.kind,
            ShapeKind::Scalar(_) | ShapeKind::Nullable(_) | ShapeKind::String
        )
    }

    #[inline]
    pub fn is_object(&self) -> bool {
        matches!(self.kind, ShapeKind::Object { .. })
    }

    /// Whether values of this shape are references that may be null.
    #[inline]
    pub fn is_nullable(&self) -> bool {
        !matches!(self.kind, ShapeKind::Scalar(_))
    }

    pub fn scalar(&self) -> Option<ScalarKind> {
        match self.kind {
            ShapeKind::Scalar(kind) => Some(kind),
            _ => None,
        }
    }

    /// Element type of a list or array shape.
    pub fn element(&self) -> Option<TypeId> {
        match self.kind {
            ShapeKind::List { element } | ShapeKind::Array { element } => Some(element),
            _ => None,
        }
    }

    /// Declared properties; empty for non-object shapes.
    pub fn properties(&self) -> &[PropertyShape] {
        match &self.kind {
            ShapeKind::Object { properties } => properties,
            _ => &[],
        }
    }

    pub fn property(&self, name: &str) -> Option<&PropertyShape> {
        self.properties().iter().find(|p| p.name == name)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ShapeKind::Scalar(kind) => write!(f, "scalar {}", kind.name()),
            ShapeKind::Nullable(kind) => write!(f, "nullable scalar {}", kind.name()),
            ShapeKind::String => write!(f, "string"),
            ShapeKind::List { element } => write!(f, "list of {element}"),
            ShapeKind::Array { element } => write!(f, "array of {element}"),
            ShapeKind::Dictionary { key, value } => write!(f, "dictionary {key} -> {value}"),
            ShapeKind::Object { properties } => {
                write!(f, "object {} {{", self.name)?;
                for (i, p) in properties.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, " {}: {}", p.name, p.ty)?;
                }
                write!(f, " }}")
            }
        }
    }
}
