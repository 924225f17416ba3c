//! Type registry: the reflection facility generators query.
//!
//! Every type the engine can reason about has a `TypeDef` here: builtins at
//! fixed ids, records registered by the host program, and generic
//! instantiations (`List<T>`, `T[]`, `Dictionary<K, V>`) interned on first
//! use. Definitions are immutable once published, so lookups hand out
//! `Arc<TypeDef>` snapshots and never hold the lock across calls.

mod builtins;

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::{EvalResult, ScalarKind, TypeId, Value};

/// Native implementation of a method or constructor.
///
/// Instance methods receive the receiver as `args[0]`. `ret` is the
/// declared result type, for natives that allocate typed containers.
pub type NativeFn = fn(args: &[Value], ret: TypeId) -> EvalResult;

/// Broad category of a type definition.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Void,
    Scalar(ScalarKind),
    /// A scalar or null.
    Nullable(ScalarKind),
    String,
    /// Top type.
    Object,
    /// Record with public instance properties.
    Record,
    List,
    Array,
    Dictionary,
    /// Custom collection classified by its capability set.
    Collection,
    Host,
}

/// Structural capability a collection type advertises.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    Dictionary { key: TypeId, value: TypeId },
    Collection { element: TypeId },
    Enumerable { element: TypeId },
}

/// How values of a type are laid out at runtime.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Repr {
    Void,
    Scalar(ScalarKind),
    Nullable(ScalarKind),
    Str,
    Any,
    Record,
    Sequence,
    Map,
    Host,
}

/// Public instance property.
#[derive(Clone, Debug)]
pub struct PropertyDef {
    pub name: String,
    pub ty: TypeId,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Receiver {
    Instance,
    Static,
}

/// Method or constructor parameter.
#[derive(Clone, Debug)]
pub struct ParamDef {
    pub name: String,
    pub ty: TypeId,
    /// Value supplied when a caller omits this (trailing) parameter.
    pub default: Option<Value>,
}

impl ParamDef {
    pub fn new(name: &str, ty: TypeId) -> Self {
        ParamDef {
            name: name.to_owned(),
            ty,
            default: None,
        }
    }

    #[must_use]
    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }
}

#[derive(Clone, Debug)]
pub struct MethodDef {
    pub name: String,
    pub receiver: Receiver,
    /// Positional parameters, excluding the receiver.
    pub params: Vec<ParamDef>,
    pub ret: TypeId,
    pub imp: NativeFn,
}

#[derive(Clone, Debug)]
pub struct CtorDef {
    pub params: Vec<ParamDef>,
    pub imp: NativeFn,
}

/// Full definition of a type.
#[derive(Clone, Debug)]
pub struct TypeDef {
    pub id: TypeId,
    /// Display name. Not unique: two records may share a name.
    pub name: String,
    pub kind: TypeKind,
    /// Type arguments of a generic instantiation.
    pub generic_args: Vec<TypeId>,
    pub capabilities: Vec<Capability>,
    /// Public instance properties in declaration order.
    pub properties: Vec<PropertyDef>,
    pub methods: Vec<MethodDef>,
    /// Host constructor. Records and containers are allocated directly.
    pub ctor: Option<CtorDef>,
}

impl TypeDef {
    fn new(id: TypeId, name: impl Into<String>, kind: TypeKind) -> Self {
        TypeDef {
            id,
            name: name.into(),
            kind,
            generic_args: Vec::new(),
            capabilities: Vec::new(),
            properties: Vec::new(),
            methods: Vec::new(),
            ctor: None,
        }
    }

    /// Property slot index and definition by exact name.
    pub fn property(&self, name: &str) -> Option<(usize, &PropertyDef)> {
        self.properties
            .iter()
            .enumerate()
            .find(|(_, p)| p.name == name)
    }

    /// All overloads named `name`.
    pub fn methods_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MethodDef> {
        self.methods.iter().filter(move |m| m.name == name)
    }

    pub fn repr(&self) -> Repr {
        match self.kind {
            TypeKind::Void => Repr::Void,
            TypeKind::Scalar(kind) => Repr::Scalar(kind),
            TypeKind::Nullable(kind) => Repr::Nullable(kind),
            TypeKind::String => Repr::Str,
            TypeKind::Object => Repr::Any,
            TypeKind::Record => Repr::Record,
            TypeKind::List | TypeKind::Array => Repr::Sequence,
            TypeKind::Dictionary => Repr::Map,
            TypeKind::Collection => {
                if self
                    .capabilities
                    .iter()
                    .any(|c| matches!(c, Capability::Dictionary { .. }))
                {
                    Repr::Map
                } else {
                    Repr::Sequence
                }
            }
            TypeKind::Host => Repr::Host,
        }
    }

    /// Whether values of this type are shared references (and may be null).
    pub fn is_reference(&self) -> bool {
        !matches!(self.repr(), Repr::Scalar(_) | Repr::Void)
    }
}

/// Key for interned generic instantiations.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum GenericKey {
    List(TypeId),
    Array(TypeId),
    Dictionary(TypeId, TypeId),
}

#[derive(Default)]
struct RegistryInner {
    types: Vec<Arc<TypeDef>>,
    by_name: FxHashMap<String, TypeId>,
    generics: FxHashMap<GenericKey, TypeId>,
    /// Records registered for Rust types, keyed by the Rust type.
    reflected: FxHashMap<std::any::TypeId, TypeId>,
}

impl RegistryInner {
    #[expect(clippy::cast_possible_truncation, reason = "type count fits in u32")]
    fn next_id(&self) -> TypeId {
        TypeId::new(self.types.len() as u32)
    }

    fn publish(&mut self, def: TypeDef) -> TypeId {
        let id = def.id;
        self.by_name.insert(def.name.clone(), id);
        if id.index() == self.types.len() {
            self.types.push(Arc::new(def));
        } else {
            self.types[id.index()] = Arc::new(def);
        }
        id
    }
}

/// Thread-safe type registry.
pub struct TypeRegistry {
    inner: RwLock<RegistryInner>,
}

impl TypeRegistry {
    /// Create a registry with all builtin types at their fixed ids.
    pub fn new() -> Self {
        let mut inner = RegistryInner::default();
        for def in builtins::builtin_types() {
            debug_assert_eq!(def.id, inner.next_id(), "builtin {} out of order", def.name);
            inner.publish(def);
        }
        TypeRegistry {
            inner: RwLock::new(inner),
        }
    }

    /// Definition of `ty`, if registered.
    pub fn get(&self, ty: TypeId) -> Option<Arc<TypeDef>> {
        self.inner.read().types.get(ty.index()).cloned()
    }

    /// Most recently registered type with display name `name`.
    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        self.inner.read().by_name.get(name).copied()
    }

    /// Display name of `ty`, or its numeric form if unknown.
    pub fn name(&self, ty: TypeId) -> String {
        self.inner
            .read()
            .types
            .get(ty.index())
            .map_or_else(|| ty.to_string(), |def| def.name.clone())
    }

    pub fn len(&self) -> usize {
        self.inner.read().types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Start a record definition. The id is reserved immediately, so
    /// properties may refer to the record itself.
    pub fn record(&self, name: &str) -> RecordBuilder<'_> {
        let mut inner = self.inner.write();
        let id = inner.next_id();
        inner.publish(TypeDef::new(id, name, TypeKind::Record));
        RecordBuilder {
            registry: self,
            def: TypeDef::new(id, name, TypeKind::Record),
        }
    }

    /// Record bound to the Rust type `key`, if one was registered.
    pub fn reflected(&self, key: std::any::TypeId) -> Option<TypeId> {
        self.inner.read().reflected.get(&key).copied()
    }

    /// Start a record definition bound to the Rust type `key`. Display
    /// names may repeat across Rust types; the binding keeps them apart.
    pub fn reflected_record(&self, key: std::any::TypeId, name: &str) -> RecordBuilder<'_> {
        let builder = self.record(name);
        self.inner.write().reflected.insert(key, builder.id());
        builder
    }

    /// Start a custom collection definition, classified by the capabilities
    /// given to the builder.
    pub fn collection(&self, name: &str) -> CollectionBuilder<'_> {
        let mut inner = self.inner.write();
        let id = inner.next_id();
        inner.publish(TypeDef::new(id, name, TypeKind::Collection));
        CollectionBuilder {
            registry: self,
            def: TypeDef::new(id, name, TypeKind::Collection),
        }
    }

    /// `List<element>`.
    pub fn list_of(&self, element: TypeId) -> TypeId {
        self.intern_generic(GenericKey::List(element), || {
            let name = format!("List<{}>", self.name(element));
            let mut def = TypeDef::new(TypeId::VOID, name, TypeKind::List);
            def.generic_args = vec![element];
            def.capabilities = vec![
                Capability::Collection { element },
                Capability::Enumerable { element },
            ];
            def.methods = builtins::sequence_methods(element);
            def
        })
    }

    /// `element[]`.
    pub fn array_of(&self, element: TypeId) -> TypeId {
        self.intern_generic(GenericKey::Array(element), || {
            let name = format!("{}[]", self.name(element));
            let mut def = TypeDef::new(TypeId::VOID, name, TypeKind::Array);
            def.generic_args = vec![element];
            def.capabilities = vec![
                Capability::Collection { element },
                Capability::Enumerable { element },
            ];
            def.methods = builtins::sequence_methods(element);
            def
        })
    }

    /// `Dictionary<key, value>`.
    pub fn dictionary_of(&self, key: TypeId, value: TypeId) -> TypeId {
        let keys = self.list_of(key);
        self.intern_generic(GenericKey::Dictionary(key, value), || {
            let name = format!("Dictionary<{}, {}>", self.name(key), self.name(value));
            let mut def = TypeDef::new(TypeId::VOID, name, TypeKind::Dictionary);
            def.generic_args = vec![key, value];
            def.capabilities = vec![Capability::Dictionary { key, value }];
            def.methods = builtins::dictionary_methods(key, value, keys);
            def
        })
    }

    /// Intern a generic instantiation. `make` runs outside the lock and
    /// may consult the registry; its `id` field is overwritten.
    fn intern_generic(&self, key: GenericKey, make: impl FnOnce() -> TypeDef) -> TypeId {
        if let Some(&id) = self.inner.read().generics.get(&key) {
            return id;
        }
        let mut def = make();
        let mut inner = self.inner.write();
        // Another thread may have won while the lock was released.
        if let Some(&id) = inner.generics.get(&key) {
            return id;
        }
        def.id = inner.next_id();
        let id = inner.publish(def);
        inner.generics.insert(key, id);
        tracing::trace!(?id, "interned generic instantiation");
        id
    }

    fn complete(&self, def: TypeDef) -> TypeId {
        self.inner.write().publish(def)
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.len())
            .finish_non_exhaustive()
    }
}

/// Builder for a record definition. Dropping it without `finish` leaves
/// an empty record at the reserved id.
#[must_use]
pub struct RecordBuilder<'r> {
    registry: &'r TypeRegistry,
    def: TypeDef,
}

impl RecordBuilder<'_> {
    /// The reserved id, for self-referential properties.
    pub fn id(&self) -> TypeId {
        self.def.id
    }

    pub fn property(mut self, name: &str, ty: TypeId) -> Self {
        self.def.properties.push(PropertyDef {
            name: name.to_owned(),
            ty,
        });
        self
    }

    pub fn finish(self) -> TypeId {
        self.registry.complete(self.def)
    }
}

/// Builder for a custom collection type.
#[must_use]
pub struct CollectionBuilder<'r> {
    registry: &'r TypeRegistry,
    def: TypeDef,
}

impl CollectionBuilder<'_> {
    pub fn id(&self) -> TypeId {
        self.def.id
    }

    pub fn generic_args(mut self, args: &[TypeId]) -> Self {
        self.def.generic_args = args.to_vec();
        self
    }

    pub fn capability(mut self, capability: Capability) -> Self {
        self.def.capabilities.push(capability);
        self
    }

    /// Publish the collection. Container methods follow the first
    /// dictionary capability, else the first element capability.
    pub fn finish(mut self) -> TypeId {
        let caps = &self.def.capabilities;
        let dict = caps.iter().find_map(|c| match *c {
            Capability::Dictionary { key, value } => Some((key, value)),
            _ => None,
        });
        let element = caps.iter().find_map(|c| match *c {
            Capability::Collection { element } | Capability::Enumerable { element } => {
                Some(element)
            }
            Capability::Dictionary { .. } => None,
        });
        self.def.methods = match (dict, element) {
            (Some((key, value)), _) => {
                let keys = self.registry.list_of(key);
                builtins::dictionary_methods(key, value, keys)
            }
            (None, Some(element)) => builtins::sequence_methods(element),
            (None, None) => Vec::new(),
        };
        self.registry.complete(self.def)
    }
}

/// Registry shared between an engine and the artifacts it compiles.
#[derive(Clone, Debug, Default)]
pub struct SharedRegistry(Arc<TypeRegistry>);

impl SharedRegistry {
    pub fn new(registry: TypeRegistry) -> Self {
        SharedRegistry(Arc::new(registry))
    }
}

impl std::ops::Deref for SharedRegistry {
    type Target = TypeRegistry;

    fn deref(&self) -> &TypeRegistry {
        &self.0
    }
}
