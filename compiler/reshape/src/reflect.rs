//! Typed access to the engine through the [`Reflect`] trait.
//!
//! A `Reflect` type knows how to describe itself to a [`TypeRegistry`] and
//! how to cross into and out of [`Value`]. The engine resolves each Rust
//! type to its registry id once and reuses it for every later call.

use chrono::NaiveDateTime;
use reshape_types::{ListRef, ObjectRef, RecordBuilder, ScalarKind, TypeId, TypeRegistry, Value};

use crate::engine::Engine;
use crate::error::{unexpected, Error, Result};

pub trait Reflect: Sized + 'static {
    /// Registry id of this type, registering it on first use.
    fn register(registry: &TypeRegistry) -> TypeId;

    /// Registry id of `Option<Self>`. References are already nullable;
    /// scalars have a distinct nullable type.
    fn register_nullable(registry: &TypeRegistry) -> TypeId {
        Self::register(registry)
    }

    fn to_value(&self, registry: &TypeRegistry) -> Value;

    fn from_value(value: Value) -> Result<Self>;
}

macro_rules! reflect_scalar {
    ($($ty:ty => $id:ident, $variant:ident;)*) => {$(
        impl Reflect for $ty {
            #[inline]
            fn register(_: &TypeRegistry) -> TypeId {
                TypeId::$id
            }

            #[inline]
            fn register_nullable(_: &TypeRegistry) -> TypeId {
                ScalarKind::$variant.nullable_type_id()
            }

            #[inline]
            fn to_value(&self, _: &TypeRegistry) -> Value {
                Value::$variant(*self)
            }

            fn from_value(value: Value) -> Result<Self> {
                match value {
                    Value::$variant(v) => Ok(v),
                    other => Err(unexpected(stringify!($ty), &other)),
                }
            }
        }
    )*};
}

reflect_scalar! {
    bool => BOOL, Bool;
    char => CHAR, Char;
    i8 => I8, I8;
    i16 => I16, I16;
    i32 => I32, I32;
    i64 => I64, I64;
    u8 => U8, U8;
    u16 => U16, U16;
    u32 => U32, U32;
    u64 => U64, U64;
    f32 => F32, F32;
    f64 => F64, F64;
    NaiveDateTime => DATETIME, DateTime;
}

impl Reflect for String {
    fn register(_: &TypeRegistry) -> TypeId {
        TypeId::STRING
    }

    fn to_value(&self, _: &TypeRegistry) -> Value {
        Value::string(self)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Str(s) => Ok(s.to_string()),
            other => Err(unexpected("String", &other)),
        }
    }
}

/// `None` is null: the null reference of a reference type, or the null of
/// a nullable scalar.
impl<T: Reflect> Reflect for Option<T> {
    fn register(registry: &TypeRegistry) -> TypeId {
        T::register_nullable(registry)
    }

    fn to_value(&self, registry: &TypeRegistry) -> Value {
        self.as_ref().map_or(Value::Null, |v| v.to_value(registry))
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: Reflect> Reflect for Box<T> {
    fn register(registry: &TypeRegistry) -> TypeId {
        T::register(registry)
    }

    fn register_nullable(registry: &TypeRegistry) -> TypeId {
        T::register_nullable(registry)
    }

    fn to_value(&self, registry: &TypeRegistry) -> Value {
        (**self).to_value(registry)
    }

    fn from_value(value: Value) -> Result<Self> {
        T::from_value(value).map(Box::new)
    }
}

/// `Vec<T>` is `List<T>`.
impl<T: Reflect> Reflect for Vec<T> {
    fn register(registry: &TypeRegistry) -> TypeId {
        registry.list_of(T::register(registry))
    }

    fn to_value(&self, registry: &TypeRegistry) -> Value {
        let items = self.iter().map(|item| item.to_value(registry)).collect();
        Value::List(ListRef::new(Self::register(registry), items))
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::List(list) => list.items().into_iter().map(T::from_value).collect(),
            other => Err(unexpected("List", &other)),
        }
    }
}

/// Implement [`Reflect`] for a plain struct whose fields are all
/// `Reflect`. Properties are registered in the order listed.
///
/// ```ignore
/// reflect_record! {
///     Address as "Address" { city: String => "City" }
/// }
/// ```
#[macro_export]
macro_rules! reflect_record {
    ($ty:ident as $name:literal { $($field:ident: $fty:ty => $prop:literal),* $(,)? }) => {
        impl $crate::Reflect for $ty {
            fn register(registry: &$crate::TypeRegistry) -> $crate::TypeId {
                $crate::reflect::record_type::<Self>(registry, $name, |record| {
                    record$(.property($prop, <$fty as $crate::Reflect>::register(registry)))*
                })
            }

            fn to_value(&self, registry: &$crate::TypeRegistry) -> $crate::Value {
                $crate::reflect::record_value(
                    <Self as $crate::Reflect>::register(registry),
                    vec![$($crate::Reflect::to_value(&self.$field, registry)),*],
                )
            }

            fn from_value(value: $crate::Value) -> $crate::Result<Self> {
                #[allow(unused_mut, unused_variables, reason = "records without fields")]
                let mut fields = $crate::reflect::record_fields(value, $name)?.into_iter();
                Ok($ty {
                    $($field: $crate::reflect::next_field(&mut fields, $prop)?,)*
                })
            }
        }
    };
}

/// The record bound to `T`, registering it as `name` through `properties`
/// on first use. The binding exists while `properties` runs, so a record
/// may refer to itself. Distinct Rust types never share a record, even
/// under the same name.
#[doc(hidden)]
pub fn record_type<'r, T: 'static>(
    registry: &'r TypeRegistry,
    name: &str,
    properties: impl FnOnce(RecordBuilder<'r>) -> RecordBuilder<'r>,
) -> TypeId {
    let key = std::any::TypeId::of::<T>();
    if let Some(ty) = registry.reflected(key) {
        return ty;
    }
    let ty = properties(registry.reflected_record(key, name)).finish();
    tracing::debug!(%ty, name, "registered reflected record");
    ty
}

#[doc(hidden)]
pub fn record_value(ty: TypeId, fields: Vec<Value>) -> Value {
    Value::Object(ObjectRef::new(ty, fields))
}

#[doc(hidden)]
pub fn record_fields(value: Value, name: &str) -> Result<Vec<Value>> {
    match value {
        Value::Object(object) => Ok(object.fields()),
        other => Err(unexpected(name, &other)),
    }
}

#[doc(hidden)]
pub fn next_field<T: Reflect>(fields: &mut impl Iterator<Item = Value>, name: &str) -> Result<T> {
    let value = fields.next().ok_or_else(|| Error::UnexpectedValue {
        expected: format!("property {name}"),
        found: "nothing".to_owned(),
    })?;
    T::from_value(value)
}

impl Engine {
    /// Registry id of `T`, resolved once per engine.
    pub fn type_of<T: Reflect>(&self) -> TypeId {
        let key = std::any::TypeId::of::<T>();
        if let Some(ty) = self.reflected.get(&key) {
            return *ty;
        }
        // Registration publishes records before their properties are set;
        // serialize it so no build observes a half-registered record.
        let _guard = self.reflect_lock.lock();
        if let Some(ty) = self.reflected.get(&key) {
            return *ty;
        }
        let ty = T::register(self.registry());
        self.reflected.insert(key, ty);
        ty
    }

    fn value_of<T: Reflect>(&self, value: &T) -> Value {
        value.to_value(self.registry())
    }

    /// Typed [`map`](Engine::map).
    pub fn map_as<S: Reflect, D: Reflect>(&self, source: &S, shallow: bool) -> Result<D> {
        let (from, to) = (self.type_of::<S>(), self.type_of::<D>());
        let mapped = self.map(self.value_of(source), from, to, shallow)?;
        D::from_value(mapped)
    }

    /// Typed [`copy`](Engine::copy).
    pub fn copy_of<T: Reflect>(&self, value: &T, shallow: bool) -> Result<T> {
        let ty = self.type_of::<T>();
        T::from_value(self.copy(self.value_of(value), ty, shallow)?)
    }

    /// Typed [`to_json`](Engine::to_json).
    pub fn to_json_of<T: Reflect>(&self, value: &T) -> Result<String> {
        let ty = self.type_of::<T>();
        self.to_json(self.value_of(value), ty)
    }

    /// Typed [`from_json`](Engine::from_json).
    pub fn from_json_as<T: Reflect>(&self, json: &str) -> Result<T> {
        let ty = self.type_of::<T>();
        T::from_value(self.from_json(json, ty)?)
    }

    /// Typed [`to_string_map`](Engine::to_string_map).
    pub fn to_string_map_of<T: Reflect>(&self, value: &T) -> Result<Vec<(String, Option<String>)>> {
        let ty = self.type_of::<T>();
        self.to_string_map(self.value_of(value), ty)
    }
}
