//! Shared reference payloads for records, lists, dictionaries and host objects.
//!
//! Every reference value is an `Arc` around a `parking_lot` lock so compiled
//! artifacts can be invoked from any thread. Cloning a reference clones the
//! handle, never the payload: identity is observable through `ptr_eq`.

use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use super::Value;
use crate::errors::{EvalError, EvalResult};
use crate::host::HostObject;
use crate::TypeId;

/// Record instance: one slot per declared property, in declaration order.
pub struct ObjectData {
    ty: TypeId,
    fields: Vec<Value>,
}

#[derive(Clone)]
pub struct ObjectRef(Arc<RwLock<ObjectData>>);

impl ObjectRef {
    pub fn new(ty: TypeId, fields: Vec<Value>) -> Self {
        ObjectRef(Arc::new(RwLock::new(ObjectData { ty, fields })))
    }

    pub fn ty(&self) -> TypeId {
        self.0.read().ty
    }

    pub fn len(&self) -> usize {
        self.0.read().fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn field(&self, index: usize) -> EvalResult {
        let guard = self.0.read();
        guard
            .fields
            .get(index)
            .cloned()
            .ok_or(EvalError::NoSuchField {
                receiver: guard.ty.to_string(),
                index,
            })
    }

    pub fn set_field(&self, index: usize, value: Value) -> EvalResult<()> {
        let mut guard = self.0.write();
        let ty = guard.ty;
        match guard.fields.get_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(EvalError::NoSuchField {
                receiver: ty.to_string(),
                index,
            }),
        }
    }

    /// Snapshot of all field values.
    pub fn fields(&self) -> Vec<Value> {
        self.0.read().fields.clone()
    }

    #[inline]
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = self.0.read();
        f.debug_struct("Object")
            .field("ty", &guard.ty)
            .field("fields", &guard.fields)
            .finish()
    }
}

/// List or array payload.
pub struct ListData {
    ty: TypeId,
    items: Vec<Value>,
}

#[derive(Clone)]
pub struct ListRef(Arc<RwLock<ListData>>);

fn checked_index(index: i64, len: usize) -> EvalResult<usize> {
    usize::try_from(index)
        .ok()
        .filter(|&i| i < len)
        .ok_or(EvalError::IndexOutOfRange { index, len })
}

impl ListRef {
    pub fn new(ty: TypeId, items: Vec<Value>) -> Self {
        ListRef(Arc::new(RwLock::new(ListData { ty, items })))
    }

    pub fn ty(&self) -> TypeId {
        self.0.read().ty
    }

    pub fn len(&self) -> usize {
        self.0.read().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: i64) -> EvalResult {
        let guard = self.0.read();
        let i = checked_index(index, guard.items.len())?;
        Ok(guard.items[i].clone())
    }

    pub fn set(&self, index: i64, value: Value) -> EvalResult<()> {
        let mut guard = self.0.write();
        let i = checked_index(index, guard.items.len())?;
        guard.items[i] = value;
        Ok(())
    }

    pub fn push(&self, value: Value) {
        self.0.write().items.push(value);
    }

    pub fn remove_at(&self, index: i64) -> EvalResult<()> {
        let mut guard = self.0.write();
        let i = checked_index(index, guard.items.len())?;
        guard.items.remove(i);
        Ok(())
    }

    pub fn items(&self) -> Vec<Value> {
        self.0.read().items.clone()
    }

    #[inline]
    pub fn ptr_eq(&self, other: &ListRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ListRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = self.0.read();
        f.debug_struct("List")
            .field("ty", &guard.ty)
            .field("items", &guard.items)
            .finish()
    }
}

/// Dictionary payload. Entries keep insertion order; lookups are linear.
pub struct MapData {
    ty: TypeId,
    entries: Vec<(Value, Value)>,
}

#[derive(Clone)]
pub struct MapRef(Arc<RwLock<MapData>>);

impl MapRef {
    pub fn new(ty: TypeId) -> Self {
        MapRef(Arc::new(RwLock::new(MapData {
            ty,
            entries: Vec::new(),
        })))
    }

    pub fn ty(&self) -> TypeId {
        self.0.read().ty
    }

    pub fn len(&self) -> usize {
        self.0.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert or overwrite.
    pub fn insert(&self, key: Value, value: Value) {
        let mut guard = self.0.write();
        if let Some(entry) = guard.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            guard.entries.push((key, value));
        }
    }

    pub fn get(&self, key: &Value) -> EvalResult {
        self.0
            .read()
            .entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
            .ok_or_else(|| EvalError::KeyNotFound {
                key: key.to_text(),
            })
    }

    pub fn contains_key(&self, key: &Value) -> bool {
        self.0.read().entries.iter().any(|(k, _)| k == key)
    }

    pub fn keys(&self) -> Vec<Value> {
        self.0.read().entries.iter().map(|(k, _)| k.clone()).collect()
    }

    pub fn entries(&self) -> Vec<(Value, Value)> {
        self.0.read().entries.clone()
    }

    #[inline]
    pub fn ptr_eq(&self, other: &MapRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for MapRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = self.0.read();
        f.debug_struct("Map")
            .field("ty", &guard.ty)
            .field("entries", &guard.entries)
            .finish()
    }
}

/// Host object handle (text buffer, JSON reader).
#[derive(Clone)]
pub struct HostRef(Arc<Mutex<HostObject>>);

impl HostRef {
    pub fn new(object: HostObject) -> Self {
        HostRef(Arc::new(Mutex::new(object)))
    }

    /// Run `f` with exclusive access to the host object.
    pub fn with<R>(&self, f: impl FnOnce(&mut HostObject) -> R) -> R {
        f(&mut self.0.lock())
    }

    #[inline]
    pub fn ptr_eq(&self, other: &HostRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for HostRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Host({})", self.0.lock().kind_name())
    }
}
