//! Generator tests: build, lower and run each generated function.

mod copy;
mod json;
mod list;
mod project;

use reshape_ir::Function;
use reshape_lower::{lower, CompiledFn};
use reshape_shape::ShapeResolver;
use reshape_types::{ListRef, ObjectRef, SharedRegistry, TypeId, TypeRegistry, Value};

use crate::{GenCx, GenError};

const MAX_DEPTH: usize = 16;

/// `Person { Name, Age, Home: Address { City } }` plus a `PersonDto { Name }`.
pub(super) struct Fixture {
    resolver: ShapeResolver,
    pub person: TypeId,
    pub address: TypeId,
    pub dto: TypeId,
}

impl Fixture {
    pub fn new() -> Self {
        let reg = TypeRegistry::new();
        let address = reg.record("Address").property("City", TypeId::STRING).finish();
        let person = reg
            .record("Person")
            .property("Name", TypeId::STRING)
            .property("Age", TypeId::I32)
            .property("Home", address)
            .finish();
        let dto = reg.record("PersonDto").property("Name", TypeId::STRING).finish();
        Fixture {
            resolver: ShapeResolver::new(SharedRegistry::new(reg)),
            person,
            address,
            dto,
        }
    }

    pub fn registry(&self) -> &TypeRegistry {
        self.resolver.registry()
    }

    pub fn cx(&self) -> GenCx<'_> {
        GenCx::new(&self.resolver, MAX_DEPTH)
    }

    pub fn address_of(&self, city: &str) -> Value {
        Value::Object(ObjectRef::new(self.address, vec![Value::string(city)]))
    }

    pub fn person_of(&self, name: &str, age: i32, home: Value) -> Value {
        Value::Object(ObjectRef::new(
            self.person,
            vec![Value::string(name), Value::I32(age), home],
        ))
    }

    pub fn ann(&self) -> Value {
        self.person_of("Ann", 30, self.address_of("NYC"))
    }

    pub fn list(&self, element: TypeId, items: Vec<Value>) -> Value {
        Value::List(ListRef::new(self.registry().list_of(element), items))
    }
}

pub(super) fn compile(function: Result<Function, GenError>) -> CompiledFn {
    lower(&function.unwrap()).unwrap()
}

/// A record with a property of its own type.
pub(super) fn linked_node(reg: &TypeRegistry) -> TypeId {
    let node = reg.record("Node");
    let id = node.id();
    node.property("Value", TypeId::I32)
        .property("Next", id)
        .finish()
}

pub(super) fn field(value: &Value, index: usize) -> Value {
    value.as_object().unwrap().field(index).unwrap()
}
