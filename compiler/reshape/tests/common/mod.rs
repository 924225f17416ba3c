//! Shared fixtures for the engine tests.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use reshape::{reflect_record, Engine, EngineConfig, ObjectRef, SharedRegistry, TypeId, TypeRegistry, Value};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Address {
    pub city: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Person {
    pub name: Option<String>,
    pub age: i32,
    pub home: Option<Address>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PersonDto {
    pub name: Option<String>,
}

reflect_record! {
    Address as "Address" { city: String => "City" }
}

reflect_record! {
    Person as "Person" {
        name: Option<String> => "Name",
        age: i32 => "Age",
        home: Option<Address> => "Home",
    }
}

reflect_record! {
    PersonDto as "PersonDto" { name: Option<String> => "Name" }
}

pub fn ann() -> Person {
    Person {
        name: Some("Ann".to_owned()),
        age: 30,
        home: Some(Address {
            city: "NYC".to_owned(),
        }),
    }
}

/// Untyped `Person`/`Address` registrations on a fresh engine.
pub struct Untyped {
    pub engine: Engine,
    pub person: TypeId,
    pub address: TypeId,
}

impl Untyped {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let reg = TypeRegistry::new();
        let address = reg.record("Address").property("City", TypeId::STRING).finish();
        let person = reg
            .record("Person")
            .property("Name", TypeId::STRING)
            .property("Age", TypeId::I32)
            .property("Home", address)
            .finish();
        Untyped {
            engine: Engine::with_config(SharedRegistry::new(reg), config),
            person,
            address,
        }
    }

    pub fn person(&self, name: &str, age: i32, city: Option<&str>) -> Value {
        let home = city.map_or(Value::Null, |c| {
            Value::Object(ObjectRef::new(self.address, vec![Value::string(c)]))
        });
        Value::Object(ObjectRef::new(
            self.person,
            vec![Value::string(name), Value::I32(age), home],
        ))
    }
}

pub fn typed_engine() -> Engine {
    Engine::new(SharedRegistry::default())
}
