//! Concurrent first use of one signature.

#![expect(clippy::unwrap_used, reason = "tests use unwrap for brevity")]

mod common;

use std::sync::Arc;

use common::{ann, typed_engine, Person, Untyped};
use pretty_assertions::assert_eq;
use rayon::prelude::*;
use reshape::{OpKind, Signature, TypeId};

#[test]
fn racing_callers_agree_on_one_artifact() {
    let fx = Untyped::new();
    let sig = Signature::new(OpKind::Encode, fx.person, TypeId::STRING, false);

    let artifacts: Vec<_> = (0..64)
        .into_par_iter()
        .map(|_| fx.engine.artifact(sig).unwrap())
        .collect();

    let kept = fx.engine.artifact(sig).unwrap();
    assert!(artifacts.iter().all(|a| Arc::ptr_eq(a, &kept)));
    let stats = fx.engine.cache_stats();
    assert_eq!(stats.entries, 1);
    assert!(stats.builds >= 1);
    assert_eq!(stats.hits + stats.misses, 65);
}

#[test]
fn parallel_calls_produce_identical_results() {
    let engine = typed_engine();

    let outputs: Vec<String> = (0..64)
        .into_par_iter()
        .map(|i| {
            let mut person = ann();
            person.age = i;
            engine.to_json_of(&person).unwrap()
        })
        .collect();

    for (i, json) in outputs.iter().enumerate() {
        let back: Person = engine.from_json_as(json).unwrap();
        assert_eq!(usize::try_from(back.age).unwrap(), i);
    }
}
