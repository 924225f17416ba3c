use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use pretty_assertions::assert_eq;
use reshape_types::TypeId;

use super::{ArtifactCache, CacheStats};
use crate::signature::{OpKind, Signature};

fn encode(ty: TypeId) -> Signature {
    Signature::new(OpKind::Encode, ty, TypeId::STRING, false)
}

#[test]
fn builds_once_then_hits() {
    let cache = ArtifactCache::new();
    let runs = AtomicUsize::new(0);
    let build = || {
        runs.fetch_add(1, Ordering::SeqCst);
        Ok::<_, ()>("artifact")
    };

    let first = cache.get_or_build(encode(TypeId::I32), build).unwrap();
    let second = cache.get_or_build(encode(TypeId::I32), build).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(runs.load(Ordering::SeqCst), 1);
    assert_eq!(
        cache.stats(),
        CacheStats {
            hits: 1,
            misses: 1,
            builds: 1,
            entries: 1,
        }
    );
}

#[test]
fn signatures_differ_by_flags() {
    let cache = ArtifactCache::new();
    let deep = Signature::new(OpKind::Copy, TypeId::OBJECT, TypeId::OBJECT, false);
    let shallow = Signature::new(OpKind::Copy, TypeId::OBJECT, TypeId::OBJECT, true);

    cache.get_or_build(deep, || Ok::<_, ()>(1)).unwrap();
    cache.get_or_build(shallow, || Ok::<_, ()>(2)).unwrap();
    assert_eq!(cache.len(), 2);
    assert_eq!(*cache.get(&shallow).unwrap(), 2);
}

#[test]
fn failures_are_not_cached() {
    let cache = ArtifactCache::new();

    let err = cache
        .get_or_build(encode(TypeId::I32), || Err::<u8, _>("broken"))
        .unwrap_err();
    assert_eq!(err, "broken");
    assert!(cache.is_empty());

    let ok = cache
        .get_or_build(encode(TypeId::I32), || Ok::<_, &str>(7))
        .unwrap();
    assert_eq!(*ok, 7);
    assert_eq!(cache.stats().misses, 2);
    assert_eq!(cache.stats().builds, 1);
}

#[test]
fn racing_builders_share_the_first_insert() {
    const THREADS: usize = 8;
    let cache = Arc::new(ArtifactCache::new());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let cache = Arc::clone(&cache);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                cache
                    .get_or_build(encode(TypeId::I64), || Ok::<_, ()>(i))
                    .unwrap()
            })
        })
        .collect();
    let results: Vec<Arc<usize>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let kept = cache.get(&encode(TypeId::I64)).unwrap();
    assert!(results.iter().all(|r| Arc::ptr_eq(r, &kept)));
    assert_eq!(cache.len(), 1);
}
