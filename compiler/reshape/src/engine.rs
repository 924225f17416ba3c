//! The engine: signature lookup, artifact builds and invocation.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use reshape_codegen::{
    copier, json_decoder, json_encoder, list_copier, list_mapper, list_projector, mapper,
    projector, GenCx,
};
use reshape_ir::Function;
use reshape_lower::{lower, CompiledFn};
use reshape_shape::ShapeResolver;
use reshape_types::{SharedRegistry, TypeId, TypeRegistry, Value};
use rustc_hash::FxBuildHasher;

use crate::cache::{ArtifactCache, CacheStats};
use crate::config::EngineConfig;
use crate::error::{unexpected, Result};
use crate::signature::{OpKind, Signature};

/// Ordered `(key, value)` pairs of one projected record.
pub type StringMap = Vec<(String, Option<String>)>;

/// Builds, caches and runs reshape artifacts over one type registry.
///
/// Every operation is keyed by a [`Signature`]. The first call for a
/// signature generates and lowers its artifact; build errors surface there
/// and are not cached. Later calls go straight to the cached artifact, so
/// they fail only on bad runtime input.
///
/// `Engine` is `Send + Sync`; share it by reference or `Arc`.
pub struct Engine {
    registry: SharedRegistry,
    resolver: ShapeResolver,
    cache: ArtifactCache<CompiledFn>,
    config: EngineConfig,
    pub(crate) reflected: DashMap<std::any::TypeId, TypeId, FxBuildHasher>,
    pub(crate) reflect_lock: Mutex<()>,
}

impl Engine {
    pub fn new(registry: SharedRegistry) -> Self {
        Self::with_config(registry, EngineConfig::default())
    }

    pub fn with_config(registry: SharedRegistry, config: EngineConfig) -> Self {
        Engine {
            resolver: ShapeResolver::new(registry.clone()),
            registry,
            cache: ArtifactCache::new(),
            config,
            reflected: DashMap::with_hasher(FxBuildHasher),
            reflect_lock: Mutex::new(()),
        }
    }

    #[inline]
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Map `source` (a `from`) onto a new `to`.
    pub fn map(&self, source: Value, from: TypeId, to: TypeId, shallow: bool) -> Result<Value> {
        self.run(Signature::new(OpKind::Map, from, to, shallow), source)
    }

    /// Copy `source`; `shallow` shares nested references.
    pub fn copy(&self, source: Value, ty: TypeId, shallow: bool) -> Result<Value> {
        self.run(Signature::new(OpKind::Copy, ty, ty, shallow), source)
    }

    /// One `([Name], text)` entry per declared property of `ty`.
    pub fn to_string_map(&self, source: Value, ty: TypeId) -> Result<StringMap> {
        let target = self.projection_type();
        let projected = self.run(Signature::new(OpKind::Project, ty, target, false), source)?;
        string_map(projected)
    }

    pub fn to_json(&self, source: Value, ty: TypeId) -> Result<String> {
        let json = self.run(Signature::new(OpKind::Encode, ty, TypeId::STRING, false), source)?;
        text(json)
    }

    pub fn from_json(&self, json: &str, ty: TypeId) -> Result<Value> {
        self.run(
            Signature::new(OpKind::Decode, TypeId::STRING, ty, false),
            Value::string(json),
        )
    }

    /// Map every element of a `List<from>` into a new `List<to>`.
    pub fn map_list(&self, items: Value, from: TypeId, to: TypeId, shallow: bool) -> Result<Value> {
        self.run(Signature::new(OpKind::MapList, from, to, shallow), items)
    }

    /// New `List<ty>` holding copies of the elements of `items`, or the
    /// elements themselves when `shallow`.
    pub fn copy_list(&self, items: Value, ty: TypeId, shallow: bool) -> Result<Value> {
        self.run(Signature::new(OpKind::CopyList, ty, ty, shallow), items)
    }

    /// [`to_string_map`](Self::to_string_map) over a `List<ty>`. A null
    /// list yields no maps.
    pub fn to_string_map_list(&self, items: Value, ty: TypeId) -> Result<Vec<StringMap>> {
        let target = self.projection_type();
        let projected = self.run(Signature::new(OpKind::ProjectList, ty, target, false), items)?;
        match projected {
            Value::Null => Ok(Vec::new()),
            Value::List(list) => list.items().into_iter().map(string_map).collect(),
            other => Err(unexpected("List", &other)),
        }
    }

    fn projection_type(&self) -> TypeId {
        self.registry.dictionary_of(TypeId::STRING, TypeId::STRING)
    }

    fn run(&self, signature: Signature, input: Value) -> Result<Value> {
        let artifact = self.artifact(signature)?;
        Ok(artifact.call(input)?)
    }

    /// The compiled artifact for `signature`, built on first use.
    pub fn artifact(&self, signature: Signature) -> Result<Arc<CompiledFn>> {
        self.cache.get_or_build(signature, || self.build(signature))
    }

    #[tracing::instrument(level = "debug", skip_all, fields(%signature))]
    fn build(&self, signature: Signature) -> Result<CompiledFn> {
        let function = self.generate(signature)?;
        if self.config.dump_ir {
            tracing::info!(%signature, "generated IR:\n{function}");
        } else {
            tracing::trace!(%signature, "generated IR:\n{function}");
        }
        let compiled = lower(&function)?;
        tracing::debug!(nodes = compiled.node_count(), "built artifact");
        Ok(compiled)
    }

    fn generate(&self, signature: Signature) -> Result<Function> {
        let cx = GenCx::new(&self.resolver, self.config.max_depth);
        let Signature { source, target, .. } = signature;
        let shallow = signature.shallow();
        let function = match signature.kind {
            OpKind::Map => mapper(&cx, source, target, shallow)?,
            OpKind::Copy => copier(&cx, source, !shallow)?,
            OpKind::Project => projector(&cx, source)?,
            OpKind::Encode => json_encoder(&cx, source)?,
            OpKind::Decode => json_decoder(&cx, target)?,
            OpKind::MapList => list_mapper(&cx, source, target, shallow)?,
            OpKind::CopyList => list_copier(&cx, source, !shallow)?,
            OpKind::ProjectList => list_projector(&cx, source)?,
        };
        Ok(function)
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

fn text(value: Value) -> Result<String> {
    match value {
        Value::Str(s) => Ok(s.to_string()),
        other => Err(unexpected("String", &other)),
    }
}

fn string_map(value: Value) -> Result<StringMap> {
    let Value::Map(map) = value else {
        return Err(unexpected("Dictionary", &value));
    };
    map.entries()
        .into_iter()
        .map(|(key, value)| -> Result<(String, Option<String>)> {
            let value = match value {
                Value::Null => None,
                other => Some(text(other)?),
            };
            Ok((text(key)?, value))
        })
        .collect()
}
