//! Runtime side of a compiled material.
//!
//! A [`Material`] owns the generated shader source, the live uniform values the
//! application edits and the resolvers turning those values into GPU ready ones.

mod resolver;

pub use resolver::UniformResolver;

use crate::context::FabricContext;
use bon::Builder;
use fabric_shadergen::error::{Result, UnknownTypeErr};
use fabric_shadergen::{CompiledMaterial, MaterialCompiler, Record, Template, UniformValue};
use fabric_utils::FabricArgs;
use fabric_utils::tracing::debug;
use itertools::Itertools;
use parking_lot::RwLock;
use snafu::ensure;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct MaterialId(Uuid);

impl MaterialId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MaterialId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for MaterialId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Material({})", self.0.simple())
    }
}

/// The part of a material shared with its resolvers and the resource cache.
#[derive(Debug)]
pub struct MaterialShared {
    id: MaterialId,
    uniforms: RwLock<HashMap<String, UniformValue>>,
}

impl MaterialShared {
    pub(crate) fn new(uniforms: HashMap<String, UniformValue>) -> Self {
        Self {
            id: MaterialId::new(),
            uniforms: RwLock::new(uniforms),
        }
    }

    pub fn id(&self) -> MaterialId {
        self.id
    }

    pub fn uniform(&self, name: &str) -> Option<UniformValue> {
        self.uniforms.read().get(name).cloned()
    }

    pub fn set_uniform(&self, name: &str, value: UniformValue) -> Option<UniformValue> {
        self.uniforms.write().insert(name.to_string(), value)
    }

    pub(crate) fn update_record(&self, name: &str, update: impl FnOnce(&mut Record)) {
        if let Some(record) = self
            .uniforms
            .write()
            .get_mut(name)
            .and_then(UniformValue::as_record_mut)
        {
            update(record);
        }
    }

    fn take_uniforms(&self) -> Vec<UniformValue> {
        self.uniforms.write().drain().map(|(_, value)| value).collect()
    }
}

#[derive(Debug, Clone, Builder)]
pub struct MaterialDescriptor {
    #[builder(default)]
    fabric: Template,
    #[builder(default = FabricArgs::strict_by_default())]
    strict: bool,
}

/// A compiled material with live uniforms.
///
/// Dropping a material releases every texture and cube map it holds and drops
/// its sub-materials with it.
#[derive(Debug)]
pub struct Material {
    shared: Arc<MaterialShared>,
    fabric: FabricContext,
    kind: Option<String>,
    strict: bool,
    shader_source: String,
    entry_point: String,
    resolvers: Vec<(String, UniformResolver)>,
    materials: Vec<(String, Material)>,
}

impl Material {
    pub fn new(fabric: &FabricContext, descriptor: MaterialDescriptor) -> Result<Self> {
        let compiled =
            MaterialCompiler::compile(fabric.registry(), descriptor.fabric, descriptor.strict)?;

        if FabricArgs::get().dump_shaders {
            debug!(
                "[Fabric] Compiled {}:\n{}",
                compiled.kind.as_deref().unwrap_or("material"),
                compiled.shader_source
            );
        }

        Ok(Self::instantiate(fabric, compiled))
    }

    /// Builds a material of a registered type with its registered defaults.
    pub fn from_type(fabric: &FabricContext, kind: &str) -> Result<Self> {
        ensure!(fabric.registry().contains(kind), UnknownTypeErr { kind });
        Self::new(
            fabric,
            MaterialDescriptor::builder()
                .fabric(Template::new().with_type(kind))
                .build(),
        )
    }

    pub fn from_json(fabric: &FabricContext, json: &str) -> Result<Self> {
        let template = Template::from_json_str(json)?;
        Self::new(fabric, MaterialDescriptor::builder().fabric(template).build())
    }

    fn instantiate(fabric: &FabricContext, compiled: CompiledMaterial) -> Self {
        let shared = Arc::new(MaterialShared::new(compiled.uniforms.into_iter().collect()));

        let mut resolvers: Vec<(String, UniformResolver)> = compiled
            .bindings
            .into_iter()
            .map(|binding| {
                let resolver = UniformResolver::new(
                    shared.clone(),
                    binding.name,
                    binding.ty,
                    binding.dimensions,
                );
                (binding.renamed, resolver)
            })
            .collect();

        let materials: Vec<(String, Material)> = compiled
            .materials
            .into_iter()
            .map(|(name, child)| (name, Self::instantiate(fabric, child)))
            .collect();

        for (_, child) in &materials {
            resolvers.extend(child.resolvers.iter().cloned());
        }

        Self {
            shared,
            fabric: fabric.clone(),
            kind: compiled.kind,
            strict: compiled.strict,
            shader_source: compiled.shader_source,
            entry_point: compiled.entry_point,
            resolvers,
            materials,
        }
    }

    pub fn id(&self) -> MaterialId {
        self.shared.id()
    }

    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn shader_source(&self) -> &str {
        &self.shader_source
    }

    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    /// Current live value of a uniform, as last set or resolved.
    pub fn uniform(&self, name: &str) -> Option<UniformValue> {
        self.shared.uniform(name)
    }

    /// Replaces a live value. Its type is checked the next time it is resolved.
    pub fn set_uniform(&self, name: &str, value: impl Into<UniformValue>) -> Option<UniformValue> {
        self.shared.set_uniform(name, value.into())
    }

    pub fn uniform_names(&self) -> Vec<String> {
        self.shared.uniforms.read().keys().cloned().sorted().collect()
    }

    pub fn material(&self, name: &str) -> Option<&Material> {
        self.materials
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, material)| material)
    }

    pub fn materials(&self) -> impl Iterator<Item = (&str, &Material)> {
        self.materials
            .iter()
            .map(|(name, material)| (name.as_str(), material))
    }

    /// Identifiers used in the shader text, including the sub-materials' ones.
    pub fn renamed_uniforms(&self) -> impl Iterator<Item = &str> {
        self.resolvers.iter().map(|(renamed, _)| renamed.as_str())
    }

    pub fn resolver(&self, renamed: &str) -> Option<&UniformResolver> {
        self.resolvers
            .iter()
            .find(|(key, _)| key == renamed)
            .map(|(_, resolver)| resolver)
    }

    /// Resolves every uniform of the shader source, keyed by renamed identifier.
    pub fn resolve_uniforms(&self) -> Result<Vec<(String, UniformValue)>> {
        self.resolvers
            .iter()
            .map(|(renamed, resolver)| {
                resolver
                    .resolve(self.fabric.cache())
                    .map(|value| (renamed.clone(), value))
            })
            .collect()
    }

    pub fn resolve_uniform(&self, renamed: &str) -> Option<Result<UniformValue>> {
        self.resolver(renamed)
            .map(|resolver| resolver.resolve(self.fabric.cache()))
    }

    /// Releases every resource held by this material and its sub-materials.
    pub fn destroy(self) {
        debug!("[Fabric] Destroying {}", self.id());
    }

    fn release_resources(&self) {
        let cache = self.fabric.cache();
        let id = self.id();

        for value in self.shared.take_uniforms() {
            match value {
                UniformValue::Texture(texture) => cache.release_texture(id, &texture),
                UniformValue::CubeMap(cube_map) => cache.release_cube_map(id, &cube_map),
                _ => {}
            }
        }
        cache.forget(id);
    }
}

impl Drop for Material {
    fn drop(&mut self) {
        self.release_resources();
    }
}
