use crate::cache::ResourceCache;
use crate::material::MaterialShared;
use fabric_shadergen::error::{InvalidUniformValueErr, Result};
use fabric_shadergen::{DEFAULT_CUBE_MAP_ID, UniformType, UniformValue};
use snafu::{OptionExt, ensure};
use std::sync::Arc;

/// Produces the GPU ready value of one uniform from its live value.
///
/// Resolvers hold no state of their own, so a parent material can keep clones
/// of its sub-materials' resolvers next to its own.
#[derive(Debug, Clone)]
pub struct UniformResolver {
    owner: Arc<MaterialShared>,
    name: String,
    declared: UniformType,
    dimensions: Option<String>,
}

impl UniformResolver {
    pub(crate) fn new(
        owner: Arc<MaterialShared>,
        name: String,
        declared: UniformType,
        dimensions: Option<String>,
    ) -> Self {
        Self {
            owner,
            name,
            declared,
            dimensions,
        }
    }

    /// Public name of the uniform in its material.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declared_type(&self) -> UniformType {
        self.declared
    }

    pub fn resolve(&self, cache: &ResourceCache) -> Result<UniformValue> {
        let name = self.name.as_str();
        let live = self
            .owner
            .uniform(name)
            .context(InvalidUniformValueErr { name })?;

        let resolved = match self.declared {
            UniformType::Sampler2D => {
                let inferred = UniformType::infer(&live);
                let texture = match live {
                    UniformValue::Text(path) if inferred == Some(UniformType::Sampler2D) => {
                        cache.resolve_texture(&self.owner, name, &path)
                    }
                    UniformValue::Texture(texture) => texture,
                    _ => return InvalidUniformValueErr { name }.fail(),
                };
                if let Some(dimensions) = &self.dimensions {
                    self.owner.update_record(dimensions, |record| {
                        record.set("x", texture.width() as f32);
                        record.set("y", texture.height() as f32);
                    });
                }
                UniformValue::Texture(texture)
            }
            UniformType::SamplerCube => {
                let cube_map = match live {
                    UniformValue::Text(id) if id == DEFAULT_CUBE_MAP_ID => cache.default_cube_map(),
                    UniformValue::Record(record) => {
                        let faces = record.cube_faces().context(InvalidUniformValueErr { name })?;
                        cache.resolve_cube_map(&self.owner, name, &faces)
                    }
                    UniformValue::CubeMap(cube_map) => cube_map,
                    _ => return InvalidUniformValueErr { name }.fail(),
                };
                UniformValue::CubeMap(cube_map)
            }
            ty @ (UniformType::Mat2 | UniformType::Mat3 | UniformType::Mat4) => match live {
                UniformValue::Sequence(columns) => UniformValue::matrix_from_columns(ty, &columns)
                    .context(InvalidUniformValueErr { name })?,
                matrix => {
                    ensure!(
                        UniformType::infer(&matrix) == Some(ty),
                        InvalidUniformValueErr { name }
                    );
                    matrix
                }
            },
            declared => {
                ensure!(
                    UniformType::infer(&live) == Some(declared),
                    InvalidUniformValueErr { name }
                );
                return Ok(live);
            }
        };

        self.owner.set_uniform(name, resolved.clone());
        Ok(resolved)
    }
}
