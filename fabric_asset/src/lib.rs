//! Runtime materials for the Fabric material system.
//!
//! ```ignore
//! let fabric = FabricContext::new(render_context, Arc::new(FileImageLoader));
//! let material = Material::from_json(&fabric, r#"{ "type": "DiffuseMap", "uniforms": { "image": "brick.png" } }"#)?;
//!
//! // every frame
//! fabric.poll();
//! let uniforms = material.resolve_uniforms()?;
//! ```

pub mod cache;
pub mod context;
pub mod loader;
pub mod material;
pub mod render;

pub use cache::{ResourceCache, ResourceLoadError};
pub use context::FabricContext;
pub use loader::{FileImageLoader, ImageLoader, LoadCallback};
pub use material::{Material, MaterialDescriptor, MaterialId, MaterialShared, UniformResolver};
pub use render::RenderContext;

pub use fabric_shadergen::{
    CubeFaces, CubeMap, FabricError, GpuResource, Record, SchemaError, Template, Texture,
    UniformType, UniformValue, UsageKind,
};
