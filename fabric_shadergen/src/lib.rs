//! Compiles Fabric material templates into GLSL.
//!
//! A [`Template`] is validated, turned into an entry function, has its uniforms
//! declared and renamed and its sub-materials inlined. The result is a
//! [`CompiledMaterial`] holding a self contained shader fragment and the uniform
//! bindings a runtime needs to feed it.

pub mod catalog;
pub mod compiler;
pub mod error;
pub mod generator;
pub mod registry;
pub mod resource;
pub mod template;
pub mod token;
pub mod validator;
pub mod value;

pub use compiler::{CompiledMaterial, MaterialCompiler, UniformBinding};
pub use error::{FabricError, SchemaError, UsageKind};
pub use generator::ShaderGenerator;
pub use registry::TemplateRegistry;
pub use resource::{CubeFaces, CubeMap, GpuResource, Texture};
pub use template::Template;
pub use value::{
    DEFAULT_CUBE_MAP_ID, DEFAULT_IMAGE_ID, Record, RecordField, UniformType, UniformValue,
};
