use fabric_shadergen::{CubeFaces, CubeMap, Texture};
use image::DynamicImage;

/// Allocates GPU resources for decoded images.
///
/// Materials never upload anything themselves. Every texture and cube map they
/// hold was created through this trait and is destroyed through
/// [`GpuResource::destroy`](fabric_shadergen::GpuResource::destroy) once the cache
/// saw its last user go.
pub trait RenderContext: Send + Sync {
    fn create_texture_2d(&self, image: &DynamicImage) -> Texture;
    fn create_cube_map(&self, faces: &CubeFaces<DynamicImage>) -> CubeMap;

    /// Texture bound while the real one is still loading, or failed to load.
    fn default_texture(&self) -> Texture;
    /// Cube map bound while the real one is still loading, or failed to load.
    fn default_cube_map(&self) -> CubeMap;
}
