#![allow(dead_code)]

use fabric_asset::{
    CubeFaces, CubeMap, FabricContext, GpuResource, ImageLoader, LoadCallback, RenderContext,
    Texture,
};
use image::{DynamicImage, GenericImageView, ImageError};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug)]
pub struct MockResource {
    width: u32,
    height: u32,
    destroyed: AtomicBool,
}

impl MockResource {
    fn new(width: u32, height: u32) -> Arc<Self> {
        Arc::new(Self {
            width,
            height,
            destroyed: AtomicBool::new(false),
        })
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }
}

impl GpuResource for MockResource {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn destroy(&self) {
        let was_destroyed = self.destroyed.swap(true, Ordering::SeqCst);
        assert!(!was_destroyed, "resource destroyed twice");
    }
}

/// Records every resource it hands out.
pub struct MockRenderContext {
    textures: Mutex<Vec<Arc<MockResource>>>,
    cube_maps: Mutex<Vec<Arc<MockResource>>>,
    default_texture: Texture,
    default_cube_map: CubeMap,
}

impl MockRenderContext {
    pub fn new() -> Self {
        Self {
            textures: Mutex::new(Vec::new()),
            cube_maps: Mutex::new(Vec::new()),
            default_texture: Texture::from_arc(MockResource::new(1, 1)),
            default_cube_map: CubeMap::from_arc(MockResource::new(1, 1)),
        }
    }

    pub fn textures_created(&self) -> usize {
        self.textures.lock().len()
    }

    pub fn cube_maps_created(&self) -> usize {
        self.cube_maps.lock().len()
    }

    pub fn texture_destroyed(&self, texture: &Texture) -> bool {
        Self::destroyed(&self.textures.lock(), texture.inner())
    }

    pub fn cube_map_destroyed(&self, cube_map: &CubeMap) -> bool {
        Self::destroyed(&self.cube_maps.lock(), cube_map.inner())
    }

    fn destroyed(created: &[Arc<MockResource>], handle: &Arc<dyn GpuResource>) -> bool {
        created
            .iter()
            .find(|resource| std::ptr::addr_eq(Arc::as_ptr(*resource), Arc::as_ptr(handle)))
            .is_some_and(|resource| resource.is_destroyed())
    }
}

impl RenderContext for MockRenderContext {
    fn create_texture_2d(&self, image: &DynamicImage) -> Texture {
        let (width, height) = image.dimensions();
        let resource = MockResource::new(width, height);
        self.textures.lock().push(resource.clone());
        Texture::from_arc(resource)
    }

    fn create_cube_map(&self, faces: &CubeFaces<DynamicImage>) -> CubeMap {
        let (width, height) = faces.positive_x.dimensions();
        let resource = MockResource::new(width, height);
        self.cube_maps.lock().push(resource.clone());
        CubeMap::from_arc(resource)
    }

    fn default_texture(&self) -> Texture {
        self.default_texture.clone()
    }

    fn default_cube_map(&self) -> CubeMap {
        self.default_cube_map.clone()
    }
}

/// Holds on to load requests until the test decides how they end.
#[derive(Default)]
pub struct ManualLoader {
    requested: Mutex<Vec<String>>,
    pending: Mutex<Vec<(String, LoadCallback)>>,
}

impl ManualLoader {
    /// Every path ever requested, in request order.
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().clone()
    }

    pub fn pending(&self) -> usize {
        self.pending.lock().len()
    }

    fn take(&self, path: &str) -> LoadCallback {
        let mut pending = self.pending.lock();
        let index = pending
            .iter()
            .position(|(requested, _)| requested == path)
            .unwrap_or_else(|| panic!("no pending load for {path}"));
        pending.remove(index).1
    }

    pub fn complete(&self, path: &str, width: u32, height: u32) {
        let done = self.take(path);
        done(Ok(DynamicImage::new_rgba8(width, height)));
    }

    pub fn fail(&self, path: &str) {
        let done = self.take(path);
        done(Err(ImageError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            path.to_string(),
        ))));
    }
}

impl ImageLoader for ManualLoader {
    fn load(&self, path: &str, done: LoadCallback) {
        self.requested.lock().push(path.to_string());
        self.pending.lock().push((path.to_string(), done));
    }
}

pub struct Harness {
    pub render: Arc<MockRenderContext>,
    pub loader: Arc<ManualLoader>,
    pub fabric: FabricContext,
}

pub fn harness() -> Harness {
    init_logging();

    let render = Arc::new(MockRenderContext::new());
    let loader = Arc::new(ManualLoader::default());
    let fabric = FabricContext::new(render.clone(), loader.clone());

    Harness {
        render,
        loader,
        fabric,
    }
}

pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn faces(prefix: &str) -> CubeFaces<String> {
    CubeFaces::from_array(["px", "nx", "py", "ny", "pz", "nz"].map(|face| format!("{prefix}/{face}.png")))
}
