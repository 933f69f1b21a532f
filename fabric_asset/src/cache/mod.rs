//! Deduplicating, reference counted cache of image backed GPU resources.
//!
//! Every distinct path (or cube map face set) is loaded once. Materials register
//! the property that wants the resource; when the load finishes, the resource is
//! installed into every registered property. A resource is destroyed when the
//! last material holding it releases it.
//!
//! Loads complete on arbitrary threads but are only applied by
//! [`ResourceCache::process_loads`], so installs never interleave with resolution.

mod path_cache;

use crate::loader::ImageLoader;
use crate::material::{MaterialId, MaterialShared};
use crate::render::RenderContext;
use crossbeam_channel::{Receiver, Sender, unbounded};
use fabric_shadergen::{CubeFaces, CubeMap, DEFAULT_IMAGE_ID, Texture};
use fabric_utils::debug_panic;
use fabric_utils::tracing::{debug, error, trace};
use image::{DynamicImage, ImageError};
use parking_lot::Mutex;
use path_cache::{CachedResource, EntryState, PathCache};
use snafu::Snafu;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// An image or cube map face could not be loaded. The affected properties keep
/// the default resource and the load is not retried.
#[derive(Debug, Snafu)]
#[snafu(display("fabric: failed to load image `{path}`: {source}"))]
pub struct ResourceLoadError {
    pub path: String,
    pub source: ImageError,
}

enum Completion {
    Texture {
        path: String,
        result: Result<DynamicImage, ImageError>,
    },
    CubeMap {
        key: String,
        result: Result<CubeFaces<DynamicImage>, ResourceLoadError>,
    },
}

/// Faces of a cube map collected as their loads come in.
struct CubeGather {
    faces: [Option<DynamicImage>; 6],
    failed: bool,
}

/// Resource cache of one [`FabricContext`](crate::FabricContext).
pub struct ResourceCache {
    render: Arc<dyn RenderContext>,
    loader: Arc<dyn ImageLoader>,
    textures: Mutex<PathCache<Texture>>,
    cube_maps: Mutex<PathCache<CubeMap>>,
    completions_tx: Sender<Completion>,
    completions_rx: Receiver<Completion>,
}

impl Debug for ResourceCache {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceCache")
            .field("textures", &self.texture_count())
            .field("cube_maps", &self.cube_map_count())
            .finish_non_exhaustive()
    }
}

impl ResourceCache {
    pub fn new(render: Arc<dyn RenderContext>, loader: Arc<dyn ImageLoader>) -> Self {
        let (completions_tx, completions_rx) = unbounded();
        Self {
            render,
            loader,
            textures: Mutex::new(PathCache::new()),
            cube_maps: Mutex::new(PathCache::new()),
            completions_tx,
            completions_rx,
        }
    }

    pub fn render_context(&self) -> &Arc<dyn RenderContext> {
        &self.render
    }

    pub fn default_texture(&self) -> Texture {
        self.render.default_texture()
    }

    pub fn default_cube_map(&self) -> CubeMap {
        self.render.default_cube_map()
    }

    /// Number of distinct texture paths currently cached, loading or not.
    pub fn texture_count(&self) -> usize {
        self.textures.lock().len()
    }

    /// Number of distinct cube maps currently cached, loading or not.
    pub fn cube_map_count(&self) -> usize {
        self.cube_maps.lock().len()
    }

    /// `true` once the texture at `path` finished loading and is still alive.
    pub fn is_texture_ready(&self, path: &str) -> bool {
        self.textures
            .lock()
            .entry(path)
            .is_some_and(|entry| entry.ready().is_some())
    }

    /// Registers `property` of `owner` for the texture at `path` and returns what
    /// the property should show right now.
    ///
    /// That is the loaded texture if there is one, otherwise the texture the
    /// property was showing for an earlier path, otherwise the default texture.
    /// The first registration of a path starts loading it.
    pub fn resolve_texture(&self, owner: &Arc<MaterialShared>, property: &str, path: &str) -> Texture {
        if path == DEFAULT_IMAGE_ID {
            return self.render.default_texture();
        }

        let (current, start) = {
            let mut textures = self.textures.lock();
            let start = textures.register(path, owner, property);
            let current = textures
                .entry(path)
                .and_then(|entry| entry.ready().cloned())
                .or_else(|| textures.prior(owner.id(), property, path));
            (current, start)
        };

        if start {
            self.load_texture(path);
        }

        current.unwrap_or_else(|| self.render.default_texture())
    }

    /// Cube map counterpart of [`ResourceCache::resolve_texture`], keyed by the
    /// concatenated face paths.
    pub fn resolve_cube_map(
        &self,
        owner: &Arc<MaterialShared>,
        property: &str,
        faces: &CubeFaces<String>,
    ) -> CubeMap {
        let key = faces.key();

        let (current, start) = {
            let mut cube_maps = self.cube_maps.lock();
            let start = cube_maps.register(&key, owner, property);
            let current = cube_maps
                .entry(&key)
                .and_then(|entry| entry.ready().cloned())
                .or_else(|| cube_maps.prior(owner.id(), property, &key));
            (current, start)
        };

        if start {
            self.load_cube_map(key, faces);
        }

        current.unwrap_or_else(|| self.render.default_cube_map())
    }

    fn load_texture(&self, path: &str) {
        debug!("[Texture Cache] Loading {path}");
        let tx = self.completions_tx.clone();
        let owned = path.to_string();
        self.loader.load(
            path,
            Box::new(move |result| {
                let _ = tx.send(Completion::Texture {
                    path: owned,
                    result,
                });
            }),
        );
    }

    fn load_cube_map(&self, key: String, faces: &CubeFaces<String>) {
        debug!("[CubeMap Cache] Loading {key}");
        let gather = Arc::new(Mutex::new(CubeGather {
            faces: Default::default(),
            failed: false,
        }));

        for (index, face) in faces.as_array().into_iter().enumerate() {
            let gather = gather.clone();
            let tx = self.completions_tx.clone();
            let key = key.clone();
            let face_path = face.clone();

            self.loader.load(
                face,
                Box::new(move |result| {
                    let mut gather = gather.lock();
                    if gather.failed {
                        return;
                    }

                    let image = match result {
                        Ok(image) => image,
                        Err(source) => {
                            gather.failed = true;
                            let error = ResourceLoadError {
                                path: face_path,
                                source,
                            };
                            let _ = tx.send(Completion::CubeMap {
                                key,
                                result: Err(error),
                            });
                            return;
                        }
                    };

                    gather.faces[index] = Some(image);
                    if !gather.faces.iter().all(Option::is_some) {
                        return;
                    }

                    let faces: Vec<DynamicImage> =
                        gather.faces.iter_mut().filter_map(Option::take).collect();
                    match <[DynamicImage; 6]>::try_from(faces) {
                        Ok(faces) => {
                            let _ = tx.send(Completion::CubeMap {
                                key,
                                result: Ok(CubeFaces::from_array(faces)),
                            });
                        }
                        Err(faces) => {
                            debug_panic!("cube map {key} gathered {} faces", faces.len())
                        }
                    }
                }),
            );
        }
    }

    /// Applies every load that finished since the last call and returns the
    /// failures among them.
    pub fn process_loads(&self) -> Vec<ResourceLoadError> {
        let mut errors = Vec::new();

        while let Ok(completion) = self.completions_rx.try_recv() {
            match completion {
                Completion::Texture { path, result } => match result {
                    Ok(image) => {
                        let installed = install(&self.textures, &path, || {
                            self.render.create_texture_2d(&image)
                        });
                        self.apply(installed, |material, previous| {
                            self.release_texture(material, previous)
                        });
                    }
                    Err(source) => {
                        fail(&self.textures, &path);
                        let error = ResourceLoadError { path, source };
                        error!("[Texture Cache] {error}");
                        errors.push(error);
                    }
                },
                Completion::CubeMap { key, result } => match result {
                    Ok(faces) => {
                        let installed = install(&self.cube_maps, &key, || {
                            self.render.create_cube_map(&faces)
                        });
                        self.apply(installed, |material, previous| {
                            self.release_cube_map(material, previous)
                        });
                    }
                    Err(error) => {
                        fail(&self.cube_maps, &key);
                        error!("[CubeMap Cache] {error}");
                        errors.push(error);
                    }
                },
            }
        }

        errors
    }

    /// Swaps the new resource into every registered property, releasing what
    /// the property held before.
    fn apply<R: CachedResource>(
        &self,
        installed: Option<(R, Vec<(Arc<MaterialShared>, String)>)>,
        release: impl Fn(MaterialId, &R),
    ) {
        let Some((resource, owners)) = installed else {
            return;
        };

        for (owner, property) in owners {
            let previous = owner
                .uniform(&property)
                .and_then(|value| R::from_value(&value).cloned());
            if let Some(previous) = previous
                && previous != resource
            {
                release(owner.id(), &previous);
            }
            owner.set_uniform(&property, resource.to_value());
        }
    }

    /// Drops the material's hold on `texture`. The texture is destroyed once
    /// nothing is registered to it anymore.
    pub fn release_texture(&self, material: MaterialId, texture: &Texture) {
        if !self.textures.lock().release(material, texture) {
            trace!("[Texture Cache] {material} released an uncached texture");
        }
    }

    /// Cube map counterpart of [`ResourceCache::release_texture`].
    pub fn release_cube_map(&self, material: MaterialId, cube_map: &CubeMap) {
        if !self.cube_maps.lock().release(material, cube_map) {
            trace!("[CubeMap Cache] {material} released an uncached cube map");
        }
    }

    /// Drops every registration of the material, including ones still loading.
    pub fn forget(&self, material: MaterialId) {
        self.textures.lock().forget(material);
        self.cube_maps.lock().forget(material);
    }
}

/// Marks the entry as loaded. Returns the resource and the live registrants, or
/// `None` if nobody wants the resource anymore, in which case it is never created.
fn install<R: CachedResource>(
    cache: &Mutex<PathCache<R>>,
    path: &str,
    create: impl FnOnce() -> R,
) -> Option<(R, Vec<(Arc<MaterialShared>, String)>)> {
    let mut cache = cache.lock();
    let entry = cache.entry_mut(path)?;

    let owners: Vec<(Arc<MaterialShared>, String)> = entry
        .registrations
        .iter()
        .filter_map(|r| Some((r.owner.upgrade()?, r.property.clone())))
        .collect();
    entry.registrations.retain(|r| r.owner.strong_count() > 0);

    if owners.is_empty() {
        trace!("[{} Cache] Nobody waits for {path} anymore, evicting", R::LABEL);
        cache.remove(path);
        return None;
    }

    let resource = create();
    entry.state = EntryState::Ready(resource.clone());
    debug!("[{} Cache] Loaded {path} for {} properties", R::LABEL, owners.len());

    Some((resource, owners))
}

fn fail<R: CachedResource>(cache: &Mutex<PathCache<R>>, path: &str) {
    let mut cache = cache.lock();
    let Some(entry) = cache.entry_mut(path) else {
        return;
    };

    entry.registrations.retain(|r| r.owner.strong_count() > 0);
    if entry.registrations.is_empty() {
        cache.remove(path);
    } else {
        entry.state = EntryState::Failed;
    }
}
