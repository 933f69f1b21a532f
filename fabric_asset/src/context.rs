use crate::cache::{ResourceCache, ResourceLoadError};
use crate::loader::ImageLoader;
use crate::render::RenderContext;
use fabric_shadergen::TemplateRegistry;
use std::sync::Arc;

/// The services materials are built against: a template registry and a
/// resource cache bound to one rendering context.
///
/// Cloning is cheap and clones share both services.
#[derive(Debug, Clone)]
pub struct FabricContext {
    registry: Arc<TemplateRegistry>,
    cache: Arc<ResourceCache>,
}

impl FabricContext {
    /// A context with the built-in material types registered.
    pub fn new(render: Arc<dyn RenderContext>, loader: Arc<dyn ImageLoader>) -> Self {
        Self::with_registry(Arc::new(TemplateRegistry::populated()), render, loader)
    }

    pub fn with_registry(
        registry: Arc<TemplateRegistry>,
        render: Arc<dyn RenderContext>,
        loader: Arc<dyn ImageLoader>,
    ) -> Self {
        Self {
            registry,
            cache: Arc::new(ResourceCache::new(render, loader)),
        }
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &ResourceCache {
        &self.cache
    }

    /// Installs finished image loads. Call once per frame, before resolving uniforms.
    pub fn poll(&self) -> Vec<ResourceLoadError> {
        self.cache.process_loads()
    }
}
