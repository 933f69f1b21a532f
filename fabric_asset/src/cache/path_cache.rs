use crate::material::{MaterialId, MaterialShared};
use fabric_shadergen::{CubeMap, Texture, UniformValue};
use fabric_utils::tracing::trace;
use std::collections::HashMap;
use std::sync::{Arc, Weak};

/// A GPU resource kind the cache can hand out.
pub(crate) trait CachedResource: Clone + PartialEq + Send + 'static {
    const LABEL: &'static str;

    fn destroy(&self);
    fn to_value(&self) -> UniformValue;
    fn from_value(value: &UniformValue) -> Option<&Self>;
}

impl CachedResource for Texture {
    const LABEL: &'static str = "Texture";

    fn destroy(&self) {
        Texture::destroy(self)
    }

    fn to_value(&self) -> UniformValue {
        UniformValue::Texture(self.clone())
    }

    fn from_value(value: &UniformValue) -> Option<&Self> {
        value.as_texture()
    }
}

impl CachedResource for CubeMap {
    const LABEL: &'static str = "CubeMap";

    fn destroy(&self) {
        CubeMap::destroy(self)
    }

    fn to_value(&self) -> UniformValue {
        UniformValue::CubeMap(self.clone())
    }

    fn from_value(value: &UniformValue) -> Option<&Self> {
        value.as_cube_map()
    }
}

pub(crate) enum EntryState<R> {
    Loading,
    Ready(R),
    Failed,
}

/// A material property bound to a cached path.
pub(crate) struct Registration {
    pub material: MaterialId,
    pub owner: Weak<MaterialShared>,
    pub property: String,
}

impl Registration {
    fn is(&self, material: MaterialId, property: &str) -> bool {
        self.material == material && self.property == property
    }
}

pub(crate) struct CacheEntry<R> {
    pub state: EntryState<R>,
    pub registrations: Vec<Registration>,
}

impl<R> CacheEntry<R> {
    pub fn ready(&self) -> Option<&R> {
        match &self.state {
            EntryState::Ready(resource) => Some(resource),
            EntryState::Loading | EntryState::Failed => None,
        }
    }
}

/// Path keyed entries of one resource kind.
pub(crate) struct PathCache<R> {
    entries: HashMap<String, CacheEntry<R>>,
}

impl<R: CachedResource> PathCache<R> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entry(&self, path: &str) -> Option<&CacheEntry<R>> {
        self.entries.get(path)
    }

    pub fn entry_mut(&mut self, path: &str) -> Option<&mut CacheEntry<R>> {
        self.entries.get_mut(path)
    }

    pub fn remove(&mut self, path: &str) -> Option<CacheEntry<R>> {
        self.entries.remove(path)
    }

    /// Adds the registration. Returns `true` when the path was unknown and
    /// needs to be loaded.
    pub fn register(&mut self, path: &str, owner: &Arc<MaterialShared>, property: &str) -> bool {
        let material = owner.id();
        let created = !self.entries.contains_key(path);
        let entry = self
            .entries
            .entry(path.to_string())
            .or_insert_with(|| CacheEntry {
                state: EntryState::Loading,
                registrations: Vec::new(),
            });

        if !entry.registrations.iter().any(|r| r.is(material, property)) {
            trace!("[{} Cache] Registered {material}.{property} for {path}", R::LABEL);
            entry.registrations.push(Registration {
                material,
                owner: Arc::downgrade(owner),
                property: property.to_string(),
            });
        }

        created
    }

    /// A ready resource of another path the same property is still registered to.
    pub fn prior(&self, material: MaterialId, property: &str, path: &str) -> Option<R> {
        self.entries
            .iter()
            .filter(|(key, _)| key.as_str() != path)
            .filter(|(_, entry)| entry.registrations.iter().any(|r| r.is(material, property)))
            .find_map(|(_, entry)| entry.ready().cloned())
    }

    /// Drops the material's registrations on every path resolved to `resource`.
    /// Returns whether any path held the resource.
    pub fn release(&mut self, material: MaterialId, resource: &R) -> bool {
        let paths: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.ready() == Some(resource))
            .map(|(path, _)| path.clone())
            .collect();

        for path in &paths {
            if let Some(entry) = self.entries.get_mut(path) {
                entry.registrations.retain(|r| r.material != material);
            }
            self.evict_if_unused(path);
        }

        !paths.is_empty()
    }

    /// Drops every registration of the material.
    pub fn forget(&mut self, material: MaterialId) {
        let paths: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.registrations.iter().any(|r| r.material == material))
            .map(|(path, _)| path.clone())
            .collect();

        for path in &paths {
            if let Some(entry) = self.entries.get_mut(path) {
                entry.registrations.retain(|r| r.material != material);
            }
            self.evict_if_unused(path);
        }
    }

    /// Destroys and evicts a settled entry nobody is registered to anymore.
    /// Loading entries stay so a path is never loaded twice at once.
    fn evict_if_unused(&mut self, path: &str) {
        let Some(entry) = self.entries.get(path) else {
            return;
        };
        if !entry.registrations.is_empty() {
            return;
        }

        match &entry.state {
            EntryState::Loading => {}
            EntryState::Ready(resource) => {
                trace!("[{} Cache] Destroyed {path}", R::LABEL);
                resource.destroy();
                self.entries.remove(path);
            }
            EntryState::Failed => {
                self.entries.remove(path);
            }
        }
    }
}
