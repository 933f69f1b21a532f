use crate::catalog;
use crate::template::Template;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use fabric_utils::tracing::trace;
use itertools::Itertools;

/// Templates registered by their `type` name.
///
/// The first material constructed with a new `type` registers its template.
/// Later materials of that type only need to give overrides, see
/// [`Template::merge_onto`].
#[derive(Debug, Default)]
pub struct TemplateRegistry {
    templates: DashMap<String, Template>,
}

impl TemplateRegistry {
    /// A registry without any types, not even the built-in ones.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A registry holding the built-in material catalog.
    pub fn populated() -> Self {
        let registry = Self::empty();
        catalog::populate(&registry);
        registry
    }

    /// Registers `template` as `kind`, replacing and returning an earlier registration.
    pub fn register(&self, kind: impl Into<String>, template: Template) -> Option<Template> {
        let kind = kind.into();
        trace!("[Template Registry] Registered type: {kind}");
        self.templates.insert(kind, template)
    }

    /// Registers `template` as `kind` unless the type is already known.
    pub fn register_if_absent(&self, kind: impl Into<String>, template: Template) -> bool {
        match self.templates.entry(kind.into()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                trace!("[Template Registry] Registered type: {}", slot.key());
                slot.insert(template);
                true
            }
        }
    }

    pub fn get(&self, kind: &str) -> Option<Template> {
        self.templates.get(kind).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.templates.contains_key(kind)
    }

    /// Registered type names, sorted.
    pub fn types(&self) -> Vec<String> {
        self.templates
            .iter()
            .map(|entry| entry.key().clone())
            .sorted()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
