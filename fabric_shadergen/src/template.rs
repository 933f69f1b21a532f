use crate::error::{
    FabricError, InvalidUniformTypeErr, JsonErr, NotAStringErr, NotAnObjectErr, Result,
};
use crate::value::UniformValue;
use serde::Deserialize;
use serde_json::{Map, Value};
use snafu::{OptionExt, ResultExt};

/// Keys a template may define at its top level.
pub const TEMPLATE_KEYS: [&str; 5] = ["type", "materials", "uniforms", "components", "source"];

/// Material channels a `components` mapping may assign.
pub const COMPONENT_NAMES: [&str; 5] = ["diffuse", "specular", "normal", "emission", "alpha"];

/// Declarative description of a material.
///
/// Templates are usually written as JSON:
///
/// ```json
/// {
///     "type": "DiffuseMap",
///     "uniforms": { "image": "fabric_defaultImage", "channels": "rgb" },
///     "components": { "diffuse": "texture2D(image, materialInput.st).channels" }
/// }
/// ```
///
/// Declaration order of `uniforms`, `materials` and `components` is kept.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "Value")]
pub struct Template {
    kind: Option<String>,
    uniforms: Vec<(String, UniformValue)>,
    materials: Vec<(String, Template)>,
    components: Option<Vec<(String, String)>>,
    source: Option<String>,
    unknown_keys: Vec<String>,
}

impl Template {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json).context(JsonErr)?;
        Self::try_from(value)
    }

    pub fn with_type(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn with_uniform(mut self, name: impl Into<String>, value: impl Into<UniformValue>) -> Self {
        upsert(&mut self.uniforms, name.into(), value.into());
        self
    }

    pub fn with_material(mut self, name: impl Into<String>, template: Template) -> Self {
        upsert(&mut self.materials, name.into(), template);
        self
    }

    pub fn with_component(mut self, channel: impl Into<String>, expression: impl Into<String>) -> Self {
        let components = self.components.get_or_insert_with(Vec::new);
        upsert(components, channel.into(), expression.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    pub fn uniforms(&self) -> &[(String, UniformValue)] {
        &self.uniforms
    }

    pub fn uniform(&self, name: &str) -> Option<&UniformValue> {
        lookup(&self.uniforms, name)
    }

    pub fn materials(&self) -> &[(String, Template)] {
        &self.materials
    }

    pub fn material(&self, name: &str) -> Option<&Template> {
        lookup(&self.materials, name)
    }

    pub fn components(&self) -> Option<&[(String, String)]> {
        self.components.as_deref()
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub(crate) fn unknown_keys(&self) -> &[String] {
        &self.unknown_keys
    }

    /// Applies this template as overrides onto a registered one.
    ///
    /// Values from `self` win. Uniforms, materials and components merge key by key
    /// in the registered order, with new keys appended. Giving a `source` drops the
    /// registered `components` and the other way around. A caller giving both keeps
    /// both, so validation still rejects it.
    pub fn merge_onto(self, registered: &Template) -> Template {
        let kind = self.kind.or_else(|| registered.kind.clone());

        let mut uniforms = registered.uniforms.clone();
        for (name, value) in self.uniforms {
            upsert(&mut uniforms, name, value);
        }

        let mut materials = registered.materials.clone();
        for (name, template) in self.materials {
            match materials.iter_mut().find(|(key, _)| *key == name) {
                Some((_, slot)) => *slot = template.merge_onto(slot),
                None => materials.push((name, template)),
            }
        }

        let (components, source) = match (self.components, self.source) {
            (Some(components), Some(source)) => (Some(components), Some(source)),
            (None, Some(source)) => (None, Some(source)),
            (Some(overrides), None) => {
                let mut components = registered.components.clone().unwrap_or_default();
                for (channel, expression) in overrides {
                    upsert(&mut components, channel, expression);
                }
                (Some(components), None)
            }
            (None, None) => (registered.components.clone(), registered.source.clone()),
        };

        let mut unknown_keys = registered.unknown_keys.clone();
        for key in self.unknown_keys {
            if !unknown_keys.contains(&key) {
                unknown_keys.push(key);
            }
        }

        Template {
            kind,
            uniforms,
            materials,
            components,
            source,
            unknown_keys,
        }
    }
}

fn upsert<V>(entries: &mut Vec<(String, V)>, name: String, value: V) {
    match entries.iter_mut().find(|(key, _)| *key == name) {
        Some((_, slot)) => *slot = value,
        None => entries.push((name, value)),
    }
}

fn lookup<'a, V>(entries: &'a [(String, V)], name: &str) -> Option<&'a V> {
    entries.iter().find(|(key, _)| key == name).map(|(_, v)| v)
}

fn object<'a>(value: &'a Value, what: &str) -> Result<&'a Map<String, Value>> {
    Ok(value.as_object().context(NotAnObjectErr { what })?)
}

fn string(value: &Value, what: &str) -> Result<String> {
    Ok(value.as_str().map(str::to_string).context(NotAStringErr { what })?)
}

impl TryFrom<Value> for Template {
    type Error = FabricError;

    fn try_from(value: Value) -> Result<Self> {
        let root = object(&value, "template")?;
        let mut template = Template::new();

        for (key, value) in root {
            match key.as_str() {
                "type" => template.kind = Some(string(value, "type")?),
                "source" => template.source = Some(string(value, "source")?),
                "uniforms" => {
                    for (name, literal) in object(value, "uniforms")? {
                        let uniform = UniformValue::from_json(literal)
                            .context(InvalidUniformTypeErr { name })?;
                        template.uniforms.push((name.clone(), uniform));
                    }
                }
                "materials" => {
                    for (name, nested) in object(value, "materials")? {
                        let nested = Template::try_from(nested.clone())?;
                        template.materials.push((name.clone(), nested));
                    }
                }
                "components" => {
                    let mut components = Vec::new();
                    for (channel, expression) in object(value, "components")? {
                        let what = format!("component `{channel}`");
                        components.push((channel.clone(), string(expression, &what)?));
                    }
                    template.components = Some(components);
                }
                _ => template.unknown_keys.push(key.clone()),
            }
        }

        Ok(template)
    }
}
