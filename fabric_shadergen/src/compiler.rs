use crate::error::{InvalidUniformTypeErr, RecursiveTypeErr, Result, StrictUsageErr, UsageKind};
use crate::generator::{ENTRY_POINT, ShaderGenerator};
use crate::registry::TemplateRegistry;
use crate::template::Template;
use crate::token::{PeriodRule, contains_token, replace_token};
use crate::validator::validate;
use crate::value::{Record, UniformType, UniformValue};
use fabric_utils::suffixed;
use fabric_utils::tracing::{debug, trace};
use snafu::{OptionExt, ensure};

/// A uniform as it ended up in the shader text.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformBinding {
    /// Name used in the template and the live uniform map.
    pub name: String,
    /// Collision safe identifier used in the shader text.
    pub renamed: String,
    /// Type inferred at compile time. The live value may never change it.
    pub ty: UniformType,
    /// Name of the `<name>Dimensions` companion of a 2D sampler, if the shader uses one.
    pub dimensions: Option<String>,
}

/// Output of compiling one template level, including its sub-materials.
#[derive(Debug, Clone)]
pub struct CompiledMaterial {
    pub kind: Option<String>,
    pub strict: bool,
    /// Self contained GLSL: uniform declarations, sub-material functions and the entry point.
    pub shader_source: String,
    pub entry_point: String,
    /// Initial live uniform values. Channel selectors are spliced into the text and not listed.
    pub uniforms: Vec<(String, UniformValue)>,
    pub bindings: Vec<UniformBinding>,
    pub materials: Vec<(String, CompiledMaterial)>,
}

impl CompiledMaterial {
    pub fn material(&self, name: &str) -> Option<&CompiledMaterial> {
        self.materials
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, material)| material)
    }

    pub fn binding(&self, name: &str) -> Option<&UniformBinding> {
        self.bindings.iter().find(|binding| binding.name == name)
    }
}

/// Turns templates into GLSL.
///
/// Types first seen during a compilation are only registered once the whole
/// material tree compiled, so a failing compilation leaves the registry untouched.
pub struct MaterialCompiler<'a> {
    registry: &'a TemplateRegistry,
    strict: bool,
    pending: Vec<(String, Template)>,
    ancestry: Vec<String>,
}

impl<'a> MaterialCompiler<'a> {
    pub fn new(registry: &'a TemplateRegistry, strict: bool) -> Self {
        Self {
            registry,
            strict,
            pending: Vec::new(),
            ancestry: Vec::new(),
        }
    }

    pub fn compile(
        registry: &'a TemplateRegistry,
        template: Template,
        strict: bool,
    ) -> Result<CompiledMaterial> {
        let mut compiler = Self::new(registry, strict);
        let material = compiler.compile_template(template)?;
        compiler.commit();
        Ok(material)
    }

    fn commit(self) {
        for (kind, template) in self.pending {
            self.registry.register_if_absent(kind, template);
        }
    }

    fn resolve_type(&mut self, template: Template) -> Result<Template> {
        let Some(kind) = template.kind().map(str::to_string) else {
            return Ok(template);
        };
        ensure!(!self.ancestry.contains(&kind), RecursiveTypeErr { kind });

        let registered = self
            .pending
            .iter()
            .find(|(pending, _)| *pending == kind)
            .map(|(_, template)| template.clone())
            .or_else(|| self.registry.get(&kind));

        match registered {
            Some(registered) => Ok(template.merge_onto(&registered)),
            None => {
                self.pending.push((kind, template.clone()));
                Ok(template)
            }
        }
    }

    fn compile_template(&mut self, template: Template) -> Result<CompiledMaterial> {
        let template = self.resolve_type(template)?;
        validate(&template)?;

        let mut source = ShaderGenerator::method_definition(&template);
        let mut uniforms = Vec::new();
        let mut bindings = Vec::new();

        for (name, value) in template.uniforms() {
            self.bind_uniform(name, value, &mut source, &mut uniforms, &mut bindings)?;
        }

        if let Some(kind) = template.kind() {
            self.ancestry.push(kind.to_string());
        }
        let materials = self.compose(&template, &mut source);
        if template.kind().is_some() {
            self.ancestry.pop();
        }
        let materials = materials?;

        debug!(
            "[Fabric Compiler] Compiled {} with {} uniforms and {} sub-materials",
            template.kind().unwrap_or("untyped material"),
            bindings.len(),
            materials.len()
        );

        Ok(CompiledMaterial {
            kind: template.kind().map(str::to_string),
            strict: self.strict,
            shader_source: source,
            entry_point: ENTRY_POINT.to_string(),
            uniforms,
            bindings,
            materials,
        })
    }

    fn bind_uniform(
        &mut self,
        name: &str,
        value: &UniformValue,
        source: &mut String,
        uniforms: &mut Vec<(String, UniformValue)>,
        bindings: &mut Vec<UniformBinding>,
    ) -> Result<()> {
        let ty = UniformType::infer(value).context(InvalidUniformTypeErr { name })?;

        if ty == UniformType::Channels {
            let UniformValue::Text(selector) = value else {
                return InvalidUniformTypeErr { name }.fail();
            };
            let (replaced, count) = replace_token(source, name, selector, PeriodRule::Allow);
            ensure!(
                !self.strict || count > 0,
                StrictUsageErr {
                    usage: UsageKind::Channels,
                    name,
                }
            );
            *source = replaced;
            return Ok(());
        }

        let mut dimensions = None;
        if ty == UniformType::Sampler2D {
            let dimensions_name = format!("{name}Dimensions");
            if contains_token(source, &dimensions_name, PeriodRule::Exclude) {
                let initial = UniformValue::Record(Record::dimensions(1, 1));
                self.bind_uniform(&dimensions_name, &initial, source, uniforms, bindings)?;
                dimensions = Some(dimensions_name);
            }
        }

        let glsl_type = ty.glsl_name().context(InvalidUniformTypeErr { name })?;
        let declaration = ShaderGenerator::uniform_declaration(glsl_type, name);
        let declared = ShaderGenerator::prepend_declaration(source, &declaration);

        let renamed = suffixed(name);
        let (renamed_source, count) = replace_token(&declared, name, &renamed, PeriodRule::Exclude);
        // the declaration itself always accounts for one replacement
        ensure!(
            !self.strict || count > 1,
            StrictUsageErr {
                usage: UsageKind::Uniform,
                name,
            }
        );
        *source = renamed_source;

        trace!("[Fabric Compiler] Bound {glsl_type} uniform {name} as {renamed}");

        uniforms.push((name.to_string(), value.clone()));
        bindings.push(UniformBinding {
            name: name.to_string(),
            renamed,
            ty,
            dimensions,
        });
        Ok(())
    }

    /// Compiles the sub-materials and splices them in. Call sites are substituted in
    /// the parent's own text only, the sub-material functions are prepended afterwards.
    fn compose(
        &mut self,
        template: &Template,
        source: &mut String,
    ) -> Result<Vec<(String, CompiledMaterial)>> {
        let mut materials = Vec::with_capacity(template.materials().len());
        let mut functions = String::new();

        for (name, nested) in template.materials() {
            let mut child = self.compile_template(nested.clone())?;

            let entry_point = suffixed(ENTRY_POINT);
            let (child_source, _) = replace_token(
                &child.shader_source,
                &child.entry_point,
                &entry_point,
                PeriodRule::Exclude,
            );
            child.shader_source = child_source;
            child.entry_point = entry_point;

            let call = ShaderGenerator::call_expression(&child.entry_point);
            let (replaced, count) = replace_token(source, name, &call, PeriodRule::Exclude);
            ensure!(
                !self.strict || count > 0,
                StrictUsageErr {
                    usage: UsageKind::Material,
                    name,
                }
            );
            *source = replaced;

            functions.push_str(&child.shader_source);
            materials.push((name.clone(), child));
        }

        source.insert_str(0, &functions);
        Ok(materials)
    }
}
