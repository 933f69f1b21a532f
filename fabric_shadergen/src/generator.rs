use crate::template::Template;

/// Name of the function every compiled material exposes.
pub const ENTRY_POINT: &str = "fabric_getMaterial";
/// Record type returned by the entry point.
pub const MATERIAL_TYPE: &str = "fabric_material";
/// Input type passed to the entry point.
pub const MATERIAL_INPUT_TYPE: &str = "fabric_materialInput";
/// Function producing the default material record.
pub const DEFAULT_MATERIAL_FACTORY: &str = "fabric_getDefaultMaterial";
/// Name of the shared input argument.
pub const MATERIAL_INPUT: &str = "materialInput";

pub struct ShaderGenerator;

impl ShaderGenerator {
    /// Source of the material's entry function. A hand written `source` is used
    /// as is, otherwise the function is synthesized from the `components`.
    pub fn method_definition(template: &Template) -> String {
        if let Some(source) = template.source() {
            return source.to_string();
        }

        let mut out = String::new();
        out.push_str(&format!(
            "{MATERIAL_TYPE} {ENTRY_POINT}({MATERIAL_INPUT_TYPE} {MATERIAL_INPUT})\n{{\n"
        ));
        out.push_str(&format!(
            "{MATERIAL_TYPE} material = {DEFAULT_MATERIAL_FACTORY}({MATERIAL_INPUT});\n"
        ));

        for (channel, expression) in template.components().unwrap_or_default() {
            out.push_str(&format!("material.{channel} = {expression};\n"));
        }

        out.push_str("return material;\n}\n");
        out
    }

    pub fn uniform_declaration(glsl_type: &str, name: &str) -> String {
        format!("uniform {glsl_type} {name};\n")
    }

    /// Prepends `declaration` unless the source already carries it.
    pub fn prepend_declaration(source: &str, declaration: &str) -> String {
        if source.contains(declaration) {
            return source.to_string();
        }
        let mut out = String::with_capacity(declaration.len() + source.len());
        out.push_str(declaration);
        out.push_str(source);
        out
    }

    /// Expression invoking a (renamed) material entry point.
    pub fn call_expression(entry_point: &str) -> String {
        format!("{entry_point}({MATERIAL_INPUT})")
    }
}
