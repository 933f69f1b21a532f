use fabric_shadergen::catalog::TYPES;
use fabric_shadergen::token::{PeriodRule, count_tokens};
use fabric_shadergen::{
    CompiledMaterial, FabricError, MaterialCompiler, SchemaError, Template, TemplateRegistry,
    UniformType, UniformValue,
};
use serde_json::json;

/// Replaces every generated suffix by a stable marker so two compilations can be compared.
fn normalized(material: &CompiledMaterial) -> String {
    fn collect(material: &CompiledMaterial, renames: &mut Vec<(String, String)>) {
        for binding in &material.bindings {
            renames.push((binding.renamed.clone(), format!("{}_#", binding.name)));
        }
        for (name, child) in &material.materials {
            renames.push((child.entry_point.clone(), format!("fabric_getMaterial_{name}")));
            collect(child, renames);
        }
    }

    let mut renames = Vec::new();
    collect(material, &mut renames);
    renames
        .into_iter()
        .fold(material.shader_source.clone(), |source, (from, to)| {
            source.replace(&from, &to)
        })
}

fn fixture() -> Template {
    Template::try_from(json!({
        "uniforms": {
            "image": "textures/brick.png",
            "channels": "rgb",
            "tint": { "x": 1.0, "y": 0.5, "z": 0.25 },
            "transform": [1, 0, 0, 0, 0, 1, 0, 0, 0, 0, 1, 0, 0, 0, 0, 1]
        },
        "materials": {
            "base": { "type": "Color" },
            "stripes": { "type": "Stripe", "uniforms": { "repeat": 10 } }
        },
        "components": {
            "diffuse": "(transform * vec4(texture2D(image, materialInput.st).channels * tint, 1.0)).rgb * base.diffuse",
            "alpha": "stripes.alpha"
        }
    }))
    .unwrap()
}

#[test]
fn recompiling_yields_equivalent_sources() {
    let registry = TemplateRegistry::populated();

    let first = MaterialCompiler::compile(&registry, fixture(), true).unwrap();
    let second = MaterialCompiler::compile(&registry, fixture(), true).unwrap();

    assert_ne!(first.shader_source, second.shader_source);
    assert_eq!(normalized(&first), normalized(&second));
    assert_eq!(first.uniforms, second.uniforms);
}

#[test]
fn every_built_in_type_compiles_strictly() {
    let registry = TemplateRegistry::populated();
    for kind in TYPES {
        let material = MaterialCompiler::compile(&registry, Template::new().with_type(kind), true)
            .unwrap_or_else(|e| panic!("{kind} failed to compile: {e}"));
        assert_eq!(material.kind.as_deref(), Some(kind));
        assert_eq!(count_tokens(&material.shader_source, "fabric_getMaterial", PeriodRule::Exclude), 1);
    }
}

#[test]
fn bump_map_binds_image_dimensions() {
    let registry = TemplateRegistry::populated();
    let material =
        MaterialCompiler::compile(&registry, Template::new().with_type("BumpMap"), true).unwrap();

    let image = material.binding("image").unwrap();
    assert_eq!(image.ty, UniformType::Sampler2D);
    assert_eq!(image.dimensions.as_deref(), Some("imageDimensions"));
    assert!(material.binding("channel").is_none());
    assert!(material.shader_source.contains(").r;"));
}

#[test]
fn overrides_apply_onto_registered_types() {
    let registry = TemplateRegistry::populated();
    let material = MaterialCompiler::compile(
        &registry,
        Template::try_from(json!({
            "type": "Checkerboard",
            "uniforms": { "repeat": { "x": 2, "y": 8 } }
        }))
        .unwrap(),
        true,
    )
    .unwrap();

    let registered = registry.get("Checkerboard").unwrap();
    let names: Vec<_> = material.uniforms.iter().map(|(n, _)| n.as_str()).collect();
    let registered_names: Vec<_> = registered.uniforms().iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, registered_names);

    for (name, value) in &material.uniforms {
        if name == "repeat" {
            let repeat = value.as_record().unwrap();
            assert_eq!(repeat.number("x"), Some(2.0));
            assert_eq!(repeat.number("y"), Some(8.0));
        } else {
            assert_eq!(Some(value), registered.uniform(name));
        }
    }
}

#[test]
fn source_with_components_fails_before_binding() {
    let registry = TemplateRegistry::empty();
    let template = Template::new()
        .with_type("Invalid")
        .with_uniform("weights", UniformValue::Sequence(vec![1.0, 2.0]))
        .with_source("fabric_material fabric_getMaterial(fabric_materialInput materialInput) {}")
        .with_component("diffuse", "vec3(1.0)");

    let err = MaterialCompiler::compile(&registry, template, true).unwrap_err();
    assert!(matches!(
        err,
        FabricError::Schema {
            source: SchemaError::SourceAndComponents
        }
    ));
    assert!(!registry.contains("Invalid"));
}

#[test]
fn unknown_component_channels_are_rejected() {
    let registry = TemplateRegistry::empty();
    let err = MaterialCompiler::compile(
        &registry,
        Template::new().with_component("roughness", "0.5"),
        false,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        FabricError::Schema {
            source: SchemaError::InvalidProperty { .. }
        }
    ));
}
