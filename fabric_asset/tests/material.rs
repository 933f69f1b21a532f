mod common;

use common::harness;
use fabric_asset::{
    FabricError, Material, MaterialDescriptor, RenderContext, SchemaError, Template, UniformValue,
};
use fabric_shadergen::UsageKind;
use serde_json::json;

fn material(h: &common::Harness, template: serde_json::Value, strict: bool) -> Result<Material, FabricError> {
    Material::new(
        &h.fabric,
        MaterialDescriptor::builder()
            .fabric(Template::try_from(template)?)
            .strict(strict)
            .build(),
    )
}

#[test]
fn unknown_types_are_rejected() {
    let h = harness();
    let err = Material::from_type(&h.fabric, "Marble").unwrap_err();
    assert!(matches!(
        err,
        FabricError::Schema {
            source: SchemaError::UnknownType { ref kind }
        } if kind == "Marble"
    ));
}

#[test]
fn json_overrides_apply_to_registered_types() {
    let h = harness();
    let material = Material::from_json(
        &h.fabric,
        r#"{ "type": "Color", "uniforms": { "color": { "red": 0, "green": 1, "blue": 0, "alpha": 1 } } }"#,
    )
    .unwrap();

    assert_eq!(material.kind(), Some("Color"));
    assert_eq!(material.uniform_names(), ["color"]);
    let color = material.uniform("color").unwrap();
    assert_eq!(color.as_record().unwrap().number("green"), Some(1.0));

    let resolved = material.resolve_uniforms().unwrap();
    assert_eq!(resolved.len(), 1);
    let (renamed, value) = &resolved[0];
    assert!(renamed.starts_with("color_"));
    assert_eq!(Some(value), material.uniform("color").as_ref());
    assert!(material.shader_source().contains(&format!("uniform vec4 {renamed};")));
}

#[test]
fn matrices_accept_column_major_arrays() {
    let h = harness();
    let identity = [1, 0, 0, 0, 0, 1, 0, 0, 0, 0, 1, 0, 0, 0, 0, 1];
    let material = material(
        &h,
        json!({
            "uniforms": { "transform": identity },
            "components": { "normal": "(transform * vec4(materialInput.normalEC, 0.0)).xyz" }
        }),
        true,
    )
    .unwrap();
    let renamed = material.renamed_uniforms().next().unwrap().to_string();

    let columns: Vec<f32> = (0..16).map(|i| i as f32).collect();
    material.set_uniform("transform", columns.clone());
    let Some(Ok(UniformValue::Mat4(matrix))) = material.resolve_uniform(&renamed) else {
        panic!("expected a 4x4 matrix");
    };
    assert_eq!(matrix.to_cols_array().to_vec(), columns);
    assert_eq!(matrix.col(1).x, 4.0);

    material.set_uniform("transform", vec![0.0f32; 5]);
    let err = material.resolve_uniform(&renamed).unwrap().unwrap_err();
    assert!(matches!(err, FabricError::InvalidUniformValue { ref name } if name == "transform"));
}

#[test]
fn live_values_cannot_change_type() {
    let h = harness();
    let material = Material::from_type(&h.fabric, "Color").unwrap();

    material.set_uniform("color", true);
    assert!(matches!(
        material.resolve_uniforms(),
        Err(FabricError::InvalidUniformValue { .. })
    ));

    material.set_uniform(
        "color",
        fabric_asset::Record::new()
            .with("red", 1.0f32)
            .with("green", 1.0f32)
            .with("blue", 1.0f32),
    );
    assert!(material.resolve_uniforms().is_err());

    material.set_uniform(
        "color",
        fabric_asset::Record::new()
            .with("red", 0.2f32)
            .with("green", 0.4f32)
            .with("blue", 0.6f32)
            .with("alpha", 1.0f32),
    );
    assert!(material.resolve_uniforms().is_ok());
}

#[test]
fn samplers_reject_strings_that_are_not_image_paths() {
    let h = harness();
    let material = Material::from_json(
        &h.fabric,
        r#"{ "type": "Image", "uniforms": { "image": "brick.png" } }"#,
    )
    .unwrap();

    for text in ["rgb", fabric_shadergen::DEFAULT_CUBE_MAP_ID] {
        material.set_uniform("image", text);
        assert!(matches!(
            material.resolve_uniforms(),
            Err(FabricError::InvalidUniformValue { ref name }) if name == "image"
        ));
    }
    assert!(h.loader.requested().is_empty());
    assert_eq!(h.fabric.cache().texture_count(), 0);
}

#[test]
fn registered_types_still_reject_source_with_components() {
    let h = harness();
    let err = material(
        &h,
        json!({
            "type": "Color",
            "source": "fabric_material fabric_getMaterial(fabric_materialInput materialInput) { }",
            "components": { "diffuse": "vec3(1.0)" }
        }),
        false,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        FabricError::Schema {
            source: SchemaError::SourceAndComponents
        }
    ));
    assert!(
        h.fabric
            .registry()
            .get("Color")
            .is_some_and(|color| color.source().is_none())
    );
}

#[test]
fn strictness_comes_from_the_descriptor() {
    let h = harness();
    let template = json!({
        "uniforms": { "unused": 1.0 },
        "components": { "diffuse": "vec3(0.5)" }
    });

    let err = material(&h, template.clone(), true).unwrap_err();
    assert!(matches!(
        err,
        FabricError::StrictUsage {
            usage: UsageKind::Uniform,
            ..
        }
    ));

    let lenient = material(&h, template, false).unwrap();
    assert!(!lenient.is_strict());
    assert_eq!(lenient.uniform("unused"), Some(UniformValue::Float(1.0)));
}

#[test]
fn source_and_components_are_exclusive() {
    let h = harness();
    let err = material(
        &h,
        json!({
            "type": "Conflicted",
            "source": "fabric_material fabric_getMaterial(fabric_materialInput materialInput) { }",
            "components": { "diffuse": "vec3(1.0)" }
        }),
        false,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        FabricError::Schema {
            source: SchemaError::SourceAndComponents
        }
    ));
    assert!(!h.fabric.registry().contains("Conflicted"));
}

#[test]
fn sub_materials_are_reachable_and_resolved_by_the_parent() {
    let h = harness();
    let fresnel = Material::from_type(&h.fabric, "Fresnel").unwrap();

    let reflection = fresnel.material("reflection").unwrap();
    let refraction = fresnel.material("refraction").unwrap();
    assert_eq!(reflection.kind(), Some("Reflection"));
    assert_eq!(fresnel.entry_point(), "fabric_getMaterial");
    assert!(reflection.entry_point().starts_with("fabric_getMaterial_"));
    assert!(
        fresnel
            .shader_source()
            .contains(&format!("{}(materialInput)", refraction.entry_point()))
    );

    assert!(fresnel.uniform_names().is_empty());
    assert_eq!(
        fresnel.renamed_uniforms().count(),
        reflection.renamed_uniforms().count() + refraction.renamed_uniforms().count()
    );

    let ratio = refraction
        .renamed_uniforms()
        .find(|renamed| renamed.starts_with("indexOfRefractionRatio_"))
        .unwrap()
        .to_string();
    refraction.set_uniform("indexOfRefractionRatio", 0.5f32);

    let resolved = fresnel.resolve_uniforms().unwrap();
    assert_eq!(resolved.len(), 3);
    assert!(resolved.contains(&(ratio, UniformValue::Float(0.5))));
    assert!(
        resolved
            .iter()
            .any(|(_, value)| *value == UniformValue::CubeMap(h.render.default_cube_map()))
    );
}

#[test]
fn destroying_a_material_releases_its_sub_materials() {
    let h = harness();
    let material = Material::from_json(
        &h.fabric,
        r#"{
            "materials": { "wood": { "type": "Image", "uniforms": { "image": "wood.png" } } },
            "components": { "diffuse": "wood.diffuse" }
        }"#,
    )
    .unwrap();

    material.resolve_uniforms().unwrap();
    h.loader.complete("wood.png", 2, 2);
    h.fabric.poll();

    let Some(UniformValue::Texture(texture)) = material.material("wood").unwrap().uniform("image")
    else {
        panic!("expected the wood texture to be installed");
    };
    assert_ne!(texture, h.render.default_texture());

    material.destroy();
    assert!(h.render.texture_destroyed(&texture));
    assert_eq!(h.fabric.cache().texture_count(), 0);
}
